use anyhow::{Context, Result};
use config::PipelineConfig;
use pipeline::CleaningPipeline;
use tracing::{error, info};
use tracing_subscriber;

mod config;
mod loader;
mod models;
mod pipeline;
mod processor;
mod storage;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Optional config path as first argument; built-in defaults otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_file(&path)
            .with_context(|| format!("Failed to load pipeline configuration from {}", path))?,
        None => PipelineConfig::default(),
    };

    info!(
        "🚀 Starting loan data cleaning pipeline: {} -> {}",
        config.input_path, config.output_path
    );

    let pipeline = CleaningPipeline::new(config);

    match pipeline.run() {
        Ok(report) => {
            info!("=== Cleaning Run Summary ===");
            info!("📥 Rows loaded: {}", report.rows_loaded);
            info!("🧹 Duplicates removed: {}", report.duplicates_removed);
            info!(
                "🕳️ Rows dropped for missing values: {} null, {} empty",
                report.rows_dropped_null, report.rows_dropped_empty
            );
            info!(
                "📊 Final table: {} rows x {} columns",
                report.final_rows,
                report.final_columns.len()
            );
            info!("✅ Pipeline completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("❌ Pipeline halted: {:#}", e);
            Err(e)
        }
    }
}
