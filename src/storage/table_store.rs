use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::config::{OutputFormat, PipelineConfig};
use crate::models::report::CleaningReport;

/// Persists the finalized table and its run report. CSV and Parquet are
/// both supported; the report is always JSON, written next to the table.
pub struct TableStore {
    output_path: String,
    report_path: String,
    format: OutputFormat,
}

impl TableStore {
    pub fn new(config: &PipelineConfig) -> Self {
        TableStore {
            output_path: config.output_path.clone(),
            report_path: config.report_path.clone(),
            format: config.output_format,
        }
    }

    pub fn write_table(&self, df: &mut DataFrame) -> Result<String> {
        ensure_parent_dir(&self.output_path)?;

        let mut file = File::create(&self.output_path)
            .with_context(|| format!("Failed to create output file: {}", self.output_path))?;

        match self.format {
            OutputFormat::Csv => {
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .finish(df)
                    .with_context(|| format!("Failed to write CSV: {}", self.output_path))?;
            }
            OutputFormat::Parquet => {
                ParquetWriter::new(&mut file)
                    .finish(df)
                    .with_context(|| format!("Failed to write Parquet: {}", self.output_path))?;
            }
        }

        info!("Stored cleaned table at: {}", self.output_path);
        Ok(self.output_path.clone())
    }

    pub fn write_report(&self, report: &CleaningReport) -> Result<()> {
        ensure_parent_dir(&self.report_path)?;

        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&self.report_path, json)
            .with_context(|| format!("Failed to write run report: {}", self.report_path))?;

        info!("Stored run report at: {}", self.report_path);
        Ok(())
    }
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
    }
    Ok(())
}
