use anyhow::{Context, Result, bail};
use polars::prelude::*;
use std::path::Path;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::loader::CsvLoader;
use crate::models::report::CleaningReport;
use crate::processor::{Deduplicator, NullSchemaReducer, Standardizer};
use crate::storage::TableStore;

/// Runs the four cleaning stages end to end: load, deduplicate,
/// standardize, reduce. Each stage hands a fresh table snapshot to the
/// next, so a failure anywhere leaves nothing half-written.
pub struct CleaningPipeline {
    config: PipelineConfig,
}

impl CleaningPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        CleaningPipeline { config }
    }

    pub fn run(&self) -> Result<CleaningReport> {
        let raw = CsvLoader
            .load(Path::new(&self.config.input_path))
            .context("Loader stage failed")?;

        let (mut cleaned, report) = clean_dataframe(raw, &self.config)?;

        let store = TableStore::new(&self.config);
        let output_key = store.write_table(&mut cleaned)?;
        store.write_report(&report)?;

        info!(
            "Cleaned table written to {} ({} rows, {} columns)",
            output_key,
            report.final_rows,
            report.final_columns.len()
        );

        Ok(report)
    }
}

/// The pure part of the run: raw snapshot in, finalized snapshot and
/// report out. Split from `CleaningPipeline::run` so the stages can be
/// exercised without touching the filesystem.
pub fn clean_dataframe(raw: DataFrame, config: &PipelineConfig) -> Result<(DataFrame, CleaningReport)> {
    let rows_loaded = raw.height();

    let deduped = Deduplicator
        .deduplicate(raw)
        .context("Deduplicator stage failed")?;
    let duplicates_removed = rows_loaded - deduped.height();

    let mut standardizer = Standardizer::new();
    standardizer.extend_labels(config.canonical_labels.clone());
    let (standardized, alerts) = standardizer
        .standardize(deduped)
        .context("Standardizer stage failed")?;

    if !alerts.is_empty() {
        for alert in &alerts {
            warn!(
                "Data-quality alert: {} in column {} ({} rows)",
                alert.check, alert.column, alert.violations
            );
        }
        bail!(
            "Standardizer reported {} data-quality alerts; halting before reduction",
            alerts.len()
        );
    }

    let reducer = NullSchemaReducer::new(config.drop_columns.clone());
    let (finalized, outcome) = reducer
        .reduce(standardized)
        .context("Null/schema reducer stage failed")?;

    let report = CleaningReport {
        rows_loaded,
        duplicates_removed,
        rows_dropped_null: outcome.rows_dropped_null,
        rows_dropped_empty: outcome.rows_dropped_empty,
        dropped_columns: outcome.dropped_columns,
        final_rows: finalized.height(),
        final_columns: finalized
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
        alerts,
    };

    Ok((finalized, report))
}
