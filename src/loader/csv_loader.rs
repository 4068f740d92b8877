use anyhow::{Context, Result, bail};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

use crate::models::schema;

/// Reads the raw loan CSV into an in-memory staging DataFrame.
///
/// The DataFrame is the staging copy: the source file is opened read-only
/// and never written back, so a failed run leaves the raw data intact.
/// No cleaning happens here; all columns come through as-is, with empty
/// cells parsed to null.
pub struct CsvLoader;

impl CsvLoader {
    pub fn load(&self, path: &Path) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("Failed to open raw source: {}", path.display()))?
            .finish()
            .with_context(|| format!("Failed to read raw source: {}", path.display()))?;

        self.verify_raw_header(&df)?;

        info!(
            "Loaded {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );

        Ok(df)
    }

    /// The raw schema is fixed upstream, so a missing column means the
    /// wrong file was supplied. Fail before any stage runs.
    fn verify_raw_header(&self, df: &DataFrame) -> Result<()> {
        let present: Vec<&str> = df
            .get_column_names()
            .iter()
            .map(|name| name.as_str())
            .collect();

        let missing: Vec<&str> = schema::RAW_COLUMNS
            .iter()
            .copied()
            .filter(|column| !present.contains(column))
            .collect();

        if !missing.is_empty() {
            bail!("Raw source is missing expected columns: {}", missing.join(", "));
        }

        Ok(())
    }
}
