use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfigFile {
    pub pipeline: PipelineSection,
    pub cleaning: Option<CleaningSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    pub input_path: String,
    pub output_path: String,
    pub report_path: Option<String>,
    pub output_format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSection {
    pub drop_columns: Option<Vec<String>>,
    /// Per-column synonym tables, e.g. `[cleaning.canonical_labels.home_ownership]`.
    /// These extend the built-in mapping rather than replace it.
    pub canonical_labels: Option<HashMap<String, HashMap<String, String>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_path: String,
    pub output_path: String,
    pub report_path: String,
    pub output_format: OutputFormat,
    pub drop_columns: Vec<String>,
    pub canonical_labels: HashMap<String, HashMap<String, String>>,
}

impl PipelineConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config file: {}", path))?;

        let config_file: PipelineConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse pipeline config file: {}", path))?;

        Self::from_sections(config_file)
    }

    fn from_sections(file: PipelineConfigFile) -> Result<Self> {
        let defaults = Self::default();

        let output_format = match file.pipeline.output_format.as_deref() {
            None | Some("csv") => OutputFormat::Csv,
            Some("parquet") => OutputFormat::Parquet,
            Some(other) => bail!("Unknown output format: {} (expected csv or parquet)", other),
        };

        let cleaning = file.cleaning.unwrap_or(CleaningSection {
            drop_columns: None,
            canonical_labels: None,
        });

        Ok(Self {
            input_path: file.pipeline.input_path,
            output_path: file.pipeline.output_path,
            report_path: file
                .pipeline
                .report_path
                .unwrap_or(defaults.report_path),
            output_format,
            drop_columns: cleaning.drop_columns.unwrap_or(defaults.drop_columns),
            canonical_labels: cleaning.canonical_labels.unwrap_or_default(),
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: "data/loan_data_raw.csv".to_string(),
            output_path: "data/loan_data_clean.csv".to_string(),
            report_path: "data/cleaning_report.json".to_string(),
            output_format: OutputFormat::Csv,
            drop_columns: vec!["annual_income".to_string()],
            canonical_labels: HashMap::new(),
        }
    }
}
