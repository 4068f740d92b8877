use serde::{Deserialize, Serialize};

/// One data-quality finding from a validation pass. Alerts are reported,
/// never auto-remediated: the pipeline halts so an operator can decide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAlert {
    pub check: String,
    pub column: String,
    pub violations: usize,
}

impl QualityAlert {
    pub fn new(check: &str, column: &str, violations: usize) -> Self {
        Self {
            check: check.to_string(),
            column: column.to_string(),
            violations,
        }
    }
}

/// Summary of a full cleaning run, written as JSON next to the cleaned table.
#[derive(Debug, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_loaded: usize,
    pub duplicates_removed: usize,
    pub rows_dropped_null: usize,
    pub rows_dropped_empty: usize,
    pub dropped_columns: Vec<String>,
    pub final_rows: usize,
    pub final_columns: Vec<String>,
    pub alerts: Vec<QualityAlert>,
}
