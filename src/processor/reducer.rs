use anyhow::{Result, bail};
use polars::prelude::*;
use tracing::info;

use crate::models::schema;

/// Outcome of the reduction stage, fed into the run report.
#[derive(Debug)]
pub struct ReducerOutcome {
    pub rows_dropped_null: usize,
    pub rows_dropped_empty: usize,
    pub dropped_columns: Vec<String>,
}

/// Final stage: removes rows with missing values, drops columns the
/// downstream layer does not consume, verifies the finalized schema, and
/// orders the table by id for presentation.
///
/// Missing means null or empty string; the two are detected in separate
/// passes so the report can distinguish them. The policy is strict: one
/// missing value anywhere drops the whole row, no imputation.
pub struct NullSchemaReducer {
    drop_columns: Vec<String>,
}

impl NullSchemaReducer {
    pub fn new(drop_columns: Vec<String>) -> Self {
        NullSchemaReducer { drop_columns }
    }

    pub fn reduce(&self, df: DataFrame) -> Result<(DataFrame, ReducerOutcome)> {
        let (df, rows_dropped_null) = self.drop_rows_with_nulls(df)?;
        let (df, rows_dropped_empty) = self.drop_rows_with_empty_strings(df)?;

        let mut df = df;
        let mut dropped_columns = Vec::new();
        for column in &self.drop_columns {
            if df.column(column).is_ok() {
                df = df.drop(column)?;
                dropped_columns.push(column.clone());
            }
        }

        self.verify_final_schema(&df)?;

        let df = df.sort(["id"], SortMultipleOptions::default())?;

        info!(
            "Reduction: {} null rows and {} empty rows removed, {} columns dropped, {} rows finalized",
            rows_dropped_null,
            rows_dropped_empty,
            dropped_columns.len(),
            df.height()
        );

        Ok((
            df,
            ReducerOutcome {
                rows_dropped_null,
                rows_dropped_empty,
                dropped_columns,
            },
        ))
    }

    fn drop_rows_with_nulls(&self, df: DataFrame) -> Result<(DataFrame, usize)> {
        let height = df.height();
        let mut keep = Vec::with_capacity(height);

        for idx in 0..height {
            let has_null = df
                .get(idx)
                .map(|row| row.iter().any(|value| matches!(value, AnyValue::Null)))
                .unwrap_or(false);
            keep.push(!has_null);
        }

        let filtered = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        let dropped = height - filtered.height();

        Ok((filtered, dropped))
    }

    /// Empty strings are as missing as nulls in this domain, but they do
    /// not show up as null sentinels, hence the second pass.
    fn drop_rows_with_empty_strings(&self, df: DataFrame) -> Result<(DataFrame, usize)> {
        let height = df.height();

        let text_columns: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|column| column.dtype() == &DataType::String)
            .map(|column| column.name().to_string())
            .collect();

        let mut keep = vec![true; height];
        for name in &text_columns {
            for (idx, value) in df.column(name)?.str()?.into_iter().enumerate() {
                if value == Some("") {
                    keep[idx] = false;
                }
            }
        }

        let filtered = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        let dropped = height - filtered.height();

        Ok((filtered, dropped))
    }

    /// The reporting layer binds to the finalized column names; anything
    /// unexpected in the schema at this point is a contract break.
    fn verify_final_schema(&self, df: &DataFrame) -> Result<()> {
        let present: Vec<&str> = df
            .get_column_names()
            .iter()
            .map(|name| name.as_str())
            .collect();

        let missing: Vec<&str> = schema::FINAL_COLUMNS
            .iter()
            .copied()
            .filter(|column| !present.contains(column))
            .collect();
        let unexpected: Vec<&str> = present
            .iter()
            .copied()
            .filter(|column| !schema::FINAL_COLUMNS.contains(column))
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            bail!(
                "Finalized schema deviates from contract (missing: [{}], unexpected: [{}])",
                missing.join(", "),
                unexpected.join(", ")
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn final_shaped_frame() -> DataFrame {
        let mut columns: Vec<Column> = vec![
            Series::new("id".into(), &[Some(3i64), Some(1), Some(2)]).into(),
            Series::new("loan_amount".into(), &[3000.0, 1000.0, 2000.0]).into(),
            Series::new("interest_rate".into(), &[0.1, 0.2, 0.3]).into(),
            Series::new("installment".into(), &[99.0, 45.0, 60.0]).into(),
            Series::new("debt_to_income".into(), &[0.2, 0.1, 0.3]).into(),
            Series::new("total_payment".into(), &[3500.0, 1200.0, 2400.0]).into(),
            Series::new("annual_income".into(), &[50000.0, 60000.0, 70000.0]).into(),
        ];

        for name in [
            "term",
            "grade",
            "sub_grade",
            "employee_length",
            "home_ownership",
            "issue_date",
            "loan_status",
            "purpose",
            "address_state",
        ] {
            columns.push(Series::new(name.into(), &["x", "y", "z"]).into());
        }

        DataFrame::new(columns).unwrap()
    }

    fn reducer() -> NullSchemaReducer {
        NullSchemaReducer::new(vec!["annual_income".to_string()])
    }

    #[test]
    fn test_income_column_is_dropped_and_schema_verified() {
        let (df, outcome) = reducer().reduce(final_shaped_frame()).unwrap();

        assert!(df.column("annual_income").is_err());
        assert_eq!(df.width(), 15);
        assert_eq!(outcome.dropped_columns, vec!["annual_income"]);
    }

    #[test]
    fn test_output_is_sorted_by_id() {
        let (df, _) = reducer().reduce(final_shaped_frame()).unwrap();

        let ids: Vec<i64> = df.column("id").unwrap().i64().unwrap().into_no_null_iter().collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_null_and_empty_rows_are_dropped_separately() {
        let mut df = final_shaped_frame();
        df.with_column(Series::new(
            "loan_amount".into(),
            &[Some(3000.0), None, Some(2000.0)],
        ))
        .unwrap();
        df.with_column(Series::new(
            "purpose".into(),
            &[Some("Car"), Some("Home"), Some("")],
        ))
        .unwrap();

        let (cleaned, outcome) = reducer().reduce(df).unwrap();

        assert_eq!(outcome.rows_dropped_null, 1);
        assert_eq!(outcome.rows_dropped_empty, 1);
        assert_eq!(cleaned.height(), 1);
        let ids: Vec<i64> = cleaned.column("id").unwrap().i64().unwrap().into_no_null_iter().collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_reduction_is_idempotent_on_clean_input() {
        let (once, _) = reducer().reduce(final_shaped_frame()).unwrap();
        let (twice, outcome) = reducer().reduce(once.clone()).unwrap();

        assert_eq!(outcome.rows_dropped_null, 0);
        assert_eq!(outcome.rows_dropped_empty, 0);
        assert!(outcome.dropped_columns.is_empty());
        assert!(once.equals(&twice));
    }

    #[test]
    fn test_unexpected_column_fails_schema_verification() {
        let mut df = final_shaped_frame();
        df.with_column(Series::new("purpose2".into(), &["a", "b", "c"]))
            .unwrap();

        let err = reducer().reduce(df).unwrap_err();
        assert!(err.to_string().contains("deviates from contract"));
    }
}
