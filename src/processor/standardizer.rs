use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::models::report::QualityAlert;
use crate::models::schema;

/// Date layouts accepted for `issue_date`. Month-only values get a
/// synthetic first-of-month day before parsing.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%b-%Y"];
const MONTH_FORMATS: [&str; 2] = ["%b-%Y", "%Y-%m"];

/// Field standardization: whitespace trim, purpose-column merge,
/// punctuation cleanup, categorical canonicalization, and the numeric
/// sign and date validation checks.
///
/// The merge runs before punctuation cleanup so the stray-dot rule sees
/// the consolidated value; the remaining passes are order-independent.
pub struct Standardizer {
    canonical_labels: HashMap<String, HashMap<String, String>>,
}

impl Standardizer {
    pub fn new() -> Self {
        let mut home_ownership = HashMap::new();
        home_ownership.insert("Renter".to_string(), "Rent".to_string());
        home_ownership.insert("Renting".to_string(), "Rent".to_string());

        let mut canonical_labels = HashMap::new();
        canonical_labels.insert("home_ownership".to_string(), home_ownership);

        Standardizer { canonical_labels }
    }

    /// Adds config-supplied synonym tables on top of the built-in ones.
    pub fn extend_labels(&mut self, extra: HashMap<String, HashMap<String, String>>) {
        for (column, mapping) in extra {
            self.canonical_labels
                .entry(column)
                .or_default()
                .extend(mapping);
        }
    }

    /// Runs all standardization passes and returns the transformed table
    /// together with any data-quality alerts. Alerts are findings, not
    /// fixes: the table is returned unmodified by the validation checks.
    pub fn standardize(&self, df: DataFrame) -> Result<(DataFrame, Vec<QualityAlert>)> {
        let mut df = df;

        let trimmed = self.trim_text_columns(&mut df)?;
        info!("Trimmed whitespace across {} text columns", trimmed);

        self.merge_purpose_columns(&mut df)?;
        self.strip_purpose_punctuation(&mut df)?;
        self.canonicalize_labels(&mut df)?;

        let mut alerts = self.check_numeric_signs(&df)?;
        alerts.extend(self.check_issue_dates(&df)?);

        Ok((df, alerts))
    }

    /// Trims every String-typed column. Columns are discovered from the
    /// schema rather than listed by name, so new text columns are picked
    /// up without code changes.
    fn trim_text_columns(&self, df: &mut DataFrame) -> Result<usize> {
        let text_columns: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|column| column.dtype() == &DataType::String)
            .map(|column| column.name().to_string())
            .collect();

        for name in &text_columns {
            let trimmed: Vec<Option<String>> = df
                .column(name)?
                .str()?
                .into_iter()
                .map(|value| value.map(|s| s.trim().to_string()))
                .collect();

            df.with_column(Series::new(name.as_str().into(), trimmed))?;
        }

        Ok(text_columns.len())
    }

    /// Collapses the split `purpose`/`purpose2` pair into `purpose`:
    /// trim(coalesce(purpose, "") + " " + coalesce(purpose2, "")).
    /// The source never populates both halves with different values; if
    /// new data does, there is no precedence rule, so that is an error.
    fn merge_purpose_columns(&self, df: &mut DataFrame) -> Result<()> {
        if df.column("purpose2").is_err() {
            // Already consolidated, e.g. a rerun over cleaned output.
            return Ok(());
        }

        let (merged, conflicts) = {
            let left = df.column("purpose").context("purpose column missing")?.str()?;
            let right = df.column("purpose2")?.str()?;

            let mut merged = Vec::with_capacity(df.height());
            let mut conflicts = 0usize;

            for (a, b) in left.into_iter().zip(right.into_iter()) {
                let a = a.unwrap_or("").trim();
                let b = b.unwrap_or("").trim();

                if !a.is_empty() && !b.is_empty() && a != b {
                    conflicts += 1;
                    merged.push(String::new());
                } else if !a.is_empty() && !b.is_empty() {
                    merged.push(a.to_string());
                } else {
                    merged.push(format!("{} {}", a, b).trim().to_string());
                }
            }

            (merged, conflicts)
        };

        if conflicts > 0 {
            bail!(
                "Purpose merge found {} rows where purpose and purpose2 disagree; no precedence rule is defined",
                conflicts
            );
        }

        df.with_column(Series::new("purpose".into(), merged))?;
        *df = df.drop("purpose2")?;

        Ok(())
    }

    /// The raw data carries an "Other." artifact; strip stray dots from
    /// the edges of the merged purpose value.
    fn strip_purpose_punctuation(&self, df: &mut DataFrame) -> Result<()> {
        let dot_edges = Regex::new(r"^\.+|\.+$")?;

        let cleaned: Vec<Option<String>> = df
            .column("purpose")?
            .str()?
            .into_iter()
            .map(|value| value.map(|s| dot_edges.replace_all(s, "").trim().to_string()))
            .collect();

        df.with_column(Series::new("purpose".into(), cleaned))?;

        Ok(())
    }

    /// Collapses known synonym labels to one canonical value per
    /// category. The mapping is static; unmapped labels pass through.
    fn canonicalize_labels(&self, df: &mut DataFrame) -> Result<()> {
        for (column, mapping) in &self.canonical_labels {
            if df.column(column).is_err() {
                continue;
            }

            let normalized: Vec<Option<String>> = df
                .column(column)?
                .str()?
                .into_iter()
                .map(|value| {
                    value.map(|s| mapping.get(s).cloned().unwrap_or_else(|| s.to_string()))
                })
                .collect();

            df.with_column(Series::new(column.as_str().into(), normalized))?;
        }

        Ok(())
    }

    /// Regression guard: the observed dataset has no negative values in
    /// these columns, but every run re-checks. Violations are reported
    /// as alerts, never clamped or dropped.
    fn check_numeric_signs(&self, df: &DataFrame) -> Result<Vec<QualityAlert>> {
        let mut alerts = Vec::new();

        for name in schema::SIGN_CHECKED_COLUMNS {
            let column = df
                .column(name)
                .with_context(|| format!("Sign-checked column missing: {}", name))?
                .cast(&DataType::Float64)
                .with_context(|| format!("Column is not numeric: {}", name))?;

            let violations = column
                .f64()?
                .into_iter()
                .flatten()
                .filter(|value| *value < 0.0)
                .count();

            if violations > 0 {
                warn!("Found {} negative values in column {}", violations, name);
                alerts.push(QualityAlert::new("negative_value", name, violations));
            }
        }

        Ok(alerts)
    }

    /// Same character as the sign check: all observed dates parse, so an
    /// unparseable value in new data is a quality alert.
    fn check_issue_dates(&self, df: &DataFrame) -> Result<Vec<QualityAlert>> {
        let column = df.column(schema::DATE_COLUMN)?;
        if column.dtype() != &DataType::String {
            return Ok(Vec::new());
        }

        let violations = column
            .str()?
            .into_iter()
            .flatten()
            .filter(|value| !value.is_empty() && !parse_issue_date(value))
            .count();

        let mut alerts = Vec::new();
        if violations > 0 {
            warn!(
                "Found {} unparseable values in column {}",
                violations,
                schema::DATE_COLUMN
            );
            alerts.push(QualityAlert::new("unparseable_date", schema::DATE_COLUMN, violations));
        }

        Ok(alerts)
    }
}

fn parse_issue_date(raw: &str) -> bool {
    if DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(raw, format).is_ok())
    {
        return true;
    }

    // Month-granularity values like "Aug-2021" need a day to parse.
    MONTH_FORMATS.iter().any(|format| {
        NaiveDate::parse_from_str(&format!("01-{}", raw), &format!("%d-{}", format)).is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: Vec<Column>) -> DataFrame {
        DataFrame::new(columns).unwrap()
    }

    fn text_column(name: &str, values: &[Option<&str>]) -> Column {
        Series::new(name.into(), values).into()
    }

    fn purpose_frame(purpose: &[Option<&str>], purpose2: &[Option<&str>]) -> DataFrame {
        frame(vec![
            text_column("purpose", purpose),
            text_column("purpose2", purpose2),
        ])
    }

    #[test]
    fn test_trim_covers_all_text_columns() {
        let mut df = frame(vec![
            text_column("term", &[Some("  36 months "), Some("60 months")]),
            text_column("grade", &[Some(" A"), Some("B ")]),
            Series::new("loan_amount".into(), &[1000.0, 2000.0]).into(),
        ]);

        Standardizer::new().trim_text_columns(&mut df).unwrap();

        let terms: Vec<&str> = df.column("term").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(terms, vec!["36 months", "60 months"]);
        let grades: Vec<&str> = df.column("grade").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(grades, vec!["A", "B"]);
    }

    #[test]
    fn test_purpose_merge_takes_populated_half() {
        let mut df = purpose_frame(
            &[Some("Debt Consolidation"), None, None],
            &[None, Some("Car"), None],
        );

        Standardizer::new().merge_purpose_columns(&mut df).unwrap();

        let merged: Vec<&str> = df.column("purpose").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(merged, vec!["Debt Consolidation", "Car", ""]);
        assert!(df.column("purpose2").is_err());
    }

    #[test]
    fn test_purpose_merge_accepts_agreeing_halves() {
        let mut df = purpose_frame(&[Some("Car")], &[Some("Car")]);

        Standardizer::new().merge_purpose_columns(&mut df).unwrap();

        let merged: Vec<&str> = df.column("purpose").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(merged, vec!["Car"]);
    }

    #[test]
    fn test_purpose_merge_conflict_is_an_error() {
        let mut df = purpose_frame(&[Some("Car")], &[Some("Home Improvement")]);

        let err = Standardizer::new().merge_purpose_columns(&mut df).unwrap_err();
        assert!(err.to_string().contains("no precedence rule"));
    }

    #[test]
    fn test_stray_dots_are_stripped_from_purpose() {
        let mut df = frame(vec![text_column(
            "purpose",
            &[Some("Other."), Some("..Car.."), Some("Debt Consolidation")],
        )]);

        Standardizer::new().strip_purpose_punctuation(&mut df).unwrap();

        let cleaned: Vec<&str> = df.column("purpose").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(cleaned, vec!["Other", "Car", "Debt Consolidation"]);
    }

    #[test]
    fn test_home_ownership_synonyms_collapse() {
        let mut df = frame(vec![text_column(
            "home_ownership",
            &[Some("Renter"), Some("Renting"), Some("Rent"), Some("Mortgage")],
        )]);

        Standardizer::new().canonicalize_labels(&mut df).unwrap();

        let labels: Vec<&str> = df
            .column("home_ownership")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(labels, vec!["Rent", "Rent", "Rent", "Mortgage"]);
    }

    #[test]
    fn test_config_labels_extend_builtin_map() {
        let mut standardizer = Standardizer::new();
        let mut extra_mapping = HashMap::new();
        extra_mapping.insert("Owner".to_string(), "Own".to_string());
        let mut extra = HashMap::new();
        extra.insert("home_ownership".to_string(), extra_mapping);
        standardizer.extend_labels(extra);

        let mut df = frame(vec![text_column(
            "home_ownership",
            &[Some("Owner"), Some("Renter")],
        )]);

        standardizer.canonicalize_labels(&mut df).unwrap();

        let labels: Vec<&str> = df
            .column("home_ownership")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(labels, vec!["Own", "Rent"]);
    }

    #[test]
    fn test_negative_amount_is_reported_not_fixed() {
        let mut columns = vec![Series::new("loan_amount".into(), &[-100.0, 5000.0]).into()];
        for name in ["interest_rate", "installment", "debt_to_income", "total_payment"] {
            columns.push(Series::new(name.into(), &[0.1, 0.2]).into());
        }
        let df = frame(columns);

        let alerts = Standardizer::new().check_numeric_signs(&df).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].check, "negative_value");
        assert_eq!(alerts[0].column, "loan_amount");
        assert_eq!(alerts[0].violations, 1);
        // The offending row is still there for the operator to inspect.
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_clean_numeric_columns_raise_no_alerts() {
        let mut columns: Vec<Column> = Vec::new();
        for name in schema::SIGN_CHECKED_COLUMNS {
            columns.push(Series::new(name.into(), &[0.0, 1.5]).into());
        }
        let df = frame(columns);

        let alerts = Standardizer::new().check_numeric_signs(&df).unwrap();
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_unparseable_issue_date_is_reported() {
        let df = frame(vec![text_column(
            "issue_date",
            &[Some("2021-08-11"), Some("Aug-2021"), Some("not a date")],
        )]);

        let alerts = Standardizer::new().check_issue_dates(&df).unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].check, "unparseable_date");
        assert_eq!(alerts[0].violations, 1);
    }
}
