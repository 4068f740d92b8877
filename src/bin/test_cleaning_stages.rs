use anyhow::Result;
use polars::prelude::*;

#[path = "../models/mod.rs"]
mod models;

#[path = "../processor/mod.rs"]
mod processor;

use processor::{Deduplicator, NullSchemaReducer, Standardizer};

fn main() -> Result<()> {
    println!("=== TESTING LOAN CLEANING STAGES ===\n");

    // Small raw sample covering the cases the cleaner exists for: one
    // exact duplicate, padded text, a split purpose pair, the "Other."
    // artifact, home-ownership synonyms, and a missing value.
    let columns: Vec<Column> = vec![
        Series::new("id".into(), &[Some(5i64), Some(5), Some(2), Some(9), Some(1)]).into(),
        Series::new(
            "loan_amount".into(),
            &[Some(10000.0), Some(10000.0), Some(5000.0), Some(8000.0), None],
        )
        .into(),
        Series::new(
            "term".into(),
            &[" 36 months", " 36 months", "60 months ", "36 months", "36 months"],
        )
        .into(),
        Series::new("interest_rate".into(), &[0.1475, 0.1475, 0.11, 0.09, 0.2]).into(),
        Series::new("installment".into(), &[330.5, 330.5, 120.0, 250.0, 90.0]).into(),
        Series::new("grade".into(), &["B", "B", "A", "C", "D"]).into(),
        Series::new("sub_grade".into(), &["B2", "B2", "A1", "C3", "D4"]).into(),
        Series::new(
            "employee_length".into(),
            &["5 years", "5 years", "10+ years", "< 1 year", "3 years"],
        )
        .into(),
        Series::new(
            "home_ownership".into(),
            &["Renter", "Renter", "Mortgage", "Renting", "Own"],
        )
        .into(),
        Series::new(
            "annual_income".into(),
            &[52000.0, 52000.0, 81000.0, 44000.0, 67000.0],
        )
        .into(),
        Series::new(
            "issue_date".into(),
            &["2021-08-11", "2021-08-11", "2021-03-02", "2020-12-24", "2021-01-15"],
        )
        .into(),
        Series::new(
            "loan_status".into(),
            &["Fully Paid", "Fully Paid", "Current", "Charged Off", "Fully Paid"],
        )
        .into(),
        Series::new(
            "purpose".into(),
            &[Some("Debt Consolidation"), Some("Debt Consolidation"), None, Some("Other."), Some("Home Improvement")],
        )
        .into(),
        Series::new(
            "purpose2".into(),
            &[None::<&str>, None, Some("Car"), None, None],
        )
        .into(),
        Series::new("address_state".into(), &["CA", "CA", "NY", "TX", "WA"]).into(),
        Series::new("debt_to_income".into(), &[0.18, 0.18, 0.09, 0.31, 0.22]).into(),
        Series::new(
            "total_payment".into(),
            &[11898.0, 11898.0, 5400.0, 9100.0, 3240.0],
        )
        .into(),
    ];

    let df = DataFrame::new(columns)?;

    println!("1. Raw staging table ({} rows):", df.height());
    println!("{}", df.head(Some(5)));

    let df = Deduplicator.deduplicate(df)?;
    println!("\n2. After deduplication ({} rows):", df.height());
    println!("{}", df.head(Some(5)));

    let (df, alerts) = Standardizer::new().standardize(df)?;
    println!("\n3. After standardization:");
    println!("{}", df.head(Some(5)));

    if alerts.is_empty() {
        println!("✅ No data-quality alerts");
    } else {
        for alert in &alerts {
            println!(
                "⚠️ Alert: {} in column {} ({} rows)",
                alert.check, alert.column, alert.violations
            );
        }
        return Ok(());
    }

    let reducer = NullSchemaReducer::new(vec!["annual_income".to_string()]);
    let (df, outcome) = reducer.reduce(df)?;
    println!("\n4. Finalized table (FINAL RESULT):");
    println!("{}", df);
    println!(
        "\nDropped {} null rows, {} empty rows, columns removed: {:?}",
        outcome.rows_dropped_null, outcome.rows_dropped_empty, outcome.dropped_columns
    );

    // Spot-check the invariants the downstream layer relies on
    if let Ok(purpose_col) = df.column("purpose") {
        println!("\n✅ Consolidated purpose values:");
        if let Ok(purposes) = purpose_col.str() {
            for (i, value) in purposes.into_iter().enumerate() {
                if let Some(purpose) = value {
                    println!("   Row {}: \"{}\"", i + 1, purpose);
                }
            }
        }
    }

    if let Ok(ownership_col) = df.column("home_ownership") {
        println!("\n✅ Canonical home_ownership values:");
        if let Ok(labels) = ownership_col.str() {
            for (i, value) in labels.into_iter().enumerate() {
                if let Some(label) = value {
                    println!("   Row {}: \"{}\"", i + 1, label);
                }
            }
        }
    }

    Ok(())
}
