use anyhow::Result;
use polars::prelude::*;
use std::collections::HashSet;
use std::fmt::Write as _;
use tracing::info;

/// Removes rows that are identical across every column of the table.
///
/// Rows are keyed by the full tuple of column values, so two rows match
/// only when they agree everywhere. The first row of each equivalence
/// class survives; order among duplicates carries no meaning since all
/// fields are equal by definition of the match.
pub struct Deduplicator;

impl Deduplicator {
    pub fn deduplicate(&self, df: DataFrame) -> Result<DataFrame> {
        let height = df.height();
        let mut seen = HashSet::with_capacity(height);
        let mut keep = Vec::with_capacity(height);

        for idx in 0..height {
            let mut key = String::new();
            if let Some(row) = df.get(idx) {
                for value in row {
                    write!(key, "{:?}\u{1f}", value)?;
                }
            }
            keep.push(seen.insert(key));
        }

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        let deduped = df.filter(&mask)?;

        info!(
            "Deduplication: {} rows in, {} duplicates removed",
            height,
            height - deduped.height()
        );

        Ok(deduped)
    }
}
