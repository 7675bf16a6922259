//! Summary aggregator - one row per process with a derived FTE count and an
//! independently editable billing rate.
//!
//! The set of summary rows is fixed at construction. Recomputation only
//! rewrites `fte_count`; rows whose process has no allocations are zeroed
//! and kept.

use crate::{
    core::field::{EditOutcome, NumericField},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// One process's aggregated FTE and billing rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Process key, unique within a summary
    pub process: String,
    /// Sum of allocation FTE for this process
    #[serde(default)]
    pub fte_count: f64,
    /// Monetary rate per FTE
    #[serde(default)]
    pub rate: NumericField,
}

impl SummaryRow {
    /// Creates a row with a zero count.
    #[must_use]
    pub fn new(process: &str, rate: f64) -> Self {
        Self {
            process: process.to_string(),
            fte_count: 0.0,
            rate: NumericField::from(rate),
        }
    }

    /// `fte_count × rate`, with a blank rate counted as zero.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.fte_count * self.rate.value()
    }
}

/// Fixed set of summary rows keyed by process.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    rows: Vec<SummaryRow>,
}

impl Summary {
    /// Copies the caller's rows. Two rows may not share a process key.
    pub fn new(rows: &[SummaryRow]) -> Result<Self> {
        let mut seen = HashSet::new();
        for row in rows {
            if !seen.insert(row.process.as_str()) {
                return Err(Error::DuplicateProcess {
                    process: row.process.clone(),
                });
            }
        }

        Ok(Self {
            rows: rows.to_vec(),
        })
    }

    /// Current rows in their original order.
    #[must_use]
    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    /// Looks up a row by process key.
    #[must_use]
    pub fn row(&self, process: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.process == process)
    }

    fn row_mut(&mut self, process: &str) -> Option<&mut SummaryRow> {
        self.rows.iter_mut().find(|r| r.process == process)
    }

    /// Rewrites every row's count from per-process allocation totals.
    pub fn recompute(&mut self, totals: &BTreeMap<String, f64>) {
        for row in &mut self.rows {
            row.fte_count = totals.get(&row.process).copied().unwrap_or(0.0);
        }
    }

    /// Feeds raw input into a process's rate cell.
    pub fn set_rate(&mut self, process: &str, raw: &str) -> EditOutcome {
        let Some(row) = self.row_mut(process) else {
            debug!("Ignoring rate edit for unknown process {process:?}");
            return EditOutcome::Rejected;
        };

        let outcome = row.rate.apply_input(raw);
        if outcome == EditOutcome::Rejected {
            debug!("Rejected rate input {raw:?} for process {process:?}");
        }
        outcome
    }

    /// Commits a process's rate cell. Returns `true` when a blank became zero.
    pub fn commit_rate(&mut self, process: &str) -> bool {
        self.row_mut(process).is_some_and(|row| row.rate.commit())
    }

    /// Sum of every row's FTE count.
    #[must_use]
    pub fn total_fte(&self) -> f64 {
        self.rows.iter().map(|r| r.fte_count).sum()
    }

    /// Sum of `fte_count × rate` over all rows.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.rows.iter().map(SummaryRow::amount).sum()
    }

    /// Whether a row exists for the process key.
    #[must_use]
    pub fn contains(&self, process: &str) -> bool {
        self.row(process).is_some()
    }
}
