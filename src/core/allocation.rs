//! Allocation ledger - the editable grid of per-resource FTE commitments.
//!
//! The ledger is the source of truth for FTE quantities. It holds a private
//! copy of the caller's rows and tracks which single row, if any, is in
//! numeric edit mode.

use crate::{
    core::field::{EditOutcome, NumericField},
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Aggregation bucket for rows without a process label.
pub const DEFAULT_PROCESS: &str = "General";

/// One resource's fractional staffing commitment to a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRow {
    /// Identifier, unique within a ledger
    pub id: i64,
    /// Name of the allocated resource
    #[serde(default)]
    pub resource_name: String,
    /// Role of the resource; older data calls this `role`
    #[serde(default, alias = "role")]
    pub employee_role: String,
    /// Agency supplying the resource
    #[serde(default)]
    pub agency_name: String,
    /// Process label used as the summary key
    #[serde(default)]
    pub process: Option<String>,
    /// Fraction of one full-time position
    #[serde(default)]
    pub fte: NumericField,
    /// Free-text remarks
    #[serde(default)]
    pub remarks: Option<String>,
}

impl AllocationRow {
    /// Creates a row with empty descriptive fields.
    #[must_use]
    pub fn new(id: i64, resource_name: &str, process: &str, fte: f64) -> Self {
        Self {
            id,
            resource_name: resource_name.to_string(),
            employee_role: String::new(),
            agency_name: String::new(),
            process: Some(process.to_string()),
            fte: NumericField::from(fte),
            remarks: None,
        }
    }

    /// The process key this row aggregates under.
    #[must_use]
    pub fn process_key(&self) -> &str {
        match self.process.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => DEFAULT_PROCESS,
        }
    }
}

/// Editable grid of allocation rows.
#[derive(Debug, Clone, Default)]
pub struct AllocationLedger {
    rows: Vec<AllocationRow>,
    editing_id: Option<i64>,
}

impl AllocationLedger {
    /// Copies the caller's rows into a new ledger. Row ids must be unique.
    pub fn new(rows: &[AllocationRow]) -> Result<Self> {
        let mut seen = HashSet::new();
        for row in rows {
            if !seen.insert(row.id) {
                return Err(Error::DuplicateAllocationId { id: row.id });
            }
        }

        Ok(Self {
            rows: rows.to_vec(),
            editing_id: None,
        })
    }

    /// Current rows in their original order.
    #[must_use]
    pub fn rows(&self) -> &[AllocationRow] {
        &self.rows
    }

    /// Looks up a row by id.
    #[must_use]
    pub fn row(&self, id: i64) -> Option<&AllocationRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    fn row_mut(&mut self, id: i64) -> Option<&mut AllocationRow> {
        self.rows.iter_mut().find(|r| r.id == id)
    }

    /// Row currently in numeric edit mode.
    #[must_use]
    pub const fn editing_id(&self) -> Option<i64> {
        self.editing_id
    }

    /// Puts a row into numeric edit mode, taking it away from any other row.
    /// Returns `false` for an unknown id.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        if self.row(id).is_none() {
            return false;
        }
        self.editing_id = Some(id);
        true
    }

    /// Feeds raw input into a row's FTE cell.
    ///
    /// Unknown ids are treated like malformed input.
    pub fn set_fte(&mut self, id: i64, raw: &str) -> EditOutcome {
        let Some(row) = self.row_mut(id) else {
            debug!("Ignoring FTE edit for unknown allocation row {id}");
            return EditOutcome::Rejected;
        };

        let outcome = row.fte.apply_input(raw);
        if outcome == EditOutcome::Rejected {
            debug!("Rejected FTE input {raw:?} for allocation row {id}");
        }
        outcome
    }

    /// Commits a row's FTE cell and leaves edit mode.
    ///
    /// Returns `true` when a blank value was coerced to zero.
    pub fn commit_fte(&mut self, id: i64) -> bool {
        let coerced = self.row_mut(id).is_some_and(|row| row.fte.commit());
        self.editing_id = None;
        coerced
    }

    /// Replaces a row's remarks. Returns `false` for an unknown id.
    pub fn set_remarks(&mut self, id: i64, text: &str) -> bool {
        match self.row_mut(id) {
            Some(row) => {
                row.remarks = Some(text.to_string());
                true
            }
            None => false,
        }
    }

    /// Summed FTE per process key.
    #[must_use]
    pub fn process_totals(&self) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for row in &self.rows {
            *totals.entry(row.process_key().to_string()).or_default() += row.fte.value();
        }
        totals
    }

    /// Sum of every row's FTE.
    #[must_use]
    pub fn total_fte(&self) -> f64 {
        self.rows.iter().map(|r| r.fte.value()).sum()
    }

    /// Distinct process keys in first-seen order.
    #[must_use]
    pub fn processes(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(AllocationRow::process_key)
            .filter(|p| seen.insert(*p))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::sample_allocations;

    #[test]
    fn test_new_rejects_duplicate_ids() {
        let rows = vec![
            AllocationRow::new(1, "Asha", "Billing", 0.5),
            AllocationRow::new(1, "Ravi", "Support", 1.0),
        ];
        let result = AllocationLedger::new(&rows);
        assert!(matches!(result, Err(Error::DuplicateAllocationId { id: 1 })));
    }

    #[test]
    fn test_new_copies_rows() {
        let mut rows = sample_allocations();
        let ledger = AllocationLedger::new(&rows).unwrap();
        rows[0].fte = NumericField::Value(9.0);
        assert_eq!(ledger.row(1).unwrap().fte, NumericField::Value(0.5));
    }

    #[test]
    fn test_set_fte_rejects_invalid_input() {
        let mut ledger = AllocationLedger::new(&sample_allocations()).unwrap();

        assert_eq!(ledger.set_fte(1, "-5"), EditOutcome::Rejected);
        assert_eq!(ledger.set_fte(1, "abc"), EditOutcome::Rejected);
        assert_eq!(ledger.row(1).unwrap().fte, NumericField::Value(0.5));
    }

    #[test]
    fn test_set_fte_unknown_row_is_rejected() {
        let mut ledger = AllocationLedger::new(&sample_allocations()).unwrap();
        assert_eq!(ledger.set_fte(99, "1"), EditOutcome::Rejected);
    }

    #[test]
    fn test_blank_then_commit_is_zero() {
        let mut ledger = AllocationLedger::new(&sample_allocations()).unwrap();
        assert!(ledger.begin_edit(2));

        assert_eq!(ledger.set_fte(2, ""), EditOutcome::Pending);
        assert!(ledger.row(2).unwrap().fte.is_blank());

        assert!(ledger.commit_fte(2));
        assert_eq!(ledger.row(2).unwrap().fte, NumericField::ZERO);
        assert_eq!(ledger.editing_id(), None);
    }

    #[test]
    fn test_commit_is_idempotent() {
        let mut ledger = AllocationLedger::new(&sample_allocations()).unwrap();
        assert_eq!(ledger.set_fte(3, "0.8"), EditOutcome::Applied);

        assert!(!ledger.commit_fte(3));
        assert!(!ledger.commit_fte(3));
        assert_eq!(ledger.row(3).unwrap().fte, NumericField::Value(0.8));
    }

    #[test]
    fn test_edit_mode_is_exclusive() {
        let mut ledger = AllocationLedger::new(&sample_allocations()).unwrap();
        assert!(ledger.begin_edit(1));
        assert!(ledger.begin_edit(3));
        assert_eq!(ledger.editing_id(), Some(3));
        assert!(!ledger.begin_edit(42));
        assert_eq!(ledger.editing_id(), Some(3));
    }

    #[test]
    fn test_process_totals_groups_blank_process_as_general() {
        let mut rows = sample_allocations();
        rows.push(AllocationRow {
            process: None,
            ..AllocationRow::new(4, "Meera", "", 0.5)
        });
        rows.push(AllocationRow::new(5, "Kiran", "  ", 0.25));
        let ledger = AllocationLedger::new(&rows).unwrap();

        let totals = ledger.process_totals();
        assert_eq!(totals["Billing"], 0.75);
        assert_eq!(totals["Support"], 1.0);
        assert_eq!(totals[DEFAULT_PROCESS], 0.75);
        assert_eq!(ledger.total_fte(), 2.5);
        assert_eq!(ledger.processes(), vec!["Billing", "Support", "General"]);
    }

    #[test]
    fn test_set_remarks() {
        let mut ledger = AllocationLedger::new(&sample_allocations()).unwrap();
        assert!(ledger.set_remarks(2, "half month"));
        assert_eq!(ledger.row(2).unwrap().remarks.as_deref(), Some("half month"));
        assert!(!ledger.set_remarks(7, "nobody"));
    }

    #[test]
    fn test_legacy_role_alias_deserializes() {
        let row: AllocationRow =
            toml::from_str("id = 4\nresource_name = \"Meera\"\nrole = \"Analyst\"\nfte = 0.5")
                .unwrap();
        assert_eq!(row.employee_role, "Analyst");
        assert_eq!(row.process_key(), DEFAULT_PROCESS);
        assert_eq!(row.fte, NumericField::Value(0.5));
    }
}
