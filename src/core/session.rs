//! Invoice editing session.
//!
//! An [`InvoiceSession`] owns everything one invoice view edits: the
//! allocation ledger, the summary, the discount cell, and the invoice
//! identity. Feature flags select which cells are editable so a single type
//! covers read-only FTE reports as well as full invoices.
//!
//! Every change to an allocation's FTE or remarks is pushed to an optional
//! [`AllocationObserver`]. That callback is the only way state leaves the
//! session; persistence is the caller's business.

use crate::{
    core::{
        allocation::{AllocationLedger, AllocationRow},
        field::{EditOutcome, NumericField},
        invoice_number::InvoiceIdentity,
        summary::{Summary, SummaryRow},
        totals::InvoiceTotals,
    },
    errors::Result,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Which parts of an invoice are editable or shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceFeatures {
    /// Summary rates can be edited
    pub rate_editing: bool,
    /// A discount can be entered and is subtracted from the subtotal
    pub discount: bool,
    /// The invoice number is displayed
    pub show_invoice_number: bool,
}

impl InvoiceFeatures {
    /// FTE utilization report: no rates, no discount, no invoice number.
    #[must_use]
    pub const fn utilization_only() -> Self {
        Self {
            rate_editing: false,
            discount: false,
            show_invoice_number: false,
        }
    }
}

impl Default for InvoiceFeatures {
    fn default() -> Self {
        Self {
            rate_editing: true,
            discount: true,
            show_invoice_number: true,
        }
    }
}

/// Receives the full allocation and summary state after each allocation edit.
pub trait AllocationObserver {
    /// Called after an FTE or remarks change was applied.
    fn allocation_changed(&mut self, rows: &[AllocationRow], summary: &[SummaryRow]);
}

impl<F> AllocationObserver for F
where
    F: FnMut(&[AllocationRow], &[SummaryRow]),
{
    fn allocation_changed(&mut self, rows: &[AllocationRow], summary: &[SummaryRow]) {
        self(rows, summary);
    }
}

/// Caller-owned data an invoice session is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceInput {
    /// Billing month name, e.g. `"November"`
    pub month: String,
    /// Billing year
    pub year: i32,
    /// Project being billed
    pub project_name: String,
    /// Invoice number to use instead of a generated one
    pub invoice_number: Option<String>,
    /// Per-process summary rows
    pub summary: Vec<SummaryRow>,
    /// Per-resource allocation rows
    pub allocations: Vec<AllocationRow>,
    /// Discount to start from; ignored when discounts are disabled
    pub discount: Option<f64>,
}

/// One invoice being edited.
pub struct InvoiceSession {
    month: String,
    year: i32,
    project_name: String,
    identity: InvoiceIdentity,
    created_at: NaiveDateTime,
    features: InvoiceFeatures,
    ledger: AllocationLedger,
    summary: Summary,
    discount: NumericField,
    observer: Option<Box<dyn AllocationObserver>>,
}

impl InvoiceSession {
    /// Starts a session stamped with the current local time.
    pub fn start(input: &InvoiceInput, features: InvoiceFeatures) -> Result<Self> {
        Self::new(input, features, Local::now().naive_local())
    }

    /// Builds a session from a copy of the caller's data.
    ///
    /// Summary counts are recomputed from the allocations immediately, so
    /// any `fte_count` the caller supplied is ignored.
    pub fn new(
        input: &InvoiceInput,
        features: InvoiceFeatures,
        created_at: NaiveDateTime,
    ) -> Result<Self> {
        let ledger = AllocationLedger::new(&input.allocations)?;
        let mut summary = Summary::new(&input.summary)?;
        summary.recompute(&ledger.process_totals());

        let identity = InvoiceIdentity::resolve(input.invoice_number.as_deref(), created_at);

        let discount = match input.discount {
            Some(amount) if features.discount => NumericField::from(amount),
            Some(amount) => {
                debug!("Discount is disabled, ignoring starting discount {amount}");
                NumericField::ZERO
            }
            None => NumericField::ZERO,
        };

        let session = Self {
            month: input.month.clone(),
            year: input.year,
            project_name: input.project_name.clone(),
            identity,
            created_at,
            features,
            ledger,
            summary,
            discount,
            observer: None,
        };

        let unmatched = session.unmatched_processes();
        if !unmatched.is_empty() {
            warn!(
                "Invoice {}: allocations reference processes without a summary row: {:?}",
                session.invoice_number(),
                unmatched
            );
        }

        info!(
            "Started invoice session {} for '{}' ({} {}) with {} allocation rows",
            session.invoice_number(),
            session.project_name,
            session.month,
            session.year,
            session.ledger.rows().len()
        );

        Ok(session)
    }

    /// Installs the observer notified after allocation edits.
    #[must_use]
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: AllocationObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Replaces the observer notified after allocation edits.
    pub fn set_observer<O>(&mut self, observer: O)
    where
        O: AllocationObserver + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    fn recompute_and_notify(&mut self) {
        self.summary.recompute(&self.ledger.process_totals());
        self.notify();
    }

    fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.allocation_changed(self.ledger.rows(), self.summary.rows());
        }
    }

    /// Puts an allocation row into FTE edit mode.
    pub fn begin_fte_edit(&mut self, id: i64) -> bool {
        self.ledger.begin_edit(id)
    }

    /// Feeds raw input into an allocation's FTE cell.
    ///
    /// An applied value recomputes the summary and notifies the observer;
    /// blank and rejected input do neither.
    pub fn set_fte(&mut self, id: i64, raw: &str) -> EditOutcome {
        let outcome = self.ledger.set_fte(id, raw);
        if outcome.is_applied() {
            self.recompute_and_notify();
        }
        outcome
    }

    /// Commits an allocation's FTE cell (blur or Enter) and leaves edit mode.
    pub fn commit_fte(&mut self, id: i64) {
        if self.ledger.commit_fte(id) {
            self.recompute_and_notify();
        }
    }

    /// Replaces an allocation's remarks and notifies the observer.
    pub fn set_remarks(&mut self, id: i64, text: &str) -> bool {
        let found = self.ledger.set_remarks(id, text);
        if found {
            self.notify();
        }
        found
    }

    /// Feeds raw input into a summary rate. Rejected unless rate editing is on.
    pub fn set_rate(&mut self, process: &str, raw: &str) -> EditOutcome {
        if !self.features.rate_editing {
            debug!("Rate editing is disabled for invoice {}", self.invoice_number());
            return EditOutcome::Rejected;
        }
        self.summary.set_rate(process, raw)
    }

    /// Commits a summary rate cell.
    pub fn commit_rate(&mut self, process: &str) {
        self.summary.commit_rate(process);
    }

    /// Feeds raw input into the discount. Rejected unless discounts are on.
    pub fn set_discount(&mut self, raw: &str) -> EditOutcome {
        if !self.features.discount {
            debug!("Discount is disabled for invoice {}", self.invoice_number());
            return EditOutcome::Rejected;
        }
        let outcome = self.discount.apply_input(raw);
        if outcome == EditOutcome::Rejected {
            debug!("Rejected discount input {raw:?}");
        }
        outcome
    }

    /// Commits the discount cell.
    pub fn commit_discount(&mut self) {
        self.discount.commit();
    }

    /// Current totals. The discount only counts when the feature is enabled.
    #[must_use]
    pub fn totals(&self) -> InvoiceTotals {
        let discount = if self.features.discount {
            self.discount
        } else {
            NumericField::ZERO
        };
        InvoiceTotals::compute(&self.ledger, &self.summary, discount)
    }

    /// Allocation processes that no summary row covers.
    #[must_use]
    pub fn unmatched_processes(&self) -> Vec<String> {
        self.ledger
            .processes()
            .into_iter()
            .filter(|p| !self.summary.contains(p))
            .collect()
    }

    /// Current allocation rows.
    #[must_use]
    pub fn allocations(&self) -> &[AllocationRow] {
        self.ledger.rows()
    }

    /// Current summary rows.
    #[must_use]
    pub fn summary_rows(&self) -> &[SummaryRow] {
        self.summary.rows()
    }

    /// Allocation row currently in FTE edit mode.
    #[must_use]
    pub const fn editing_id(&self) -> Option<i64> {
        self.ledger.editing_id()
    }

    /// The discount cell.
    #[must_use]
    pub const fn discount(&self) -> NumericField {
        self.discount
    }

    /// Invoice number, fixed for the lifetime of the session.
    #[must_use]
    pub fn invoice_number(&self) -> &str {
        self.identity.as_str()
    }

    /// Invoice identity, including whether the number was generated.
    #[must_use]
    pub const fn identity(&self) -> &InvoiceIdentity {
        &self.identity
    }

    /// When the session was started.
    #[must_use]
    pub const fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Enabled features.
    #[must_use]
    pub const fn features(&self) -> InvoiceFeatures {
        self.features
    }

    /// Billing month name.
    #[must_use]
    pub fn month(&self) -> &str {
        &self.month
    }

    /// Billing year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Project being billed.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }
}

impl fmt::Debug for InvoiceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvoiceSession")
            .field("invoice_number", &self.identity.as_str())
            .field("project_name", &self.project_name)
            .field("month", &self.month)
            .field("year", &self.year)
            .field("features", &self.features)
            .field("ledger", &self.ledger)
            .field("summary", &self.summary)
            .field("discount", &self.discount)
            .field("has_observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::{invoice_number::is_generated_format, totals::format_amount},
        errors::Error,
        test_utils::*,
    };
    use std::{cell::RefCell, rc::Rc};

    type Seen = Rc<RefCell<Vec<(Vec<AllocationRow>, Vec<SummaryRow>)>>>;

    fn recording_session(features: InvoiceFeatures) -> (InvoiceSession, Seen) {
        init_test_tracing();
        let seen: Seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let session = InvoiceSession::new(&sample_input(), features, fixed_time())
            .unwrap()
            .with_observer(move |rows: &[AllocationRow], summary: &[SummaryRow]| {
                sink.borrow_mut().push((rows.to_vec(), summary.to_vec()));
            });
        (session, seen)
    }

    #[test]
    fn test_billing_and_support_scenario() {
        let (mut session, _) = recording_session(InvoiceFeatures::default());

        assert_eq!(session.summary_rows()[0].fte_count, 0.75);
        assert_eq!(session.summary_rows()[1].fte_count, 1.0);
        assert_eq!(session.set_discount("10"), EditOutcome::Applied);

        let totals = session.totals();
        assert_eq!(format_amount(totals.subtotal_amount), "125.00");
        assert_eq!(format_amount(totals.grand_total), "115.00");
    }

    #[test]
    fn test_construction_recomputes_supplied_counts() {
        let mut input = sample_input();
        input.summary[0].fte_count = 42.0;
        let session =
            InvoiceSession::new(&input, InvoiceFeatures::default(), fixed_time()).unwrap();
        assert_eq!(session.summary_rows()[0].fte_count, 0.75);
    }

    #[test]
    fn test_construction_rejects_duplicate_process() {
        let mut input = sample_input();
        input.summary.push(SummaryRow::new("Support", 10.0));
        let result = InvoiceSession::new(&input, InvoiceFeatures::default(), fixed_time());
        assert!(matches!(result, Err(Error::DuplicateProcess { .. })));
    }

    #[test]
    fn test_starting_discount_applied() {
        let mut input = sample_input();
        input.discount = Some(10.0);
        let session =
            InvoiceSession::new(&input, InvoiceFeatures::default(), fixed_time()).unwrap();
        assert_eq!(session.discount(), NumericField::Value(10.0));
        assert_eq!(session.totals().grand_total, 115.0);
    }

    #[test]
    fn test_starting_discount_needs_feature_and_non_negative() {
        let mut input = sample_input();
        input.discount = Some(10.0);
        let session =
            InvoiceSession::new(&input, InvoiceFeatures::utilization_only(), fixed_time())
                .unwrap();
        assert_eq!(session.discount(), NumericField::ZERO);

        input.discount = Some(-5.0);
        let session =
            InvoiceSession::new(&input, InvoiceFeatures::default(), fixed_time()).unwrap();
        assert_eq!(session.discount(), NumericField::ZERO);
        assert_eq!(session.totals().grand_total, 125.0);
    }

    #[test]
    fn test_fte_edit_recomputes_and_notifies() {
        let (mut session, seen) = recording_session(InvoiceFeatures::default());

        assert!(session.begin_fte_edit(2));
        assert_eq!(session.set_fte(2, "0.5"), EditOutcome::Applied);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        let (rows, summary) = &seen[0];
        assert_eq!(rows[1].fte, NumericField::Value(0.5));
        assert_eq!(summary[0].fte_count, 1.0);
        assert_eq!(session.summary_rows()[0].fte_count, 1.0);
    }

    #[test]
    fn test_rejected_and_blank_input_do_not_notify() {
        let (mut session, seen) = recording_session(InvoiceFeatures::default());

        assert_eq!(session.set_fte(1, "-5"), EditOutcome::Rejected);
        assert_eq!(session.set_fte(1, "abc"), EditOutcome::Rejected);
        assert_eq!(session.set_fte(1, ""), EditOutcome::Pending);

        assert!(seen.borrow().is_empty());
        // blank leaves the summary at the last committed value
        assert_eq!(session.summary_rows()[0].fte_count, 0.75);
    }

    #[test]
    fn test_blank_commit_coerces_and_notifies() {
        let (mut session, seen) = recording_session(InvoiceFeatures::default());

        session.begin_fte_edit(1);
        session.set_fte(1, "");
        session.commit_fte(1);

        assert_eq!(session.allocations()[0].fte, NumericField::ZERO);
        assert_eq!(session.summary_rows()[0].fte_count, 0.25);
        assert_eq!(session.editing_id(), None);
        assert_eq!(seen.borrow().len(), 1);

        session.commit_fte(1);
        assert_eq!(session.allocations()[0].fte, NumericField::ZERO);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_remarks_notify_without_changing_totals() {
        let (mut session, seen) = recording_session(InvoiceFeatures::default());
        let before = session.totals();

        assert!(session.set_remarks(3, "on leave week 2"));
        assert!(!session.set_remarks(99, "missing"));

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(
            seen.borrow()[0].0[2].remarks.as_deref(),
            Some("on leave week 2")
        );
        assert_eq!(session.totals(), before);
    }

    #[test]
    fn test_rate_edit_updates_subtotal() {
        let (mut session, seen) = recording_session(InvoiceFeatures::default());

        assert_eq!(session.set_rate("Support", "80"), EditOutcome::Applied);
        assert_eq!(session.totals().subtotal_amount, 155.0);
        assert!(seen.borrow().is_empty());

        assert_eq!(session.set_rate("Support", ""), EditOutcome::Pending);
        assert_eq!(session.totals().subtotal_amount, 75.0);
        session.commit_rate("Support");
        assert_eq!(session.summary_rows()[1].rate, NumericField::ZERO);
    }

    #[test]
    fn test_disabled_features_reject_edits() {
        let (mut session, _) = recording_session(InvoiceFeatures::utilization_only());

        assert_eq!(session.set_rate("Billing", "500"), EditOutcome::Rejected);
        assert_eq!(session.set_discount("10"), EditOutcome::Rejected);
        assert_eq!(session.totals().discount, 0.0);
        assert_eq!(session.totals().subtotal_amount, 125.0);
    }

    #[test]
    fn test_discount_blank_then_commit() {
        let (mut session, _) = recording_session(InvoiceFeatures::default());
        session.set_discount("25");
        assert_eq!(session.set_discount("-3"), EditOutcome::Rejected);
        assert_eq!(session.discount(), NumericField::Value(25.0));

        session.set_discount("");
        assert_eq!(session.totals().grand_total, 125.0);
        session.commit_discount();
        assert_eq!(session.discount(), NumericField::ZERO);
    }

    #[test]
    fn test_invoice_number_generated_once() {
        let (session, _) = recording_session(InvoiceFeatures::default());
        assert_eq!(session.invoice_number(), "INV-20251104-093015");
        assert!(is_generated_format(session.invoice_number()));
        assert!(session.identity().is_generated());
    }

    #[test]
    fn test_unmatched_processes_reported() {
        let mut input = sample_input();
        input.allocations.push(AllocationRow::new(4, "Meera", "Onboarding", 0.5));
        let session =
            InvoiceSession::new(&input, InvoiceFeatures::default(), fixed_time()).unwrap();

        assert_eq!(session.unmatched_processes(), vec!["Onboarding"]);
        assert!(!session.totals().is_reconciled());
    }

    #[test]
    fn test_session_does_not_touch_caller_data() {
        let input = sample_input();
        let mut session =
            InvoiceSession::new(&input, InvoiceFeatures::default(), fixed_time()).unwrap();
        session.set_fte(1, "3");
        assert_eq!(input.allocations[0].fte, NumericField::Value(0.5));
        assert_eq!(input.summary[0].fte_count, 0.0);
    }
}
