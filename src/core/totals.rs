//! Invoice totals calculator.
//!
//! Totals are derived on demand from the ledger and summary and never stored.
//! Arithmetic is plain `f64`; amounts are only rounded for display.

use crate::core::{allocation::AllocationLedger, field::NumericField, summary::Summary};

/// Tolerance used when checking that the two FTE totals agree.
pub const FTE_EPSILON: f64 = 1e-9;

/// Derived monetary and FTE totals for one invoice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvoiceTotals {
    /// Σ summary `fte_count`
    pub total_fte: f64,
    /// Σ allocation `fte`, computed independently as a cross-check
    pub total_allocation_fte: f64,
    /// Σ `fte_count × rate`
    pub subtotal_amount: f64,
    /// Discount subtracted from the subtotal
    pub discount: f64,
    /// Tax is not applied to these invoices
    pub tax: f64,
    /// `subtotal_amount - discount`
    pub grand_total: f64,
}

impl InvoiceTotals {
    /// Computes totals from current session state. A blank discount counts as zero.
    #[must_use]
    pub fn compute(ledger: &AllocationLedger, summary: &Summary, discount: NumericField) -> Self {
        let subtotal_amount = summary.subtotal();
        let discount = discount.value();

        Self {
            total_fte: summary.total_fte(),
            total_allocation_fte: ledger.total_fte(),
            subtotal_amount,
            discount,
            tax: 0.0,
            grand_total: subtotal_amount - discount,
        }
    }

    /// Whether the summary FTE total agrees with the allocation FTE total.
    ///
    /// They diverge when allocations reference a process that has no summary row.
    #[must_use]
    pub fn is_reconciled(&self) -> bool {
        (self.total_fte - self.total_allocation_fte).abs() < FTE_EPSILON
    }
}

/// Formats a monetary amount with two decimals.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Formats an FTE quantity with two decimals.
#[must_use]
pub fn format_fte(fte: f64) -> String {
    format!("{fte:.2}")
}
