//! Invoice history views - status handling, filtering, and per-status totals
//! over stored invoices.

use crate::{
    entities::invoice,
    errors::{Error, Result},
};
use std::{collections::HashSet, fmt, str::FromStr};

/// Lifecycle status of a stored invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceStatus {
    /// Saved but not yet sent
    Draft,
    /// Sent and awaiting payment
    Pending,
    /// Payment received
    Paid,
    /// Past due without payment
    Overdue,
}

impl InvoiceStatus {
    /// Storage form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    /// Capitalized label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            _ => Err(Error::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Criteria for narrowing the invoice history. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Only invoices with this status
    pub status: Option<InvoiceStatus>,
    /// Only invoices for this exact project
    pub project: Option<String>,
    /// Case-insensitive substring of the invoice number, project, or notes
    pub search: String,
}

impl HistoryFilter {
    /// Whether an invoice satisfies every criterion.
    #[must_use]
    pub fn matches(&self, invoice: &invoice::Model) -> bool {
        let status_ok = self
            .status
            .is_none_or(|status| invoice.status == status.as_str());
        let project_ok = self
            .project
            .as_deref()
            .is_none_or(|project| invoice.project_name == project);

        status_ok && project_ok && self.matches_search(invoice)
    }

    fn matches_search(&self, invoice: &invoice::Model) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        invoice.invoice_number.to_lowercase().contains(&needle)
            || invoice.project_name.to_lowercase().contains(&needle)
            || invoice
                .notes
                .as_deref()
                .is_some_and(|notes| notes.to_lowercase().contains(&needle))
    }
}

/// Invoices that satisfy the filter, in their original order.
#[must_use]
pub fn filter_invoices<'a>(
    invoices: &'a [invoice::Model],
    filter: &HistoryFilter,
) -> Vec<&'a invoice::Model> {
    invoices.iter().filter(|inv| filter.matches(inv)).collect()
}

/// Distinct project names in first-seen order, for a project picker.
#[must_use]
pub fn unique_projects(invoices: &[invoice::Model]) -> Vec<String> {
    let mut seen = HashSet::new();
    invoices
        .iter()
        .filter(|inv| seen.insert(inv.project_name.as_str()))
        .map(|inv| inv.project_name.clone())
        .collect()
}

/// Sum of grand totals, optionally restricted to one status.
#[must_use]
pub fn total_amount(invoices: &[&invoice::Model], status: Option<InvoiceStatus>) -> f64 {
    invoices
        .iter()
        .filter(|inv| status.is_none_or(|s| inv.status == s.as_str()))
        .map(|inv| inv.grand_total)
        .sum()
}
