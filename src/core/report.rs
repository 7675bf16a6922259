//! Plain-text invoice rendering.
//!
//! This module turns an [`InvoiceSession`] into a printable document and
//! provides one-line summaries of stored invoices. Amounts and FTE values are
//! always shown with two decimals.

use crate::{
    config::settings::{AppSettings, CompanySettings},
    core::{
        history::InvoiceStatus,
        session::InvoiceSession,
        totals::{format_amount, format_fte},
    },
    entities::invoice,
};
use chrono::{Days, NaiveDate};
use std::fmt;

/// Placeholder shown when an invoice has no project name.
const UNNAMED_PROJECT: &str = "Project Name";

/// Due date `terms_days` after the invoice date.
#[must_use]
pub fn due_date(invoice_date: NaiveDate, terms_days: u32) -> NaiveDate {
    invoice_date
        .checked_add_days(Days::new(u64::from(terms_days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Header block of a printed invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceHeader {
    /// Issuing company
    pub company: CompanySettings,
    /// Project the invoice is addressed to
    pub bill_to: String,
    /// Date the invoice was issued
    pub invoice_date: NaiveDate,
    /// Date payment is due
    pub due_date: NaiveDate,
}

impl InvoiceHeader {
    /// Builds the header for a session: issued on the session's start date,
    /// due after the configured payment terms.
    #[must_use]
    pub fn for_session(session: &InvoiceSession, settings: &AppSettings) -> Self {
        let invoice_date = session.created_at().date();
        let bill_to = if session.project_name().trim().is_empty() {
            UNNAMED_PROJECT.to_string()
        } else {
            session.project_name().to_string()
        };

        Self {
            company: settings.company.clone(),
            bill_to,
            invoice_date,
            due_date: due_date(invoice_date, settings.payment_terms_days),
        }
    }
}

/// A session paired with its header, printable via `Display`.
#[derive(Debug)]
pub struct InvoiceDocument<'a> {
    session: &'a InvoiceSession,
    header: &'a InvoiceHeader,
}

impl<'a> InvoiceDocument<'a> {
    /// Pairs a session with its header.
    #[must_use]
    pub const fn new(session: &'a InvoiceSession, header: &'a InvoiceHeader) -> Self {
        Self { session, header }
    }

    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let company = &self.header.company;
        writeln!(f, "{}", company.name)?;
        for line in &company.address {
            writeln!(f, "{line}")?;
        }
        writeln!(f, "{}", company.contact)?;
        writeln!(f)?;

        if self.session.features().show_invoice_number {
            writeln!(f, "INVOICE {}", self.session.invoice_number())?;
        }
        writeln!(f, "BILL TO:      {}", self.header.bill_to)?;
        writeln!(f, "INVOICE DATE: {}", self.header.invoice_date.format("%Y-%m-%d"))?;
        writeln!(f, "DUE DATE:     {}", self.header.due_date.format("%Y-%m-%d"))?;
        writeln!(
            f,
            "PERIOD:       {} {}",
            self.session.month(),
            self.session.year()
        )
    }

    fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FTE UTILIZATION SUMMARY")?;
        writeln!(f, "{:<24} {:>8} {:>12} {:>12}", "Process", "FTE", "Rate", "Amount")?;
        for row in self.session.summary_rows() {
            writeln!(
                f,
                "{:<24} {:>8} {:>12} {:>12}",
                row.process,
                format_fte(row.fte_count),
                row.rate.display(),
                format_amount(row.amount())
            )?;
        }
        writeln!(
            f,
            "{:<24} {:>8}",
            "Total FTE",
            format_fte(self.session.totals().total_fte)
        )
    }

    fn write_allocations(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FTE ALLOCATION DETAILS")?;
        writeln!(
            f,
            "{:<20} {:<16} {:<14} {:<16} {:>6}  Remarks",
            "Resource", "Role", "Agency", "Process", "FTE"
        )?;
        for row in self.session.allocations() {
            writeln!(
                f,
                "{:<20} {:<16} {:<14} {:<16} {:>6}  {}",
                row.resource_name,
                row.employee_role,
                row.agency_name,
                row.process_key(),
                row.fte.display(),
                row.remarks.as_deref().unwrap_or("")
            )?;
        }
        writeln!(
            f,
            "{:<20} {:>56}",
            "Total Allocation FTE",
            format_fte(self.session.totals().total_allocation_fte)
        )
    }

    fn write_totals(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals = self.session.totals();
        writeln!(f, "{:<14} {:>12}", "Subtotal", format_amount(totals.subtotal_amount))?;
        if self.session.features().discount {
            writeln!(f, "{:<14} {:>12}", "Discount", format_amount(totals.discount))?;
        }
        writeln!(f, "{:<14} {:>12}", "Tax", format_amount(totals.tax))?;
        writeln!(f, "{:<14} {:>12}", "Grand Total", format_amount(totals.grand_total))?;

        if !totals.is_reconciled() {
            writeln!(f)?;
            writeln!(
                f,
                "Note: summary FTE {} differs from allocation FTE {} (unmatched: {})",
                format_fte(totals.total_fte),
                format_fte(totals.total_allocation_fte),
                self.session.unmatched_processes().join(", ")
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for InvoiceDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        writeln!(f)?;
        self.write_summary(f)?;
        writeln!(f)?;
        self.write_allocations(f)?;
        writeln!(f)?;
        self.write_totals(f)
    }
}

/// Renders a session as a plain-text invoice.
#[must_use]
pub fn render_invoice(session: &InvoiceSession, header: &InvoiceHeader) -> String {
    InvoiceDocument::new(session, header).to_string()
}

/// One-line summary of a stored invoice.
///
/// Unknown status strings are shown as stored.
#[must_use]
pub fn format_invoice_summary(invoice: &invoice::Model) -> String {
    let status = invoice
        .status
        .parse::<InvoiceStatus>()
        .map_or_else(|_| invoice.status.clone(), |s| s.label().to_string());

    format!(
        "{} | {} | {} {} | {} | {}",
        invoice.invoice_number,
        invoice.project_name,
        invoice.month,
        invoice.year,
        status,
        format_amount(invoice.grand_total)
    )
}
