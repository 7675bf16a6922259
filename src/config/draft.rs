//! Invoice draft loading.
//!
//! A draft is a TOML file holding the data one invoice session starts from:
//!
//! ```toml
//! month = "November"
//! year = 2025
//! project_name = "Project Alpha"
//! discount = 10.0
//!
//! [[summary]]
//! process = "Billing"
//! rate = 100.0
//!
//! [[allocations]]
//! id = 1
//! resource_name = "Asha Rao"
//! process = "Billing"
//! fte = 0.5
//! ```
//!
//! Summary rates missing from the draft are filled from the default rates in
//! [`AppSettings`]. A draft with no summary section gets one summary row per
//! allocation process.

use crate::{
    config::settings::AppSettings,
    core::{
        allocation::{AllocationLedger, AllocationRow},
        field::NumericField,
        session::InvoiceInput,
        summary::SummaryRow,
    },
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Summary row as written in a draft; the rate may be left out.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DraftSummaryRow {
    /// Process key
    pub process: String,
    /// Rate per FTE, or None to use the configured default
    #[serde(default)]
    pub rate: Option<f64>,
}

/// Contents of a draft file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InvoiceDraft {
    /// Billing month name
    pub month: String,
    /// Billing year
    pub year: i32,
    /// Project being billed
    #[serde(default)]
    pub project_name: String,
    /// Invoice number to use instead of a generated one
    #[serde(default)]
    pub invoice_number: Option<String>,
    /// Discount to pre-fill
    #[serde(default)]
    pub discount: Option<f64>,
    /// Per-process rows
    #[serde(default)]
    pub summary: Vec<DraftSummaryRow>,
    /// Per-resource rows
    #[serde(default)]
    pub allocations: Vec<AllocationRow>,
}

impl InvoiceDraft {
    /// Converts the draft into session input, resolving rates from settings.
    #[must_use]
    pub fn into_input(self, settings: &AppSettings) -> InvoiceInput {
        let summary_rows = if self.summary.is_empty() {
            derive_summary(&self.allocations)
        } else {
            self.summary
        };

        let summary = summary_rows
            .into_iter()
            .map(|row| {
                let rate = row
                    .rate
                    .or_else(|| settings.rate_for(&row.process))
                    .unwrap_or(0.0);
                debug!("Draft rate for process {:?}: {rate}", row.process);
                SummaryRow {
                    process: row.process,
                    fte_count: 0.0,
                    rate: NumericField::from(rate),
                }
            })
            .collect();

        InvoiceInput {
            month: self.month,
            year: self.year,
            project_name: self.project_name,
            invoice_number: self.invoice_number,
            summary,
            allocations: self.allocations,
            discount: self.discount,
        }
    }
}

fn derive_summary(allocations: &[AllocationRow]) -> Vec<DraftSummaryRow> {
    // duplicate ids fail later, when the session is built
    let processes = AllocationLedger::new(allocations).map_or_else(
        |_| Vec::new(),
        |ledger| ledger.processes(),
    );
    processes
        .into_iter()
        .map(|process| DraftSummaryRow {
            process,
            rate: None,
        })
        .collect()
}

/// Parses a draft from TOML text
pub fn parse_draft(contents: &str) -> Result<InvoiceDraft> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse invoice draft: {e}"),
    })
}

/// Loads a draft from a TOML file
pub fn load_draft<P: AsRef<Path>>(path: P) -> Result<InvoiceDraft> {
    let path_ref = path.as_ref();
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read invoice draft {}: {e}", path_ref.display()),
    })?;
    parse_draft(&contents)
}
