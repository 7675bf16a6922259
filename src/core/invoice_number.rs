//! Invoice number generation.
//!
//! Generated numbers look like `INV-20251104-093015`: the local wall-clock
//! time at second granularity. There is no collision detection.

use chrono::{Local, NaiveDateTime};

/// Prefix shared by all generated invoice numbers.
pub const INVOICE_NUMBER_PREFIX: &str = "INV-";

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Formats an invoice number from a local timestamp.
#[must_use]
pub fn generate_invoice_number(at: NaiveDateTime) -> String {
    format!("{INVOICE_NUMBER_PREFIX}{}", at.format(TIMESTAMP_FORMAT))
}

/// Formats an invoice number from the current local time.
#[must_use]
pub fn generate_now() -> String {
    generate_invoice_number(Local::now().naive_local())
}

/// Checks the `INV-YYYYMMDD-HHMMSS` shape: fixed-width, all-numeric fields.
#[must_use]
pub fn is_generated_format(value: &str) -> bool {
    let Some(rest) = value.strip_prefix(INVOICE_NUMBER_PREFIX) else {
        return false;
    };
    let Some((date, time)) = rest.split_once('-') else {
        return false;
    };

    date.len() == 8
        && time.len() == 6
        && date.bytes().all(|b| b.is_ascii_digit())
        && time.bytes().all(|b| b.is_ascii_digit())
}

/// The invoice number attached to one editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceIdentity {
    invoice_number: String,
    generated: bool,
}

impl InvoiceIdentity {
    /// Uses the supplied number, or generates one from `now` when the caller
    /// supplied nothing or only whitespace.
    #[must_use]
    pub fn resolve(supplied: Option<&str>, now: NaiveDateTime) -> Self {
        match supplied.map(str::trim).filter(|s| !s.is_empty()) {
            Some(number) => Self {
                invoice_number: number.to_string(),
                generated: false,
            },
            None => Self {
                invoice_number: generate_invoice_number(now),
                generated: true,
            },
        }
    }

    /// The invoice number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.invoice_number
    }

    /// Whether the number was generated rather than supplied.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated
    }
}
