//! Shared test utilities.
//!
//! This module provides the sample invoice used across tests (two Billing
//! allocations, one Support allocation, rates 100 and 50), an in-memory
//! database, and a fixed clock.

use crate::{
    core::{
        allocation::AllocationRow,
        history::InvoiceStatus,
        session::{InvoiceFeatures, InvoiceInput, InvoiceSession},
        summary::SummaryRow,
    },
    entities::invoice,
    errors::Result,
};
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer tracing subscriber once per test binary.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// 2025-11-04 09:30:15, the start time of every sample session.
#[allow(clippy::unwrap_used)]
pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, 4)
        .unwrap()
        .and_hms_opt(9, 30, 15)
        .unwrap()
}

/// Billing 0.5 + 0.25, Support 1.0.
pub fn sample_allocations() -> Vec<AllocationRow> {
    vec![
        AllocationRow::new(1, "Asha Rao", "Billing", 0.5),
        AllocationRow::new(2, "Ravi Kumar", "Billing", 0.25),
        AllocationRow::new(3, "Meera Nair", "Support", 1.0),
    ]
}

/// Billing at 100, Support at 50, counts not yet computed.
pub fn sample_summary() -> Vec<SummaryRow> {
    vec![SummaryRow::new("Billing", 100.0), SummaryRow::new("Support", 50.0)]
}

/// Sample input for "Project Alpha", November 2025, no invoice number or
/// discount.
pub fn sample_input() -> InvoiceInput {
    InvoiceInput {
        month: "November".to_string(),
        year: 2025,
        project_name: "Project Alpha".to_string(),
        invoice_number: None,
        summary: sample_summary(),
        allocations: sample_allocations(),
        discount: None,
    }
}

/// Full-featured session over [`sample_input`] at [`fixed_time`].
#[allow(clippy::unwrap_used)]
pub fn sample_session() -> InvoiceSession {
    InvoiceSession::new(&sample_input(), InvoiceFeatures::default(), fixed_time()).unwrap()
}

/// A stored invoice row for history tests, billed November 2025.
#[allow(clippy::unwrap_used)]
pub fn stored_invoice(
    id: i64,
    invoice_number: &str,
    project_name: &str,
    grand_total: f64,
    status: InvoiceStatus,
) -> invoice::Model {
    invoice::Model {
        id,
        invoice_number: invoice_number.to_string(),
        project_name: project_name.to_string(),
        month: "November".to_string(),
        year: 2025,
        total_fte: 1.0,
        subtotal_amount: grand_total,
        discount: 0.0,
        grand_total,
        status: status.as_str().to_string(),
        notes: None,
        created_by: None,
        created_at: Utc.with_ymd_and_hms(2025, 11, 4, 9, 30, 15).unwrap(),
        due_date: NaiveDate::from_ymd_opt(2025, 12, 4).unwrap(),
    }
}
