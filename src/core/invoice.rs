//! Invoice persistence - stores finished sessions and single-resource
//! requests, and reads them back for history and re-editing.
//!
//! Each save runs in one database transaction: the header and all of its
//! lines are written together or not at all.

use crate::{
    core::{
        allocation::AllocationRow,
        billing::ValidatedRequest,
        field::NumericField,
        history::InvoiceStatus,
        session::{InvoiceInput, InvoiceSession},
        summary::SummaryRow,
    },
    entities::{Invoice, InvoiceLine, invoice, invoice_line},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// `line_kind` of per-process lines.
pub const SUMMARY_LINE: &str = "summary";
/// `line_kind` of per-resource lines.
pub const ALLOCATION_LINE: &str = "allocation";

async fn ensure_unique_number<C>(db: &C, invoice_number: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = Invoice::find()
        .filter(invoice::Column::InvoiceNumber.eq(invoice_number))
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(Error::DuplicateInvoice {
            invoice_number: invoice_number.to_string(),
        });
    }
    Ok(())
}

fn summary_line(
    invoice_id: i64,
    position: usize,
    row: &SummaryRow,
) -> Result<invoice_line::ActiveModel> {
    Ok(invoice_line::ActiveModel {
        invoice_id: Set(invoice_id),
        line_kind: Set(SUMMARY_LINE.to_string()),
        position: Set(i32::try_from(position)?),
        allocation_id: Set(None),
        resource_name: Set(String::new()),
        employee_role: Set(String::new()),
        agency_name: Set(String::new()),
        process: Set(row.process.clone()),
        fte: Set(row.fte_count),
        rate: Set(row.rate.value()),
        remarks: Set(None),
        ..Default::default()
    })
}

fn allocation_line(
    invoice_id: i64,
    position: usize,
    row: &AllocationRow,
    rate: f64,
) -> Result<invoice_line::ActiveModel> {
    Ok(invoice_line::ActiveModel {
        invoice_id: Set(invoice_id),
        line_kind: Set(ALLOCATION_LINE.to_string()),
        position: Set(i32::try_from(position)?),
        allocation_id: Set(Some(row.id)),
        resource_name: Set(row.resource_name.clone()),
        employee_role: Set(row.employee_role.clone()),
        agency_name: Set(row.agency_name.clone()),
        process: Set(row.process_key().to_string()),
        fte: Set(row.fte.value()),
        rate: Set(rate),
        remarks: Set(row.remarks.clone()),
        ..Default::default()
    })
}

/// Local wall-clock time as UTC. Times skipped by a DST change are read as UTC.
fn local_to_utc(at: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&at)
        .earliest()
        .map_or_else(|| at.and_utc(), |local| local.with_timezone(&Utc))
}

/// Stores an editing session as a new invoice with its summary and
/// allocation lines.
///
/// `created_at` is the session's start time, the same clock reading the
/// generated invoice number comes from. Blank cells are stored as zero.
/// Fails with [`Error::DuplicateInvoice`] when the session's number is
/// already taken.
pub async fn save_session(
    db: &DatabaseConnection,
    session: &InvoiceSession,
    status: InvoiceStatus,
    due_date: NaiveDate,
    created_by: Option<&str>,
) -> Result<invoice::Model> {
    let txn = db.begin().await?;
    ensure_unique_number(&txn, session.invoice_number()).await?;

    let totals = session.totals();
    let header = invoice::ActiveModel {
        invoice_number: Set(session.invoice_number().to_string()),
        project_name: Set(session.project_name().to_string()),
        month: Set(session.month().to_string()),
        year: Set(session.year()),
        total_fte: Set(totals.total_fte),
        subtotal_amount: Set(totals.subtotal_amount),
        discount: Set(totals.discount),
        grand_total: Set(totals.grand_total),
        status: Set(status.as_str().to_string()),
        notes: Set(None),
        created_by: Set(created_by.map(str::to_string)),
        created_at: Set(local_to_utc(session.created_at())),
        due_date: Set(due_date),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (position, row) in session.summary_rows().iter().enumerate() {
        summary_line(header.id, position, row)?.insert(&txn).await?;
    }

    for (position, row) in session.allocations().iter().enumerate() {
        let rate = session
            .summary_rows()
            .iter()
            .find(|s| s.process == row.process_key())
            .map_or(0.0, |s| s.rate.value());
        allocation_line(header.id, position, row, rate)?
            .insert(&txn)
            .await?;
    }

    txn.commit().await?;

    info!(
        "Saved invoice {} for '{}' ({} lines, grand total {:.2})",
        header.invoice_number,
        header.project_name,
        session.summary_rows().len() + session.allocations().len(),
        header.grand_total
    );

    Ok(header)
}

/// Stores a validated single-resource request as a one-line invoice.
///
/// The billing type is used as the process key and the billing period's
/// start date decides the invoice month and year. `created_at` is the save
/// time.
pub async fn save_request(
    db: &DatabaseConnection,
    request: &ValidatedRequest,
    project_name: &str,
    invoice_number: &str,
    due_date: NaiveDate,
    created_by: Option<&str>,
) -> Result<invoice::Model> {
    let txn = db.begin().await?;
    ensure_unique_number(&txn, invoice_number).await?;

    let notes = Some(request.notes.trim().to_string()).filter(|n| !n.is_empty());
    let header = invoice::ActiveModel {
        invoice_number: Set(invoice_number.to_string()),
        project_name: Set(project_name.to_string()),
        month: Set(request.billing_start_date.format("%B").to_string()),
        year: Set(request.billing_start_date.year()),
        total_fte: Set(request.number_of_ftes),
        subtotal_amount: Set(request.total_amount),
        discount: Set(0.0),
        grand_total: Set(request.total_amount),
        status: Set(InvoiceStatus::Draft.as_str().to_string()),
        notes: Set(notes),
        created_by: Set(created_by.map(str::to_string)),
        created_at: Set(Utc::now()),
        due_date: Set(due_date),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let process = request.billing_type.as_str();
    let summary = SummaryRow {
        process: process.to_string(),
        fte_count: request.number_of_ftes,
        rate: NumericField::from(request.rate_per_fte),
    };
    summary_line(header.id, 0, &summary)?.insert(&txn).await?;

    let allocation = AllocationRow {
        id: request.employee_id,
        resource_name: request.employee_name.clone(),
        employee_role: String::new(),
        agency_name: request.employee_agency.clone().unwrap_or_default(),
        process: Some(process.to_string()),
        fte: NumericField::from(request.number_of_ftes),
        remarks: None,
    };
    allocation_line(header.id, 0, &allocation, request.rate_per_fte)?
        .insert(&txn)
        .await?;

    txn.commit().await?;

    info!(
        "Saved request invoice {} for {} on '{}' ({:.2})",
        header.invoice_number, request.employee_name, header.project_name, header.grand_total
    );

    Ok(header)
}

/// Finds an invoice by number.
pub async fn get_invoice_by_number(
    db: &DatabaseConnection,
    invoice_number: &str,
) -> Result<Option<invoice::Model>> {
    Invoice::find()
        .filter(invoice::Column::InvoiceNumber.eq(invoice_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All lines of an invoice, summary lines first, each kind in saved order.
pub async fn get_invoice_lines(
    db: &DatabaseConnection,
    invoice_id: i64,
) -> Result<Vec<invoice_line::Model>> {
    InvoiceLine::find()
        .filter(invoice_line::Column::InvoiceId.eq(invoice_id))
        .order_by_desc(invoice_line::Column::LineKind)
        .order_by_asc(invoice_line::Column::Position)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All stored invoices, newest first.
pub async fn list_invoices(db: &DatabaseConnection) -> Result<Vec<invoice::Model>> {
    Invoice::find()
        .order_by_desc(invoice::Column::CreatedAt)
        .order_by_desc(invoice::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves an invoice to a new status.
pub async fn update_status(
    db: &DatabaseConnection,
    invoice_number: &str,
    status: InvoiceStatus,
) -> Result<invoice::Model> {
    let existing = get_invoice_by_number(db, invoice_number)
        .await?
        .ok_or_else(|| Error::InvoiceNotFound {
            invoice_number: invoice_number.to_string(),
        })?;

    let mut active_model: invoice::ActiveModel = existing.into();
    active_model.status = Set(status.as_str().to_string());
    let updated = active_model.update(db).await?;

    info!("Invoice {invoice_number} is now {status}");
    Ok(updated)
}

/// Rebuilds the editable input of a stored invoice so it can be reopened
/// in a new [`InvoiceSession`] under the same number.
pub async fn load_input(db: &DatabaseConnection, invoice_number: &str) -> Result<InvoiceInput> {
    let header = get_invoice_by_number(db, invoice_number)
        .await?
        .ok_or_else(|| Error::InvoiceNotFound {
            invoice_number: invoice_number.to_string(),
        })?;

    let mut summary = Vec::new();
    let mut allocations = Vec::new();
    for line in get_invoice_lines(db, header.id).await? {
        if line.line_kind == SUMMARY_LINE {
            summary.push(SummaryRow {
                process: line.process,
                fte_count: line.fte,
                rate: NumericField::from(line.rate),
            });
        } else {
            allocations.push(AllocationRow {
                id: line.allocation_id.unwrap_or(line.id),
                resource_name: line.resource_name,
                employee_role: line.employee_role,
                agency_name: line.agency_name,
                process: Some(line.process),
                fte: NumericField::from(line.fte),
                remarks: line.remarks,
            });
        }
    }

    Ok(InvoiceInput {
        month: header.month,
        year: header.year,
        project_name: header.project_name,
        invoice_number: Some(header.invoice_number),
        summary,
        allocations,
        discount: Some(header.discount),
    })
}
