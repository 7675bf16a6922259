//! Invoice entity - one stored invoice header.
//!
//! The header carries the totals as they were when the invoice was saved, so
//! history views never need to recompute them from the lines.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier for the invoice
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable invoice number (e.g. `"INV-20251104-093015"`)
    #[sea_orm(unique)]
    pub invoice_number: String,
    /// Project being billed
    pub project_name: String,
    /// Billing month name
    pub month: String,
    /// Billing year
    pub year: i32,
    /// Sum of summary FTE counts
    pub total_fte: f64,
    /// Sum of `fte_count × rate`
    pub subtotal_amount: f64,
    /// Discount subtracted from the subtotal
    pub discount: f64,
    /// `subtotal_amount - discount`
    pub grand_total: f64,
    /// Lifecycle status: `"draft"`, `"pending"`, `"paid"`, or `"overdue"`
    pub status: String,
    /// Free-text notes
    pub notes: Option<String>,
    /// Email of the user who saved the invoice
    pub created_by: Option<String>,
    /// When the invoice was saved
    pub created_at: DateTimeUtc,
    /// Payment due date
    pub due_date: Date,
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One invoice has many lines
    #[sea_orm(has_many = "super::invoice_line::Entity")]
    Lines,
}

impl Related<super::invoice_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
