//! Invoice line entity - one summary or allocation row of a stored invoice.
//!
//! `line_kind` is `"summary"` for per-process rows and `"allocation"` for
//! per-resource rows. Allocation lines carry the rate of their process.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_lines")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the invoice this line belongs to
    pub invoice_id: i64,
    /// `"summary"` or `"allocation"`
    pub line_kind: String,
    /// Position of the line within its kind
    pub position: i32,
    /// Allocation row id from the editing session, None for summary lines
    pub allocation_id: Option<i64>,
    /// Resource name (empty for summary lines)
    pub resource_name: String,
    /// Role of the resource (empty for summary lines)
    pub employee_role: String,
    /// Agency of the resource (empty for summary lines)
    pub agency_name: String,
    /// Process key
    pub process: String,
    /// FTE of the allocation, or FTE count of the summary row
    pub fte: f64,
    /// Rate per FTE
    pub rate: f64,
    /// Free-text remarks
    pub remarks: Option<String>,
}

/// Defines relationships between `InvoiceLine` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one invoice
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
