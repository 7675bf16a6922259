//! Entity module - Contains all SeaORM entity definitions for the database.
//! Invoices are stored as a header row plus summary and allocation lines.

pub mod invoice;
pub mod invoice_line;

// Re-export specific types to avoid conflicts
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, Model as InvoiceModel};
pub use invoice_line::{
    Column as InvoiceLineColumn, Entity as InvoiceLine, Model as InvoiceLineModel,
};
