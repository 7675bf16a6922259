//! Core business logic - framework-agnostic invoice editing, aggregation,
//! totals, and persistence.

/// Per-resource allocation rows and the editable ledger
pub mod allocation;
/// Single-resource invoice requests and their validation
pub mod billing;
/// Numeric cells with the blank / reject / commit editing policy
pub mod field;
/// Invoice status, history filters, and per-status totals
pub mod history;
/// Storing and reloading invoices
pub mod invoice;
/// Invoice number generation
pub mod invoice_number;
/// Plain-text invoice rendering
pub mod report;
/// The invoice editing session tying ledger, summary, and totals together
pub mod session;
/// Per-process summary rows and their aggregation
pub mod summary;
/// Derived invoice totals
pub mod totals;
