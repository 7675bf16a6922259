//! Unified error types and result handling.
//!
//! Editing operations on a session never fail: malformed numeric input is
//! reported as [`crate::core::field::EditOutcome::Rejected`]. The variants here
//! cover construction, configuration, validation, and persistence.

use crate::core::billing::ValidationErrors;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Underlying SeaORM / database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Two summary rows share the same process key
    #[error("Duplicate process '{process}' in summary rows")]
    DuplicateProcess {
        /// The repeated process key
        process: String,
    },

    /// Two allocation rows share the same id
    #[error("Duplicate allocation row id {id}")]
    DuplicateAllocationId {
        /// The repeated row id
        id: i64,
    },

    /// No stored invoice carries this number
    #[error("Invoice '{invoice_number}' not found")]
    InvoiceNotFound {
        /// The number that was looked up
        invoice_number: String,
    },

    /// An invoice with this number is already stored
    #[error("Invoice '{invoice_number}' already exists")]
    DuplicateInvoice {
        /// The conflicting number
        invoice_number: String,
    },

    /// An invoice status string did not match a known status
    #[error("Invalid invoice status: '{value}'")]
    InvalidStatus {
        /// The rejected value
        value: String,
    },

    /// A billing type string did not match a known billing type
    #[error("Invalid billing type: '{value}'")]
    InvalidBillingType {
        /// The rejected value
        value: String,
    },

    /// A single-resource invoice request failed validation
    #[error("Invoice request is invalid: {0}")]
    Validation(ValidationErrors),

    /// Integer conversion overflowed (row positions, limits)
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
