//! Stock error taxonomy.

use thiserror::Error;

/// Result type used across the ledger, filter engine and import pipeline.
pub type StockResult<T> = Result<T, StockError>;

/// Errors surfaced to callers of the stock ledger.
///
/// Every variant is terminal for the call that produced it: nothing here is
/// retried by the core, and a failed mutation leaves the store unchanged.
/// Row-level batch problems never appear here; they are recovered inside the
/// import pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// No record for the requested key (outcome) or identity (update).
    #[error("stock record not found")]
    NotFound,

    /// An outcome would drive the quantity below zero.
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i64, requested: i64 },

    /// Batch input is missing, empty, misnamed, or could not be read.
    #[error("invalid file format: {0}")]
    InvalidFileFormat(String),

    /// Filter criteria carried an operator outside `equal | greaterThan | lessThan`.
    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    /// A non-outcome mutation would leave a negative or overflowing quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(String),
}

impl StockError {
    pub fn insufficient(available: i64, requested: i64) -> Self {
        Self::InsufficientStock {
            available,
            requested,
        }
    }

    pub fn invalid_file(msg: impl Into<String>) -> Self {
        Self::InvalidFileFormat(msg.into())
    }

    pub fn invalid_operator(op: impl Into<String>) -> Self {
        Self::InvalidOperator(op.into())
    }

    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Stable machine-readable code, used by the transport for error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            StockError::NotFound => "not_found",
            StockError::InsufficientStock { .. } => "insufficient_stock",
            StockError::InvalidFileFormat(_) => "invalid_file_format",
            StockError::InvalidOperator(_) => "invalid_operator",
            StockError::InvalidQuantity(_) => "invalid_quantity",
            StockError::Store(_) => "store_error",
        }
    }
}
