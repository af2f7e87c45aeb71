//! `sockstock-core`: shared building blocks for the sock stock ledger.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{StockError, StockResult};
pub use id::StockId;
