//! Sock inventory domain module.
//!
//! This crate contains the business rules for sock stock, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage):
//! - `record`: stock records keyed by `(color, cottonPart)` and their guarded arithmetic
//! - `filter`: composable predicates used by quantity aggregation
//! - `batch`: parsing and validation of delimited batch rows

pub mod batch;
pub mod filter;
pub mod record;

pub use batch::{BatchRow, RowError, has_expected_extension, parse_row};
pub use filter::{
    CottonOperator, FilterCriteria, Predicate, SortDirection, SortField, SortOrder, StockQuery,
};
pub use record::{
    MAX_COTTON_PART, MIN_COTTON_PART, NormalizedInput, StockInput, StockKey, StockRecord,
    normalize_color,
};
