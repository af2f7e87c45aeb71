//! Stock storage boundary.
//!
//! The ledger depends only on the [`StockStore`] / [`StockTransaction`] contract:
//! lookup by key, lookup by identity, save, and predicate-based enumeration.
//! Every read-modify-write runs inside one transaction; dropping a transaction
//! without calling `commit` discards its writes.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryStockStore;
pub use postgres::PostgresStockStore;
pub use r#trait::{StockStore, StockTransaction, StoreError};
