//! Infrastructure layer: stock storage adapters and ledger orchestration.

pub mod batch_import;
pub mod ledger;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use batch_import::{BatchReport, RejectedRow};
pub use ledger::StockLedger;
pub use store::{InMemoryStockStore, PostgresStockStore, StockStore, StockTransaction, StoreError};
