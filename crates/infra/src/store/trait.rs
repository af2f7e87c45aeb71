use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use sockstock_core::{StockError, StockId};
use sockstock_inventory::{StockKey, StockQuery, StockRecord};

/// Storage operation error.
///
/// These are **infrastructure errors** (connectivity, decoding) as opposed to
/// the ledger's business failures. They surface to callers as
/// [`StockError::Store`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for StockError {
    fn from(value: StoreError) -> Self {
        StockError::store(value.to_string())
    }
}

/// Durable keyed storage of stock records.
///
/// Mutations go through [`StockStore::begin`], which opens a transactional
/// scope. Enumeration is a plain snapshot read with no update intent.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Open a transactional scope for one read-check-write sequence.
    async fn begin<'a>(&'a self) -> Result<Box<dyn StockTransaction + 'a>, StoreError>;

    /// All records matching every predicate of `query`, ordered by its sort if any.
    async fn find_matching(&self, query: &StockQuery) -> Result<Vec<StockRecord>, StoreError>;
}

/// A transactional scope over the store.
///
/// Reads observe the transaction's own earlier writes. Nothing becomes visible
/// to other callers until [`commit`](StockTransaction::commit); dropping the
/// transaction instead rolls it back.
#[async_trait]
pub trait StockTransaction: Send {
    /// Record stored under the normalized `(color, cottonPart)` key.
    ///
    /// Implementations must hold exclusive access to the key until the
    /// transaction ends, so concurrent read-modify-writes cannot lose updates.
    async fn find_by_key(&mut self, key: &StockKey) -> Result<Option<StockRecord>, StoreError>;

    /// Record with the given surrogate identity.
    async fn find_by_id(&mut self, id: StockId) -> Result<Option<StockRecord>, StoreError>;

    /// Insert or replace by identity; returns the record as stored
    /// (with store-managed timestamps).
    async fn save(&mut self, record: StockRecord) -> Result<StockRecord, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    async fn begin<'a>(&'a self) -> Result<Box<dyn StockTransaction + 'a>, StoreError> {
        (**self).begin().await
    }

    async fn find_matching(&self, query: &StockQuery) -> Result<Vec<StockRecord>, StoreError> {
        (**self).find_matching(query).await
    }
}
