//! Stock ledger: the only writer of quantity state.
//!
//! Each mutation follows the same shape:
//!
//! ```text
//! normalize input
//!   ↓
//! begin transaction
//!   ↓
//! read (by key or by id)  ──absent──▶ NotFound / create
//!   ↓
//! check + mutate in memory ──fails──▶ drop transaction (rollback)
//!   ↓
//! save + commit
//! ```
//!
//! Aggregation bypasses the write path and reads the store directly.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use sockstock_core::{StockError, StockId, StockResult};
use sockstock_inventory::{
    FilterCriteria, NormalizedInput, StockInput, StockKey, StockQuery, StockRecord,
};

use crate::store::{StockStore, StockTransaction};

/// Stock ledger over an injected store.
#[derive(Debug, Clone)]
pub struct StockLedger<S> {
    store: S,
}

impl<S> StockLedger<S>
where
    S: StockStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add stock for a key, creating the record on first sight.
    #[instrument(skip(self), err)]
    pub async fn income(&self, input: StockInput) -> StockResult<StockRecord> {
        let NormalizedInput { key, quantity } = input.normalize();

        let mut tx = self.store.begin().await?;
        let record = receive_in(tx.as_mut(), &key, quantity).await?;
        tx.commit().await?;

        info!(id = %record.id_typed(), %key, quantity = record.quantity(), "stock income applied");
        Ok(record)
    }

    /// Remove stock for an existing key; never leaves a negative quantity.
    #[instrument(skip(self), err)]
    pub async fn outcome(&self, input: StockInput) -> StockResult<StockRecord> {
        let NormalizedInput { key, quantity } = input.normalize();

        let mut tx = self.store.begin().await?;
        let mut record = tx.find_by_key(&key).await?.ok_or(StockError::NotFound)?;
        record
            .issue(quantity)
            .inspect_err(|e| warn!(%key, error = %e, "stock outcome rejected"))?;
        let record = tx.save(record).await?;
        tx.commit().await?;

        info!(id = %record.id_typed(), %key, quantity = record.quantity(), "stock outcome applied");
        Ok(record)
    }

    /// Replace all fields of the record with identity `id`.
    ///
    /// The new key is not checked for collisions with other records.
    #[instrument(skip(self), err)]
    pub async fn update(&self, id: StockId, input: StockInput) -> StockResult<StockRecord> {
        let normalized = input.normalize();

        let mut tx = self.store.begin().await?;
        let mut record = tx.find_by_id(id).await?.ok_or(StockError::NotFound)?;
        record.replace(&normalized)?;
        let record = tx.save(record).await?;
        tx.commit().await?;

        info!(%id, key = %record.key(), quantity = record.quantity(), "stock record updated");
        Ok(record)
    }

    /// Sum of quantity over every record matching `criteria` (`0` if none).
    ///
    /// Sort parameters are forwarded to the store but cannot change the sum.
    #[instrument(skip(self), err)]
    pub async fn aggregate(&self, criteria: &FilterCriteria) -> StockResult<i64> {
        let query = StockQuery::from_criteria(criteria)?;
        if criteria.sort_by.is_some() && query.sort().is_none() {
            debug!(sort_by = ?criteria.sort_by, "unrecognized sort field ignored");
        }

        let records = self.store.find_matching(&query).await?;
        let total = records
            .iter()
            .fold(0i64, |acc, r| acc.saturating_add(r.quantity()));

        debug!(matched = records.len(), total, "stock aggregated");
        Ok(total)
    }
}

/// Find-or-create by key, then add `quantity`, inside an open transaction.
///
/// Shared by single income and batch import, so a batch observes its own
/// earlier rows.
pub(crate) async fn receive_in(
    tx: &mut (dyn StockTransaction + '_),
    key: &StockKey,
    quantity: i64,
) -> StockResult<StockRecord> {
    let mut record = match tx.find_by_key(key).await? {
        Some(existing) => existing,
        None => {
            debug!(%key, "creating stock record");
            StockRecord::create(key, Utc::now())
        }
    };
    record.receive(quantity)?;
    Ok(tx.save(record).await?)
}
