use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};

use sockstock_core::StockId;
use sockstock_inventory::{StockKey, StockQuery, StockRecord};

use super::r#trait::{StockStore, StockTransaction, StoreError};

type Table = BTreeMap<StockId, StockRecord>;

/// In-memory stock store.
///
/// Intended for tests/dev. A transaction holds the table lock for its whole
/// lifetime, so mutations are fully serialized. Clones share the same table.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStockStore {
    table: Arc<Mutex<Table>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed records in identity order.
    pub async fn snapshot(&self) -> Vec<StockRecord> {
        self.table.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.table.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.table.lock().await.is_empty()
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StockTransaction + 'a>, StoreError> {
        let table = self.table.lock().await;
        Ok(Box::new(InMemoryTransaction {
            table,
            staged: BTreeMap::new(),
        }))
    }

    async fn find_matching(&self, query: &StockQuery) -> Result<Vec<StockRecord>, StoreError> {
        let table = self.table.lock().await;
        let mut matches: Vec<StockRecord> = table
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        query.order(&mut matches);
        Ok(matches)
    }
}

/// Staged writes over a locked table.
struct InMemoryTransaction<'a> {
    table: MutexGuard<'a, Table>,
    staged: Table,
}

impl InMemoryTransaction<'_> {
    /// Committed rows overlaid with this transaction's staged writes.
    fn visible(&self) -> impl Iterator<Item = &StockRecord> {
        self.staged.values().chain(
            self.table
                .values()
                .filter(move |r| !self.staged.contains_key(&r.id_typed())),
        )
    }
}

#[async_trait]
impl StockTransaction for InMemoryTransaction<'_> {
    async fn find_by_key(&mut self, key: &StockKey) -> Result<Option<StockRecord>, StoreError> {
        // Update may leave several records on one key; the oldest wins.
        Ok(self
            .visible()
            .filter(|r| r.color() == key.color() && r.cotton_part() == key.cotton_part())
            .min_by_key(|r| r.id_typed())
            .cloned())
    }

    async fn find_by_id(&mut self, id: StockId) -> Result<Option<StockRecord>, StoreError> {
        Ok(self
            .staged
            .get(&id)
            .or_else(|| self.table.get(&id))
            .cloned())
    }

    async fn save(&mut self, mut record: StockRecord) -> Result<StockRecord, StoreError> {
        record.touch(Utc::now());
        self.staged.insert(record.id_typed(), record.clone());
        Ok(record)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let InMemoryTransaction { mut table, staged } = *self;
        table.extend(staged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sockstock_inventory::FilterCriteria;

    fn new_record(color: &str, cotton_part: i32, quantity: i64) -> StockRecord {
        let mut r = StockRecord::create(&StockKey::new(color, cotton_part), Utc::now());
        r.receive(quantity).unwrap();
        r
    }

    #[tokio::test]
    async fn committed_writes_become_visible() {
        let store = InMemoryStockStore::new();
        let mut tx = store.begin().await.unwrap();
        let saved = tx.save(new_record("red", 30, 10)).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.snapshot().await, vec![saved.clone()]);

        let mut tx = store.begin().await.unwrap();
        let by_key = tx.find_by_key(&StockKey::new("RED", 30)).await.unwrap();
        let by_id = tx.find_by_id(saved.id_typed()).await.unwrap();
        assert_eq!(by_key, Some(saved.clone()));
        assert_eq!(by_id, Some(saved));
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let store = InMemoryStockStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.save(new_record("red", 30, 10)).await.unwrap();
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn transaction_reads_its_own_writes() {
        let store = InMemoryStockStore::new();
        let mut tx = store.begin().await.unwrap();
        let mut first = tx.save(new_record("red", 30, 10)).await.unwrap();
        first.receive(5).unwrap();
        tx.save(first).await.unwrap();

        let seen = tx.find_by_key(&StockKey::new("red", 30)).await.unwrap().unwrap();
        assert_eq!(seen.quantity(), 15);
        tx.commit().await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn save_preserves_creation_time() {
        let store = InMemoryStockStore::new();
        let record = new_record("red", 30, 10);
        let created = record.created_at();

        let mut tx = store.begin().await.unwrap();
        let saved = tx.save(record).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(saved.created_at(), created);
        assert!(saved.updated_at() >= created);
    }

    #[tokio::test]
    async fn duplicate_keys_resolve_to_oldest_record() {
        let store = InMemoryStockStore::new();
        let now = Utc::now();
        let stored = |n: u128, quantity: i64| {
            StockRecord::from_parts(
                StockId::from_uuid(uuid::Uuid::from_u128(n)),
                "red".to_string(),
                30,
                quantity,
                now,
                now,
            )
        };

        let mut tx = store.begin().await.unwrap();
        tx.save(stored(2, 2)).await.unwrap();
        tx.save(stored(1, 1)).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let found = tx.find_by_key(&StockKey::new("red", 30)).await.unwrap().unwrap();
        assert_eq!(found.quantity(), 1);
    }

    #[tokio::test]
    async fn find_matching_filters_and_sorts() {
        let store = InMemoryStockStore::new();
        let mut tx = store.begin().await.unwrap();
        for (color, cotton, qty) in [("red", 30, 10), ("blue", 50, 20), ("red", 80, 5)] {
            tx.save(new_record(color, cotton, qty)).await.unwrap();
        }
        tx.commit().await.unwrap();

        let query = StockQuery::from_criteria(&FilterCriteria {
            color: Some("red".to_string()),
            sort_by: Some("cottonPart".to_string()),
            sort_direction: Some("desc".to_string()),
            ..Default::default()
        })
        .unwrap();
        let found = store.find_matching(&query).await.unwrap();
        let cotton: Vec<i32> = found.iter().map(|r| r.cotton_part()).collect();
        assert_eq!(cotton, vec![80, 30]);
    }
}
