//! Postgres-backed stock store.
//!
//! Records live in the `socks` table. Each ledger operation runs in one SQL
//! transaction; key lookups take a transaction-scoped advisory lock on the
//! `(color, cotton_part)` pair before reading, so concurrent income/outcome on
//! the same key are serialized without requiring a unique index.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row, Transaction};

use sockstock_core::StockId;
use sockstock_inventory::{Predicate, StockKey, StockQuery, StockRecord};

use super::r#trait::{StockStore, StockTransaction, StoreError};

const SELECT_COLUMNS: &str = "SELECT id, color, cotton_part, quantity, created_at, updated_at FROM socks";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS socks (
    id          UUID PRIMARY KEY,
    color       TEXT        NOT NULL,
    cotton_part INTEGER     NOT NULL,
    quantity    BIGINT      NOT NULL CHECK (quantity >= 0),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

// Not UNIQUE: an update may move a record onto an occupied key.
const CREATE_KEY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS socks_color_cotton_part_idx ON socks (color, cotton_part)";

/// Postgres stock store.
///
/// Uses an SQLx connection pool, which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresStockStore {
    pool: PgPool,
}

impl PostgresStockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the `socks` table and its key index if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_KEY_INDEX).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl StockStore for PostgresStockStore {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StockTransaction + 'a>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresTransaction { tx }))
    }

    async fn find_matching(&self, query: &StockQuery) -> Result<Vec<StockRecord>, StoreError> {
        let mut qb = matching_query(query);
        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }
}

/// Translate tagged predicates into a parameterized `WHERE` clause.
fn matching_query(query: &StockQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
    qb.push(" WHERE TRUE");

    for predicate in query.predicates() {
        match predicate {
            Predicate::All => {}
            Predicate::ColorEquals(color) => {
                qb.push(" AND color = ").push_bind(color.clone());
            }
            Predicate::CottonPart(op, value) => {
                qb.push(" AND cotton_part ")
                    .push(op.sql_symbol())
                    .push(" ")
                    .push_bind(*value);
            }
            Predicate::CottonPartRange { min, max } => {
                if let Some(min) = min {
                    qb.push(" AND cotton_part >= ").push_bind(*min);
                }
                if let Some(max) = max {
                    qb.push(" AND cotton_part <= ").push_bind(*max);
                }
            }
        }
    }

    if let Some(sort) = query.sort() {
        qb.push(" ORDER BY ")
            .push(sort.field.column())
            .push(" ")
            .push(sort.direction.sql_keyword());
    }

    qb
}

fn record_from_row(row: &PgRow) -> Result<StockRecord, StoreError> {
    Ok(StockRecord::from_parts(
        StockId::from_uuid(row.try_get::<uuid::Uuid, _>("id")?),
        row.try_get("color")?,
        row.try_get("cotton_part")?,
        row.try_get("quantity")?,
        row.try_get("created_at")?,
        row.try_get("updated_at")?,
    ))
}

struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StockTransaction for PostgresTransaction {
    async fn find_by_key(&mut self, key: &StockKey) -> Result<Option<StockRecord>, StoreError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), $2)")
            .bind(key.color())
            .bind(key.cotton_part())
            .execute(&mut *self.tx)
            .await?;

        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE color = $1 AND cotton_part = $2 ORDER BY created_at, id LIMIT 1 FOR UPDATE"
        ))
        .bind(key.color())
        .bind(key.cotton_part())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn find_by_id(&mut self, id: StockId) -> Result<Option<StockRecord>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1 FOR UPDATE"))
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn save(&mut self, record: StockRecord) -> Result<StockRecord, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO socks (id, color, cotton_part, quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                color = EXCLUDED.color,
                cotton_part = EXCLUDED.cotton_part,
                quantity = EXCLUDED.quantity,
                updated_at = NOW()
            RETURNING id, color, cotton_part, quantity, created_at, updated_at
            "#,
        )
        .bind(record.id_typed().as_uuid())
        .bind(record.color())
        .bind(record.cotton_part())
        .bind(record.quantity())
        .bind(record.created_at())
        .fetch_one(&mut *self.tx)
        .await?;

        record_from_row(&row)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
