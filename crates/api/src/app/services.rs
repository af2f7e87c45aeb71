use std::sync::Arc;

use sockstock_infra::{InMemoryStockStore, PostgresStockStore, StockLedger, StockStore, StoreError};
use tracing::info;

use crate::config::AppConfig;

/// Shared state handed to every handler.
pub struct AppServices {
    pub ledger: StockLedger<Arc<dyn StockStore>>,
}

impl AppServices {
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        Self {
            ledger: StockLedger::new(store),
        }
    }

    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self::new(Arc::new(InMemoryStockStore::new())))
    }
}

/// Pick the store from configuration: Postgres when a database URL is set,
/// the in-memory store otherwise.
pub async fn build_services(config: &AppConfig) -> Result<Arc<AppServices>, StoreError> {
    let Some(url) = config.database_url.as_deref() else {
        info!("DATABASE_URL not set; using in-memory stock store");
        return Ok(AppServices::in_memory());
    };

    let store = PostgresStockStore::connect(url, config.db_max_connections).await?;
    store.init_schema().await?;
    info!(max_connections = config.db_max_connections, "connected to postgres stock store");

    Ok(Arc::new(AppServices::new(Arc::new(store))))
}
