use std::sync::Arc;

use sqlx::PgPool;

use cartview_infra::{
    config::{AppConfig, Persistence, ReadModelRetrySettings},
    db::{self, DbError},
    queries::GetShoppingCartDetailsHandler,
    read_model::{InMemoryShoppingCartDetailsStore, PostgresShoppingCartDetailsStore, ShoppingCartDetailsStore},
};

pub type DynShoppingCartDetailsStore = Arc<dyn ShoppingCartDetailsStore>;

/// Everything the handlers need, built once at start-up.
pub struct AppServices {
    pub get_shopping_cart_details: GetShoppingCartDetailsHandler<DynShoppingCartDetailsStore>,
    pool: Option<PgPool>,
}

impl AppServices {
    pub fn new(store: DynShoppingCartDetailsStore, retry: ReadModelRetrySettings) -> Self {
        Self {
            get_shopping_cart_details: GetShoppingCartDetailsHandler::new(store, retry),
            pool: None,
        }
    }

    /// In-memory read models (dev/test).
    pub fn in_memory(retry: ReadModelRetrySettings) -> Self {
        Self::new(Arc::new(InMemoryShoppingCartDetailsStore::new()), retry)
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, DbError> {
        match &config.persistence {
            Persistence::InMemory => {
                tracing::warn!("USE_PERSISTENT_STORES not set; using in-memory read models");
                Ok(Self::in_memory(config.read_model_retry))
            }
            Persistence::Postgres(settings) => {
                let pool = db::connect(settings).await?;
                let store = Arc::new(PostgresShoppingCartDetailsStore::new(pool.clone()));
                Ok(Self {
                    pool: Some(pool),
                    ..Self::new(store, config.read_model_retry)
                })
            }
        }
    }

    /// Pool to close on shutdown, when persistent stores are in use.
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }
}
