use std::sync::Arc;

use crate::config::AppConfig;
use crate::store::{MealStore, MemoryStore, PgStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MealStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(PgStore::connect(&config).await?) as Arc<dyn MealStore>;
        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn MealStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// State backed by a seeded [`MemoryStore`]; used in handler tests.
    pub fn with_store(store: MemoryStore) -> Self {
        Self::from_parts(Arc::new(store), Arc::new(AppConfig::for_tests()))
    }

    pub fn fake() -> Self {
        Self::with_store(MemoryStore::new())
    }
}
