use std::sync::Arc;

use crate::config::AppConfig;
use crate::db;
use crate::storage::{PgUserStore, UserStore};
use crate::users::repo::UserRepository;

/// Everything handlers need, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database).await?;
        db::ensure_schema(&pool).await?;
        let store = Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>;
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: Arc<dyn UserStore>) -> Self {
        Self {
            users: UserRepository::new(store),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(crate::storage::MemoryUserStore::default()))
    }
}
