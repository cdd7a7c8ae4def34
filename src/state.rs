use crate::config::{AppConfig, StoreConfig};
use crate::users::{MemoryUserStore, SqliteUserStore, UserStore};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = match &config.store {
            StoreConfig::Memory => {
                warn!("using in-memory user store; accounts are lost on restart");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
            StoreConfig::Sqlite {
                url,
                max_connections,
            } => {
                info!(max_connections, "opening sqlite user store");
                Arc::new(SqliteUserStore::connect(url, *max_connections).await?)
                    as Arc<dyn UserStore>
            }
        };

        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryUserStore::new()))
    }

    #[cfg(test)]
    pub fn with_store(store: Arc<dyn UserStore>) -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            store: StoreConfig::Memory,
            seed_admin: false,
        });
        Self::from_parts(store, config)
    }
}
