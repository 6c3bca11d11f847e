use crate::auth::services::AuthService;
use crate::bot::replies::{CannedReplies, ReplySource};
use crate::config::{AppConfig, StoreConfig};
use crate::storage::{JsonFileStore, MemoryStore, UserStore};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub bot: Arc<dyn ReplySource>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let file_store = JsonFileStore::new(&config.store.users_file);
        file_store
            .init()
            .await
            .with_context(|| format!("initialize users file {}", file_store.path().display()))?;
        tracing::info!(path = %file_store.path().display(), "users stored in");

        let store = Arc::new(file_store) as Arc<dyn UserStore>;
        Ok(Self::from_parts(config, store, Arc::new(CannedReplies::default())))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn UserStore>,
        bot: Arc<dyn ReplySource>,
    ) -> Self {
        Self {
            config,
            auth: AuthService::new(store),
            bot,
        }
    }

    /// In-memory state for tests; nothing touches the filesystem.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            store: StoreConfig {
                users_file: "unused.json".into(),
            },
            expose_user_listing: true,
        });
        Self::from_parts(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(CannedReplies::default()),
        )
    }
}
