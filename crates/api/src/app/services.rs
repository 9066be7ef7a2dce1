use std::sync::Arc;

use anyhow::Context;

use inventorix_auth::TokenService;
use inventorix_infra::store::{InMemoryStore, PostgresStore, Store, UnitOfWork};

use crate::app::errors::ApiError;
use crate::config::{AppConfig, Persistence};

/// Process-wide collaborators shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
        }
    }

    /// Fresh in-memory store; used by tests and when persistence is off.
    pub fn in_memory(tokens: TokenService) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), tokens)
    }

    pub async fn begin(&self) -> Result<Box<dyn UnitOfWork>, ApiError> {
        Ok(self.store.begin().await?)
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let tokens = TokenService::new(config.secret.as_bytes()).with_max_age(config.token_max_age);

    match &config.persistence {
        Persistence::InMemory => {
            tracing::info!("using in-memory store");
            Ok(AppServices::in_memory(tokens))
        }
        Persistence::Postgres { database_url } => {
            let store = PostgresStore::connect(database_url)
                .await
                .context("failed to connect to postgres")?;
            tracing::info!("using postgres store");
            Ok(AppServices::new(Arc::new(store), tokens))
        }
    }
}
