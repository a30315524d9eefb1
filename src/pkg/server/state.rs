use std::sync::Arc;

use sqlx::{Pool, Postgres, postgres::PgPoolOptions};

use crate::{
    conf::settings,
    pkg::internal::{
        adaptors::{Store, memory::MemoryStore, postgres::PgStore},
        auth::SessionConfig,
    },
    prelude::Result,
};

pub fn db_pool() -> Result<Pool<Postgres>> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_pool_max_connections)
        .connect_lazy(&settings.database_url)?;
    Ok(pool)
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub session: Arc<SessionConfig>,
}

impl AppState {
    pub async fn new() -> Result<AppState> {
        let store: Arc<dyn Store> = if settings.uses_memory_store() {
            tracing::warn!("using the in-memory store, data is lost on restart");
            Arc::new(MemoryStore::seeded().await)
        } else {
            Arc::new(PgStore::new(Arc::new(db_pool()?)))
        };
        Ok(AppState::with_store(store, SessionConfig::from_settings(&settings)))
    }

    pub fn with_store(store: Arc<dyn Store>, session: SessionConfig) -> AppState {
        AppState {
            store,
            session: Arc::new(session),
        }
    }
}
