//! services/api/src/bootstrap.rs
//!
//! Builds the shared `AppState` once per process.

use crate::adapters::{DbAdapter, MemoryAdapter};
use crate::config::Config;
use crate::error::ApiError;
use crate::web::state::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

static APP_STATE: OnceCell<Arc<AppState>> = OnceCell::const_new();

/// Returns the process-wide state, building it on the first call.
///
/// Later calls return the memoized state and ignore their `config`.
pub async fn initialize(config: Arc<Config>) -> Result<Arc<AppState>, ApiError> {
    APP_STATE
        .get_or_try_init(|| build_state(config))
        .await
        .cloned()
}

/// Connects the configured storage and assembles a fresh `AppState`.
pub async fn build_state(config: Arc<Config>) -> Result<Arc<AppState>, ApiError> {
    let state = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            AppState::new(db_adapter.clone(), db_adapter, config.clone())
        }
        None => {
            warn!("DATABASE_URL is not set; using the in-memory store. Data will not persist.");
            let memory = Arc::new(MemoryAdapter::new());
            AppState::new(memory.clone(), memory, config.clone())
        }
    };
    Ok(Arc::new(state))
}
