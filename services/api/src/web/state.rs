//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use momentum_core::ports::{ProfileStore, TaskStore};
use momentum_core::CheckInService;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub check_ins: CheckInService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        profiles: Arc<dyn ProfileStore>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            check_ins: CheckInService::new(tasks.clone()),
            tasks,
            profiles,
            config,
        }
    }
}

/// The authenticated caller, inserted into request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);
