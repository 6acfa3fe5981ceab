use std::sync::Arc;

use dx_events::ThresholdNotifier;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: dx_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Receives the changed-set after every committed reconcile.
    pub notifier: Arc<dyn ThresholdNotifier>,
}
