//! Liveness probe for the threshold service.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the threshold store answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
}

/// The server stays up when Postgres is unreachable; only `status` changes.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match dx_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Threshold store unreachable");
            false
        }
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// `/health`, mounted beside `/api/v1` rather than under it.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
