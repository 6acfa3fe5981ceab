pub mod health;
pub mod thresholds;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /thresholds    list (GET), reconcile desired set (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(thresholds::router())
}
