use axum::routing::get;
use axum::Router;

use crate::handlers::thresholds;
use crate::state::AppState;

/// Threshold routes mounted under `/api/v1`.
///
/// ```text
/// GET  /thresholds    list_thresholds (filter via query string)
/// PUT  /thresholds    reconcile_thresholds (complete desired set)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/thresholds",
        get(thresholds::list_thresholds).put(thresholds::reconcile_thresholds),
    )
}
