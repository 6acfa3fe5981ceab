//! Handlers for the `/thresholds` resource.
//!
//! `PUT` treats its body as the complete desired set: records missing from
//! it are deleted. The summary notification runs after the reconcile has
//! committed and its outcome is reported next to the changed records.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use dx_db::models::threshold::{Threshold, ThresholdFilter};
use dx_db::repositories::ThresholdRepo;
use dx_events::{dispatch_notification, NotificationOutcome};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Payload of a successful `PUT /thresholds`.
#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    /// Records that were updated or inserted, as stored.
    pub changed: Vec<Threshold>,
    pub notification: NotificationOutcome,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/thresholds
///
/// List thresholds, optionally narrowed by `id`, `group_id` and
/// `threshold_type_id`.
pub async fn list_thresholds(
    State(state): State<AppState>,
    filter: Result<Query<ThresholdFilter>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<Threshold>>>> {
    let Query(filter) = filter.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let thresholds = ThresholdRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: thresholds }))
}

/// PUT /api/v1/thresholds
///
/// Reconcile the table with the submitted set, then notify about the
/// records that changed.
pub async fn reconcile_thresholds(
    State(state): State<AppState>,
    body: Result<Json<Vec<Threshold>>, JsonRejection>,
) -> AppResult<Json<DataResponse<ReconcileResponse>>> {
    let Json(desired) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    for threshold in &desired {
        threshold.validate()?;
    }

    let changed = ThresholdRepo::reconcile(&state.pool, &desired).await?;
    let notification = dispatch_notification(state.notifier.as_ref(), &changed).await;

    tracing::info!(
        submitted = desired.len(),
        changed = changed.len(),
        ?notification,
        "Threshold reconcile request completed"
    );

    Ok(Json(DataResponse {
        data: ReconcileResponse {
            changed,
            notification,
        },
    }))
}
