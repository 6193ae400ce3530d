use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/users/:id/notifications
///
/// Unread notifications, newest first. Clients poll this every 30 seconds.
pub async fn list_unread(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let notifications = state
        .sdk
        .run(move |s| s.notifications().unread(user_id))
        .await?;

    let count = notifications.len();
    Ok(Json(json!({ "data": notifications, "count": count })))
}

/// POST /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if id <= 0 {
        return Err(AppError::bad_request("Notification id must be positive"));
    }
    state.sdk.mark_notification_read(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
