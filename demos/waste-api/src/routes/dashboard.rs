use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use swachh_sdk::DashboardView;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/dashboard
///
/// Impact summary and chart series. A failed fetch still answers 200 with
/// the fallback view and an `error` banner.
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.sdk.dashboard().await)
}

static EXPORT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique per process: millisecond stamp plus a running counter.
fn export_file_name(gzip: bool) -> String {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = EXPORT_SEQ.fetch_add(1, Ordering::Relaxed);
    let ext = if gzip { "json.gz" } else { "json" };
    format!("impact-report-{}-{}.{}", stamp, seq, ext)
}

#[derive(Deserialize)]
pub struct ExportParams {
    pub gzip: Option<bool>,
}

/// GET /api/dashboard/export?gzip=true
///
/// Download the dashboard as a JSON file, gzip-compressed on request.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> Result<Response, AppError> {
    let gzip = params.gzip.unwrap_or(false);
    let file_name = export_file_name(gzip);
    let path = state.export_dir.join(&file_name);

    let written = path.clone();
    state
        .sdk
        .run(move |s| s.export_dashboard(&written).map(|_| ()))
        .await?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::internal(format!("Failed to read export: {e}")))?;
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove export file");
    }

    let content_type = if gzip { "application/gzip" } else { "application/json" };
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}
