use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use swachh_sdk::models::VerificationResult;
use swachh_sdk::{ImagePayload, ReportForm, SwachhError};

use crate::error::AppError;
use crate::state::AppState;

const MAX_LIMIT: usize = 500;

#[derive(Deserialize)]
pub struct ListReportsParams {
    pub limit: Option<usize>,
}

/// GET /api/reports?limit=20
///
/// Most recent reports, newest first.
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListReportsParams>,
) -> Result<Json<Value>, AppError> {
    let limit = params
        .limit
        .unwrap_or(swachh_sdk::config::DASHBOARD_FETCH_LIMIT)
        .min(MAX_LIMIT);
    let reports = state.sdk.run(move |s| s.reports().recent(limit)).await?;

    let count = reports.len();
    Ok(Json(json!({ "data": reports, "count": count })))
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    /// Image as a `data:image/...;base64,...` URI.
    pub image: String,
}

/// POST /api/verify  `{"image": "data:image/jpeg;base64,..."}`
///
/// Classify a waste photo. 422 when the model's answer is unusable, 409
/// while another verification is running.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, AppError> {
    let image = ImagePayload::from_data_uri(&req.image)?;
    let result = state.sdk.verify(image).await?;
    Ok(Json(result))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub user_id: i64,
    pub location: String,
    /// The photo that was verified, as a data URI.
    pub image: String,
    /// The verdict returned by `/api/verify`.
    pub verification: VerificationResult,
    /// Corrections to the verified type and amount.
    pub waste_type: Option<String>,
    pub amount: Option<String>,
}

/// POST /api/reports
///
/// File a verified report. The verdict is re-checked; an incomplete or
/// out-of-range one is rejected with 422.
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let image = ImagePayload::from_data_uri(&req.image)?;
    req.verification.validate()?;
    let report = state
        .sdk
        .run(move |s| {
            let user = s
                .users()
                .get(req.user_id)?
                .ok_or_else(|| SwachhError::NotFound(format!("user {}", req.user_id)))?;

            let mut form = ReportForm::new();
            form.set_image(Some(image));
            form.set_location(req.location);
            form.begin_verification()?;
            form.complete_verification(Ok(req.verification));
            if let Some(waste_type) = req.waste_type.filter(|t| !t.trim().is_empty()) {
                form.waste_type = waste_type;
            }
            if let Some(amount) = req.amount.filter(|a| !a.trim().is_empty()) {
                form.amount = amount;
            }
            s.submit_report(&mut form, Some(&user))
        })
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": report }))))
}
