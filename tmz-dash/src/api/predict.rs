//! Prediction endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::api::ApiResult;
use crate::models::{BatchPrediction, PredictionRequest, PredictionResult};
use crate::AppState;

/// POST /api/predict
///
/// Submits the current form. A submission overtaken by a newer one answers 409.
pub async fn submit_prediction(State(state): State<AppState>) -> ApiResult<Json<PredictionResult>> {
    let result = state.form.submit().await?;
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsResponse {
    pub details_expanded: bool,
}

/// POST /api/predict/details
pub async fn toggle_details(State(state): State<AppState>) -> Json<DetailsResponse> {
    Json(DetailsResponse {
        details_expanded: state.form.toggle_details().await,
    })
}

/// POST /api/predict/batch
///
/// Body is an array of backend prediction requests, forwarded as-is.
pub async fn predict_batch(
    State(state): State<AppState>,
    Json(requests): Json<Vec<PredictionRequest>>,
) -> ApiResult<Json<Vec<BatchPrediction>>> {
    let results = state.api.predict_batch(&requests).await?;
    info!(count = results.len(), "Batch prediction served");
    Ok(Json(results))
}
