//! Chest X-ray analysis endpoints

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::ApiResult;
use crate::models::{ImageModelOverview, ImagePrediction};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub filename: Option<String>,
}

/// POST /api/image?filename=..
///
/// Raw image bytes in the body.
pub async fn analyze_image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
    body: Bytes,
) -> ApiResult<Json<ImagePrediction>> {
    let filename = query.filename.unwrap_or_default();
    let prediction = state.images.predict_image(body.to_vec(), &filename).await?;
    Ok(Json(prediction))
}

/// GET /api/image/model
pub async fn image_model(State(state): State<AppState>) -> ApiResult<Json<ImageModelOverview>> {
    Ok(Json(state.images.model_overview().await?))
}
