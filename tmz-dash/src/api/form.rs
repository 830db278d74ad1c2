//! Filter form endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::api::{ApiError, ApiResult};
use crate::models::FieldId;
use crate::services::FormSnapshot;
use crate::AppState;

/// Body of `PUT /api/form/:field`
#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    pub value: String,
}

/// GET /api/form
pub async fn get_form(State(state): State<AppState>) -> Json<FormSnapshot> {
    Json(state.form.snapshot().await)
}

/// PUT /api/form/:field
///
/// Changing `department` answers once its provinces have loaded (or been
/// superseded by a newer change).
pub async fn update_field(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Json(update): Json<FieldUpdate>,
) -> ApiResult<Json<FormSnapshot>> {
    let field: FieldId = field.parse().map_err(ApiError::NotFound)?;

    let snapshot = state.form.set_field(field, update.value).await?;
    Ok(Json(snapshot))
}

/// POST /api/form/reload
pub async fn reload_form(State(state): State<AppState>) -> Json<FormSnapshot> {
    Json(state.form.initialize().await)
}
