//! Tabular model and exploratory statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::api::ApiResult;
use crate::models::{ExploratoryStatistics, ModelOverview};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ModelQuery {
    pub top_n: Option<u32>,
}

/// GET /api/model?top_n=N
pub async fn model_overview(
    State(state): State<AppState>,
    Query(query): Query<ModelQuery>,
) -> ApiResult<Json<ModelOverview>> {
    let (info, features) = tokio::try_join!(
        state.api.model_info(),
        state.api.model_features(query.top_n)
    )?;

    Ok(Json(ModelOverview { info, features }))
}

/// GET /api/statistics
pub async fn statistics(State(state): State<AppState>) -> ApiResult<Json<ExploratoryStatistics>> {
    Ok(Json(state.api.exploratory_statistics().await?))
}
