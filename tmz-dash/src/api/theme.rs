//! Theme preference endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiResult};
use crate::services::Theme;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: String,
}

impl From<Theme> for ThemeBody {
    fn from(theme: Theme) -> Self {
        Self {
            theme: theme.as_str().to_string(),
        }
    }
}

/// GET /api/theme
pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeBody> {
    Json(state.theme.get().await.into())
}

/// PUT /api/theme with `{ "theme": "light" | "dark" }`
pub async fn put_theme(
    State(state): State<AppState>,
    Json(body): Json<ThemeBody>,
) -> ApiResult<Json<ThemeBody>> {
    let theme: Theme = body
        .theme
        .parse()
        .map_err(|e: tmz_common::Error| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(state.theme.set(theme).await?.into()))
}

/// POST /api/theme/toggle
pub async fn toggle_theme(State(state): State<AppState>) -> ApiResult<Json<ThemeBody>> {
    Ok(Json(state.theme.toggle().await?.into()))
}
