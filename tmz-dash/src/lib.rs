//! tmz-dash library - Tamizajes prediction dashboard
//!
//! Client side of the tamizajes mental-health screening backend: metadata
//! and prediction facade, dependent filter form, result view-model, chest
//! X-ray analysis client and theme preference. The dashboard host exposes
//! all of it as JSON for the browser view.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod models;
pub mod services;

use services::{FormController, ImageAnalysisClient, PredictionApi, ThemeStore};

/// Largest accepted image upload
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub form: FormController,
    pub api: PredictionApi,
    pub images: ImageAnalysisClient,
    pub theme: Arc<ThemeStore>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build clients for `api_url` and load the theme from `preferences_path`.
    ///
    /// The form is left `Idle`; call [`FormController::initialize`] before serving.
    pub fn new(api_url: &str, preferences_path: impl Into<PathBuf>) -> tmz_common::Result<Self> {
        let api = PredictionApi::new(api_url)?;
        let images = ImageAnalysisClient::new(api_url)?;

        Ok(Self::with_clients(api, images, ThemeStore::load(preferences_path)))
    }

    pub fn with_clients(api: PredictionApi, images: ImageAnalysisClient, theme: ThemeStore) -> Self {
        Self {
            form: FormController::new(api.clone()),
            api,
            images,
            theme: Arc::new(theme),
            started_at: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let form = Router::new()
        .route("/api/form", get(api::get_form))
        .route("/api/form/reload", post(api::reload_form))
        .route("/api/form/:field", put(api::update_field));

    let predict = Router::new()
        .route("/api/predict", post(api::submit_prediction))
        .route("/api/predict/details", post(api::toggle_details))
        .route("/api/predict/batch", post(api::predict_batch));

    let image = Router::new()
        .route(
            "/api/image",
            post(api::analyze_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route("/api/image/model", get(api::image_model));

    let insights = Router::new()
        .route("/api/model", get(api::model_overview))
        .route("/api/statistics", get(api::statistics));

    let theme = Router::new()
        .route("/api/theme", get(api::get_theme).put(api::put_theme))
        .route("/api/theme/toggle", post(api::toggle_theme));

    Router::new()
        .merge(api::health_routes())
        .merge(form)
        .merge(predict)
        .merge(image)
        .merge(insights)
        .merge(theme)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
