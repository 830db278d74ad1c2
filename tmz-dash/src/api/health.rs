//! Health and build information endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::time::Duration;

use crate::services::FormStatus;
use crate::AppState;

/// Upper bound on the backend reachability check
pub const BACKEND_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub backend_url: String,
    pub backend_reachable: bool,
    pub form_status: FormStatus,
    pub last_error: Option<String>,
}

/// GET /health
///
/// Always 200 while the host runs; backend reachability is reported, not
/// enforced. A backend slower than [`BACKEND_CHECK_TIMEOUT`] counts as unreachable.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend_reachable = matches!(
        tokio::time::timeout(BACKEND_CHECK_TIMEOUT, state.api.health()).await,
        Ok(Ok(_))
    );
    let snapshot = state.form.snapshot().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "tmz-dash".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        backend_url: state.api.base_url().to_string(),
        backend_reachable,
        form_status: snapshot.status,
        last_error: snapshot.error,
    })
}

/// Build information response
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/buildinfo", get(get_build_info))
}
