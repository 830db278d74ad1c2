//! Fake tamizajes backend shared by the integration tests
//!
//! An axum router bound to 127.0.0.1:0 with knobs for latency and failures.
//! Every test gets its own instance.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tmz_common::{HttpClient, RetryPolicy};
use tmz_dash::services::{ImageAnalysisClient, PredictionApi};

/// Knobs and call records of the fake backend
#[derive(Default)]
pub struct FakeBackend {
    /// Artificial latency of `/metadata/departamentos`
    pub department_delay: Mutex<Option<Duration>>,
    /// Artificial latency of `/metadata/provincias/{dept}`
    pub province_delays: Mutex<HashMap<String, Duration>>,
    pub province_calls: AtomicU32,
    /// When set, `/metadata/ubigeo` answers 404
    pub geocode_fails: AtomicBool,
    pub geocode_calls: AtomicU32,
    /// Non-zero: `/predict/explain` answers with this status
    pub predict_status: AtomicU16,
    /// Artificial latency of `/predict/explain`, per requested month
    pub predict_delays: Mutex<HashMap<u64, Duration>>,
    pub predict_payloads: Mutex<Vec<Value>>,
    /// Statuses returned by image endpoints before they succeed
    pub image_failures: Mutex<Vec<u16>>,
    pub image_calls: AtomicU32,
    pub image_uploads: Mutex<Vec<usize>>,
}

impl FakeBackend {
    pub fn delay_provinces(&self, department: &str, delay: Duration) {
        self.province_delays
            .lock()
            .unwrap()
            .insert(department.to_string(), delay);
    }

    pub fn delay_departments(&self, delay: Duration) {
        *self.department_delay.lock().unwrap() = Some(delay);
    }

    pub fn delay_prediction(&self, month: u64, delay: Duration) {
        self.predict_delays.lock().unwrap().insert(month, delay);
    }

    pub fn fail_images_with(&self, statuses: &[u16]) {
        *self.image_failures.lock().unwrap() = statuses.to_vec();
    }

    pub fn predict_payloads(&self) -> Vec<Value> {
        self.predict_payloads.lock().unwrap().clone()
    }

    fn next_image_failure(&self) -> Option<StatusCode> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        let mut failures = self.image_failures.lock().unwrap();
        if failures.is_empty() {
            None
        } else {
            StatusCode::from_u16(failures.remove(0)).ok()
        }
    }
}

pub fn provinces_of(department: &str) -> Vec<&'static str> {
    match department {
        "Cusco" => vec!["Cusco", "Urubamba"],
        "Lima" => vec!["Lima", "Huaral"],
        "Arequipa" => vec!["Arequipa", "Camaná"],
        _ => Vec::new(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn departments(State(fake): State<Arc<FakeBackend>>) -> Json<Value> {
    let delay = *fake.department_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    Json(json!({ "departamentos": ["Cusco", "Lima", "Arequipa"] }))
}

async fn life_stages() -> Json<Value> {
    Json(json!(["Adolescente", "Adulto"]))
}

async fn screening_types() -> Json<Value> {
    Json(json!({ "tamizajes": ["Depresión", "Ansiedad"] }))
}

async fn provinces(State(fake): State<Arc<FakeBackend>>, Path(department): Path<String>) -> Json<Value> {
    fake.province_calls.fetch_add(1, Ordering::SeqCst);

    let delay = fake.province_delays.lock().unwrap().get(&department).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    Json(json!({
        "departamento": department,
        "provincias": provinces_of(&department),
    }))
}

async fn geocode(
    State(fake): State<Arc<FakeBackend>>,
    Path((department, province)): Path<(String, String)>,
) -> Response {
    fake.geocode_calls.fetch_add(1, Ordering::SeqCst);

    if fake.geocode_fails.load(Ordering::SeqCst) {
        return (StatusCode::NOT_FOUND, "ubigeo no encontrado").into_response();
    }

    let code = match (department.as_str(), province.as_str()) {
        ("Lima", "Lima") => 150101,
        ("Cusco", "Cusco") => 80101,
        _ => 99999,
    };

    Json(json!({ "ubigeo": code })).into_response()
}

async fn predict(State(fake): State<Arc<FakeBackend>>, Json(payload): Json<Value>) -> Response {
    fake.predict_payloads.lock().unwrap().push(payload.clone());

    let month = payload["NroMes"].as_u64().unwrap_or_default();
    let delay = fake.predict_delays.lock().unwrap().get(&month).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let status = fake.predict_status.load(Ordering::SeqCst);
    if status != 0 {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "modelo no disponible").into_response();
    }

    Json(json!({
        "tasa_positividad_predicha": 30.0 + month as f64 + 0.54,
        "interpretacion": "Riesgo Alto - Zona crítica",
        "input_data": payload,
    }))
    .into_response()
}

async fn predict_batch(Json(payload): Json<Vec<Value>>) -> Json<Value> {
    let results: Vec<Value> = payload
        .iter()
        .map(|item| {
            json!({
                "tasa_positividad_predicha": item["NroMes"].as_f64().unwrap_or_default(),
                "interpretacion": "Riesgo Bajo - Estable",
            })
        })
        .collect();
    Json(Value::Array(results))
}

async fn image_predict(State(fake): State<Arc<FakeBackend>>, body: Bytes) -> Response {
    if let Some(status) = fake.next_image_failure() {
        return (status, "busy").into_response();
    }

    fake.image_uploads.lock().unwrap().push(body.len());

    Json(json!({
        "predicted_class": "PNEUMONIA",
        "confidence": 0.873,
        "interpretation": "Hallazgos compatibles con neumonía",
        "all_probabilities": { "NORMAL": 0.127, "PNEUMONIA": 0.873 },
        "explicacion": {},
        "metadata": {},
    }))
    .into_response()
}

async fn image_model_info(State(fake): State<Arc<FakeBackend>>) -> Response {
    if let Some(status) = fake.next_image_failure() {
        return (status, "busy").into_response();
    }

    Json(json!({
        "model_type": "CNN",
        "framework": "TensorFlow",
        "input_shape": [224, 224, 3],
        "num_classes": 2,
        "classes": ["NORMAL", "PNEUMONIA"],
    }))
    .into_response()
}

async fn image_model_classes() -> Json<Value> {
    Json(json!([
        { "class_name": "NORMAL", "description": "Sin hallazgos" },
        { "class_name": "PNEUMONIA", "description": "Neumonía" },
    ]))
}

async fn image_model_statistics() -> Json<Value> {
    Json(json!({
        "test_accuracy": 0.91,
        "test_loss": 0.24,
        "per_class_metrics": {
            "NORMAL": { "precision": 0.9, "recall": 0.85, "f1": 0.87 }
        },
        "confusion_matrix": [[200, 34], [20, 370]],
    }))
}

pub fn router(fake: Arc<FakeBackend>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metadata/departamentos", get(departments))
        .route("/metadata/etapas", get(life_stages))
        .route("/metadata/tamizajes", get(screening_types))
        .route("/metadata/provincias/:department", get(provinces))
        .route("/metadata/ubigeo/:department/:province", get(geocode))
        .route("/predict/explain", post(predict))
        .route("/predict/batch", post(predict_batch))
        .route("/image/predict/explain", post(image_predict))
        .route("/image/model/info", get(image_model_info))
        .route("/image/model/classes", get(image_model_classes))
        .route("/image/model/statistics", get(image_model_statistics))
        .with_state(fake)
}

/// Serve `app` on an ephemeral port
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    format!("http://{}", addr)
}

/// Start a fake backend and return its knobs and base URL
pub async fn start() -> (Arc<FakeBackend>, String) {
    let fake = Arc::new(FakeBackend::default());
    let url = spawn(router(fake.clone())).await;
    (fake, url)
}

/// Base URL where nothing listens
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

pub fn prediction_api(url: &str) -> PredictionApi {
    PredictionApi::new(url).expect("prediction api")
}

/// Retry policy with the production attempt count but millisecond delays
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        base_delay: Duration::from_millis(1),
        max_jitter: Duration::ZERO,
        attempt_timeout: Some(Duration::from_secs(5)),
        ..RetryPolicy::default()
    }
}

pub fn image_client(url: &str) -> ImageAnalysisClient {
    ImageAnalysisClient::with_policy(HttpClient::new(url).expect("http client"), fast_policy())
}

pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
];
