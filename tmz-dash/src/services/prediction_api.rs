//! Metadata / prediction API facade
//!
//! Maps domain operations onto backend endpoints and pushes response-shape
//! normalization into one narrow adapter per endpoint, so callers always see
//! a single canonical shape.
//!
//! Failure policy:
//! - Option lists (departments, provinces, life stages, screening types)
//!   swallow failures and come back empty
//! - Geocode, prediction, introspection and statistics calls propagate errors

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tmz_common::http::encode_path;
use tmz_common::{Error, HttpClient, Result};
use tracing::{debug, info, warn};

use crate::models::{
    BatchPrediction, DepartmentHeatmap, DescriptiveStats, DistributionStats,
    ExploratoryStatistics, FeatureImportance, ModelInfo, PredictionRequest,
    PredictionResponseRaw, ScreeningTypeHeatmap, ScreeningTypesSummary,
};

/// Response of `GET /health` on the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: String,
}

/// Prediction backend facade
#[derive(Debug, Clone)]
pub struct PredictionApi {
    http: HttpClient,
}

impl PredictionApi {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
        })
    }

    pub fn from_client(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<BackendHealth> {
        self.http.get("/health").await
    }

    /// `GET /metadata/departamentos`, empty on failure
    pub async fn list_departments(&self) -> Vec<String> {
        self.list_metadata("departamentos").await
    }

    /// `GET /metadata/etapas`, empty on failure
    pub async fn list_life_stages(&self) -> Vec<String> {
        self.list_metadata("etapas").await
    }

    /// `GET /metadata/tamizajes`, empty on failure
    pub async fn list_screening_types(&self) -> Vec<String> {
        self.list_metadata("tamizajes").await
    }

    async fn list_metadata(&self, resource: &str) -> Vec<String> {
        let path = encode_path(&["metadata", resource]);

        match self.http.get::<Value>(&path).await {
            Ok(value) => {
                let items = normalize_string_list(value);
                debug!(resource, count = items.len(), "Loaded metadata options");
                items
            }
            Err(e) => {
                warn!(resource, error = %e, "Metadata request failed, using empty option list");
                Vec::new()
            }
        }
    }

    /// `GET /metadata/provincias/{dept}`, empty on failure.
    ///
    /// An empty department makes no request.
    pub async fn list_provinces(&self, department: &str) -> Vec<String> {
        if department.trim().is_empty() {
            return Vec::new();
        }

        let path = encode_path(&["metadata", "provincias", department]);

        match self.http.get::<Value>(&path).await {
            Ok(value) => normalize_provinces(value),
            Err(e) => {
                warn!(department = %department, error = %e, "Province request failed, using empty option list");
                Vec::new()
            }
        }
    }

    /// `GET /metadata/ubigeo/{dept}/{prov}`.
    ///
    /// Callers treat any error as "geocode unknown".
    pub async fn resolve_geocode(&self, department: &str, province: &str) -> Result<i64> {
        if department.trim().is_empty() || province.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Department and province are required to resolve a geocode".to_string(),
            ));
        }

        let path = encode_path(&["metadata", "ubigeo", department, province]);
        let value: Value = self.http.get(&path).await?;

        extract_geocode(&value).ok_or_else(|| {
            Error::MalformedResponse(format!("No numeric ubigeo in response: {}", value))
        })
    }

    /// `POST /predict/explain`
    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponseRaw> {
        let response: PredictionResponseRaw = self.http.post("/predict/explain", request).await?;

        info!(
            department = %request.department,
            province = %request.province,
            month = request.month,
            rate = response.predicted_rate,
            "Prediction received"
        );

        Ok(response)
    }

    /// `POST /predict/batch`
    pub async fn predict_batch(&self, requests: &[PredictionRequest]) -> Result<Vec<BatchPrediction>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let results: Vec<BatchPrediction> = self.http.post("/predict/batch", requests).await?;

        if results.len() != requests.len() {
            warn!(
                requested = requests.len(),
                returned = results.len(),
                "Batch prediction size mismatch"
            );
        }

        Ok(results)
    }

    /// `GET /model/info`
    pub async fn model_info(&self) -> Result<ModelInfo> {
        self.http.get("/model/info").await
    }

    /// `GET /model/features[?top_n=N]`, accepting a bare array or `{ top_features }`
    pub async fn model_features(&self, top_n: Option<u32>) -> Result<Vec<FeatureImportance>> {
        let path = match top_n {
            Some(n) => format!("/model/features?top_n={}", n),
            None => "/model/features".to_string(),
        };

        let value: Value = self.http.get(&path).await?;
        Ok(normalize_features(value))
    }

    /// `GET /statistics/descriptive`
    pub async fn descriptive_stats(&self) -> Result<DescriptiveStats> {
        self.http.get("/statistics/descriptive").await
    }

    /// `GET /statistics/distribution`
    pub async fn distribution_stats(&self) -> Result<DistributionStats> {
        self.http.get("/statistics/distribution").await
    }

    /// `GET /statistics/heatmap/screening-type`
    pub async fn screening_type_heatmap(&self) -> Result<ScreeningTypeHeatmap> {
        self.http.get("/statistics/heatmap/screening-type").await
    }

    /// `GET /statistics/heatmap/department`
    pub async fn department_heatmap(&self) -> Result<DepartmentHeatmap> {
        self.http.get("/statistics/heatmap/department").await
    }

    /// `GET /statistics/screening-types`
    pub async fn screening_types_summary(&self) -> Result<ScreeningTypesSummary> {
        self.http.get("/statistics/screening-types").await
    }

    /// Every statistics endpoint, fetched concurrently
    pub async fn exploratory_statistics(&self) -> Result<ExploratoryStatistics> {
        let (descriptive, distribution, screening_type_heatmap, department_heatmap, screening_types) = tokio::try_join!(
            self.descriptive_stats(),
            self.distribution_stats(),
            self.screening_type_heatmap(),
            self.department_heatmap(),
            self.screening_types_summary(),
        )?;

        Ok(ExploratoryStatistics {
            descriptive,
            distribution,
            screening_type_heatmap,
            department_heatmap,
            screening_types,
        })
    }
}

/// Flat array of strings, or an object whose first property is one.
/// Anything else becomes an empty list.
pub fn normalize_string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => strings_only(items),
        Value::Object(map) => match map.into_iter().next() {
            Some((_, Value::Array(items))) => strings_only(items),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// `{ departamento, provincias: [...] }` → provinces
pub fn normalize_provinces(value: Value) -> Vec<String> {
    match value {
        Value::Object(mut map) => match map.remove("provincias") {
            Some(Value::Array(items)) => strings_only(items),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Bare array or `{ top_features: [...] }` → features; malformed entries dropped
pub fn normalize_features(value: Value) -> Vec<FeatureImportance> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("top_features") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

fn strings_only(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// `{ "ubigeo": 150101 }` (number or numeric string) → 150101
fn extract_geocode(value: &Value) -> Option<i64> {
    match value.get("ubigeo")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_flat_array() {
        assert_eq!(normalize_string_list(json!(["A", "B"])), vec!["A", "B"]);
    }

    #[test]
    fn test_normalize_wrapped_object() {
        assert_eq!(normalize_string_list(json!({"foo": ["A", "B"]})), vec!["A", "B"]);
    }

    #[test]
    fn test_normalize_uses_first_property() {
        let value = json!({"departamentos": ["Lima"], "total": 1});
        assert_eq!(normalize_string_list(value), vec!["Lima"]);

        let value = json!({"total": 1, "departamentos": ["Lima"]});
        assert!(normalize_string_list(value).is_empty());
    }

    #[test]
    fn test_normalize_other_shapes_are_empty() {
        assert!(normalize_string_list(json!({})).is_empty());
        assert!(normalize_string_list(Value::Null).is_empty());
        assert!(normalize_string_list(json!("Lima")).is_empty());
        assert!(normalize_string_list(json!(42)).is_empty());
    }

    #[test]
    fn test_normalize_drops_non_strings() {
        assert_eq!(normalize_string_list(json!(["A", 1, null, "B"])), vec!["A", "B"]);
    }

    #[test]
    fn test_normalize_provinces() {
        let value = json!({"departamento": "Cusco", "provincias": ["Cusco", "Urubamba"]});
        assert_eq!(normalize_provinces(value), vec!["Cusco", "Urubamba"]);

        assert!(normalize_provinces(json!({"departamento": "Cusco"})).is_empty());
        assert!(normalize_provinces(json!({"provincias": "Cusco"})).is_empty());
        assert!(normalize_provinces(json!(["Cusco"])).is_empty());
    }

    #[test]
    fn test_normalize_features_shapes() {
        let bare = json!([{"feature": "Ubigeo", "importance": 0.3307}]);
        assert_eq!(normalize_features(bare).len(), 1);

        let wrapped = json!({"top_features": [
            {"feature": "Ubigeo", "importance": 0.3307},
            {"feature": "NroMes", "importance": 0.1141}
        ]});
        let features = normalize_features(wrapped);
        assert_eq!(features[1].feature, "NroMes");

        assert!(normalize_features(json!({"features": []})).is_empty());
        assert!(normalize_features(Value::Null).is_empty());
    }

    #[test]
    fn test_normalize_features_skips_malformed_entries() {
        let value = json!([{"feature": "Ubigeo", "importance": 0.3}, {"feature": "x"}]);
        assert_eq!(normalize_features(value).len(), 1);
    }

    #[test]
    fn test_extract_geocode() {
        assert_eq!(extract_geocode(&json!({"ubigeo": 150101})), Some(150101));
        assert_eq!(extract_geocode(&json!({"ubigeo": "080101"})), Some(80101));
        assert_eq!(extract_geocode(&json!({"ubigeo": null})), None);
        assert_eq!(extract_geocode(&json!({})), None);
    }
}
