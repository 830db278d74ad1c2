//! Chest X-ray classification payloads

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Clinical text attached to an image prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ClinicalExplanation {
    #[serde(rename(deserialize = "contexto_clinico"), default)]
    pub context: String,
    #[serde(rename(deserialize = "recomendaciones"), default)]
    pub recommendations: Vec<String>,
    #[serde(rename(deserialize = "consideraciones"), default)]
    pub considerations: Vec<String>,
}

/// Processing metadata reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ImageMetadata {
    /// `[width, height]` (a trailing channel count may follow)
    #[serde(default)]
    pub image_size: Vec<u32>,
    #[serde(default)]
    pub processing_time_ms: f64,
    #[serde(default)]
    pub filename: String,
}

impl ImageMetadata {
    /// `(width, height)` when the backend reported both
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self.image_size.as_slice() {
            [width, height, ..] => Some((*width, *height)),
            _ => None,
        }
    }
}

/// Response of `POST /image/predict/explain`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ImagePrediction {
    pub predicted_class: String,
    /// Probability of the predicted class (0-1)
    pub confidence: f64,
    #[serde(default)]
    pub interpretation: Option<String>,
    #[serde(rename(deserialize = "all_probabilities"), default)]
    pub per_class_probabilities: BTreeMap<String, f64>,
    #[serde(rename(deserialize = "explicacion"), default)]
    pub clinical_explanation: ClinicalExplanation,
    #[serde(default)]
    pub metadata: ImageMetadata,
}

impl ImagePrediction {
    /// Class probabilities, most likely first
    pub fn ranked_probabilities(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .per_class_probabilities
            .iter()
            .map(|(class, p)| (class.clone(), *p))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Confidence as a percentage string, e.g. "87.30%"
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

/// Layer and parameter counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ModelArchitecture {
    #[serde(default)]
    pub total_params: u64,
    #[serde(default)]
    pub trainable_params: u64,
    #[serde(default)]
    pub layers: u32,
}

/// Training hyper-parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct TrainingInfo {
    #[serde(default)]
    pub epochs: u32,
    #[serde(default)]
    pub batch_size: u32,
    #[serde(default)]
    pub optimizer: String,
    #[serde(default)]
    pub learning_rate: f64,
    #[serde(default)]
    pub loss: String,
}

/// Response of `GET /image/model/info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ImageModelInfo {
    pub model_type: String,
    #[serde(default)]
    pub framework: String,
    #[serde(default)]
    pub input_shape: Vec<u32>,
    #[serde(default)]
    pub num_classes: u32,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub architecture: ModelArchitecture,
    #[serde(default)]
    pub training_info: TrainingInfo,
}

/// One element of `GET /image/model/classes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ImageModelClass {
    pub class_name: String,
    #[serde(default)]
    pub description: String,
}

/// Precision/recall/F1 of one class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Response of `GET /image/model/statistics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ImageModelStatistics {
    pub test_accuracy: f64,
    #[serde(default)]
    pub test_loss: f64,
    #[serde(default)]
    pub per_class_metrics: BTreeMap<String, ClassMetrics>,
    #[serde(default)]
    pub confusion_matrix: Vec<Vec<u64>>,
}

/// Everything the model-info view shows, fetched together
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageModelOverview {
    pub info: ImageModelInfo,
    pub classes: Vec<ImageModelClass>,
    pub statistics: ImageModelStatistics,
}
