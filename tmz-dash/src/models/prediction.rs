//! Positivity-rate prediction payloads and view-model
//!
//! Wire payloads keep the backend's field names (`NroMes`,
//! `tasa_positividad_predicha`, ...). Types handed to the view serialize
//! in camelCase.

use serde::{Deserialize, Serialize};
use tmz_common::{Error, Result};

use super::filters::FilterSelection;

/// Sex code accepted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    /// `"M"` maps to [`Sex::M`]; anything else to [`Sex::F`]
    pub fn from_code(code: &str) -> Self {
        if code == "M" {
            Sex::M
        } else {
            Sex::F
        }
    }
}

/// Body of `POST /predict/explain` (and each element of `/predict/batch`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "NroMes")]
    pub month: u32,
    #[serde(rename = "Departamento")]
    pub department: String,
    #[serde(rename = "Provincia")]
    pub province: String,
    #[serde(rename = "Sexo")]
    pub sex: Sex,
    #[serde(rename = "Etapa")]
    pub life_stage: String,
    #[serde(rename = "DetalleTamizaje")]
    pub screening_type: String,
    #[serde(rename = "ubigeo", default, skip_serializing_if = "Option::is_none")]
    pub geocode: Option<i64>,
}

impl PredictionRequest {
    /// Compose a request from the form selection and an optional geocode
    pub fn from_selection(selection: &FilterSelection, geocode: Option<i64>) -> Result<Self> {
        let month = parse_month(&selection.month)?;

        Ok(Self {
            month,
            department: selection.department.clone(),
            province: selection.province.clone(),
            sex: Sex::from_code(&selection.sex),
            life_stage: selection.life_stage.clone(),
            screening_type: selection.screening_type.clone(),
            geocode,
        })
    }
}

/// Parse a month encoded "1".."12"
pub fn parse_month(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(month) if (1..=12).contains(&month) => Ok(month),
        _ => Err(Error::InvalidInput(format!(
            "Month must be between 1 and 12, got '{}'",
            raw
        ))),
    }
}

/// Optional explanation block of a prediction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PredictionExplanation {
    #[serde(rename(deserialize = "contexto_situacional"), default)]
    pub situational_context: Option<String>,
    #[serde(rename(deserialize = "acciones"), default)]
    pub actions: Option<Vec<String>>,
    #[serde(rename(deserialize = "factores_clave"), default)]
    pub key_factors: Option<Vec<String>>,
}

/// Response of `POST /predict/explain`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct PredictionResponseRaw {
    /// Predicted positivity rate on a 0-100 scale
    #[serde(rename(deserialize = "tasa_positividad_predicha"))]
    pub predicted_rate: f64,
    /// "label - detail" interpretation string
    #[serde(rename(deserialize = "interpretacion"), default)]
    pub interpretation: Option<String>,
    #[serde(rename(deserialize = "explicacion"), default)]
    pub explanation: Option<PredictionExplanation>,
    /// Echo of the request as the backend understood it
    #[serde(default)]
    pub input_data: Option<PredictionRequest>,
}

/// One element of the `POST /predict/batch` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct BatchPrediction {
    #[serde(rename(deserialize = "tasa_positividad_predicha"))]
    pub predicted_rate: f64,
    #[serde(rename(deserialize = "interpretacion"), default)]
    pub interpretation: Option<String>,
}

/// Label/value pair describing one submitted filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayAttribute {
    pub id: String,
    pub label: String,
    pub value: String,
}

/// Display-ready prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Positivity rate on a 0-100 scale
    pub predicted_rate: f64,
    /// Rate formatted for display, e.g. "33.54%"
    pub display_value: String,
    pub interpretation_label: String,
    pub interpretation_detail: String,
    pub recommended_actions: Vec<String>,
    pub situational_context: Option<String>,
    pub key_factors: Vec<String>,
    /// Submitted filters with human-readable values
    pub attributes: Vec<DisplayAttribute>,
    pub geocode: Option<i64>,
}
