//! Tabular model introspection and exploratory statistics

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Free-form description returned by `GET /model/info`
pub type ModelInfo = Map<String, Value>;

/// One entry of the feature-importance ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Model info plus its top features
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOverview {
    pub info: ModelInfo,
    pub features: Vec<FeatureImportance>,
}

/// `GET /statistics/descriptive`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct DescriptiveStats {
    #[serde(rename(deserialize = "media"))]
    pub mean: f64,
    #[serde(rename(deserialize = "mediana"))]
    pub median: f64,
    #[serde(rename(deserialize = "desviacion_estandar"))]
    pub std_dev: f64,
    #[serde(rename(deserialize = "maximo"))]
    pub max: f64,
}

/// Totals per screening group
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ScreeningGroupTotals {
    #[serde(rename(deserialize = "total_tamizajes"), default)]
    pub all_screenings: f64,
    #[serde(rename(deserialize = "solo_tamizajes_positivos"), default)]
    pub positive_only: f64,
    #[serde(rename(deserialize = "tamizajes_con_violencia_politica"), default)]
    pub with_political_violence: f64,
}

/// `GET /statistics/distribution`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct DistributionStats {
    /// Number of records per group
    #[serde(rename(deserialize = "distribucion_registros"))]
    pub records: ScreeningGroupTotals,
    /// Sum of cases per group
    #[serde(rename(deserialize = "suma_total_casos"))]
    pub cases: ScreeningGroupTotals,
}

/// One row of the screening-type heatmap: a group and one column per type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningTypeHeatmapRow {
    #[serde(rename(deserialize = "grupo"))]
    pub group: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

/// `GET /statistics/heatmap/screening-type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ScreeningTypeHeatmap {
    #[serde(rename(deserialize = "grupo_filtro"), default)]
    pub group_filter: String,
    #[serde(default)]
    pub data: Vec<ScreeningTypeHeatmapRow>,
}

/// One row of the department heatmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct DepartmentHeatmapRow {
    #[serde(rename(deserialize = "departamento"))]
    pub department: String,
    #[serde(rename(deserialize = "solo_tamizajes_positivos"), default)]
    pub positive_only: f64,
    #[serde(
        rename(deserialize = "tamizajes_c_condicion_adicional_violencia_politica"),
        default
    )]
    pub with_political_violence: f64,
    #[serde(rename(deserialize = "total_de_tamizajes"), default)]
    pub all_screenings: f64,
    #[serde(default)]
    pub total: f64,
}

/// `GET /statistics/heatmap/department`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct DepartmentHeatmap {
    #[serde(rename(deserialize = "grupo_filtro"), default)]
    pub group_filter: String,
    /// Reported as either a number or a string
    #[serde(default)]
    pub top_n: Option<Value>,
    #[serde(default)]
    pub data: Vec<DepartmentHeatmapRow>,
}

/// Per-type summary row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ScreeningTypeStat {
    #[serde(rename(deserialize = "detalle_tamizaje"))]
    pub screening_type: String,
    #[serde(rename(deserialize = "total_registros"), default)]
    pub total_records: f64,
    #[serde(rename(deserialize = "suma_total_casos"), default)]
    pub total_cases: f64,
    #[serde(rename(deserialize = "suma_positivos"), default)]
    pub total_positive: f64,
    #[serde(rename(deserialize = "tasa_positividad_promedio"), default)]
    pub mean_rate: f64,
    #[serde(rename(deserialize = "tasa_positividad_mediana"), default)]
    pub median_rate: f64,
    #[serde(rename(deserialize = "tasa_positividad_max"), default)]
    pub max_rate: f64,
}

/// `GET /statistics/screening-types`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningTypesSummary {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub data: Vec<ScreeningTypeStat>,
}

/// All exploratory statistics in one payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploratoryStatistics {
    pub descriptive: DescriptiveStats,
    pub distribution: DistributionStats,
    pub screening_type_heatmap: ScreeningTypeHeatmap,
    pub department_heatmap: DepartmentHeatmap,
    pub screening_types: ScreeningTypesSummary,
}
