//! Filter form fields, selections and option catalogues

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label shown for a field without a recognised selection
pub const NO_SELECTION_LABEL: &str = "Sin selección";

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const SEX_OPTIONS: [(&str, &str); 2] = [("Femenino", "F"), ("Masculino", "M")];

/// Identifier of a filter form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    Department,
    Province,
    LifeStage,
    ScreeningType,
    Sex,
    Month,
}

impl FieldId {
    /// All fields in display order
    pub const ALL: [FieldId; 6] = [
        FieldId::Department,
        FieldId::Province,
        FieldId::LifeStage,
        FieldId::ScreeningType,
        FieldId::Sex,
        FieldId::Month,
    ];

    /// Wire/URL identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::Department => "department",
            FieldId::Province => "province",
            FieldId::LifeStage => "lifeStage",
            FieldId::ScreeningType => "screeningType",
            FieldId::Sex => "sex",
            FieldId::Month => "month",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            FieldId::Department => "Departamento",
            FieldId::Province => "Provincia",
            FieldId::LifeStage => "Etapa de Vida",
            FieldId::ScreeningType => "Tipo de Tamizaje",
            FieldId::Sex => "Sexo",
            FieldId::Month => "Mes a Predecir",
        }
    }

    /// Options that never come from the backend
    pub fn static_options(&self) -> Option<Vec<SelectOption>> {
        match self {
            FieldId::Sex => Some(
                SEX_OPTIONS
                    .iter()
                    .map(|(label, value)| SelectOption::new(*label, *value))
                    .collect(),
            ),
            FieldId::Month => Some(
                MONTH_NAMES
                    .iter()
                    .enumerate()
                    .map(|(i, name)| SelectOption::new(*name, (i + 1).to_string()))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Label of the option matching `value`, or [`NO_SELECTION_LABEL`]
    pub fn display_value(&self, value: &str) -> String {
        if value.is_empty() {
            return NO_SELECTION_LABEL.to_string();
        }

        match self.static_options() {
            Some(options) => options
                .into_iter()
                .find(|option| option.value == value)
                .map(|option| option.label)
                .unwrap_or_else(|| NO_SELECTION_LABEL.to_string()),
            None => value.to_string(),
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldId::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

/// One selectable option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Backend-provided values double as their own label
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Current values of the filter form.
///
/// `month` is encoded "1".."12" and `sex` "M"/"F".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    pub department: String,
    pub province: String,
    pub life_stage: String,
    pub screening_type: String,
    pub sex: String,
    pub month: String,
}

impl FilterSelection {
    pub fn get(&self, field: FieldId) -> &str {
        match field {
            FieldId::Department => &self.department,
            FieldId::Province => &self.province,
            FieldId::LifeStage => &self.life_stage,
            FieldId::ScreeningType => &self.screening_type,
            FieldId::Sex => &self.sex,
            FieldId::Month => &self.month,
        }
    }

    pub fn set(&mut self, field: FieldId, value: String) {
        match field {
            FieldId::Department => self.department = value,
            FieldId::Province => self.province = value,
            FieldId::LifeStage => self.life_stage = value,
            FieldId::ScreeningType => self.screening_type = value,
            FieldId::Sex => self.sex = value,
            FieldId::Month => self.month = value,
        }
    }

    /// Selection with the static fields preset to their first option
    pub fn with_static_defaults() -> Self {
        let first = |field: FieldId| {
            field
                .static_options()
                .and_then(|options| options.into_iter().next())
                .map(|option| option.value)
                .unwrap_or_default()
        };

        Self {
            sex: first(FieldId::Sex),
            month: first(FieldId::Month),
            ..Default::default()
        }
    }
}

/// Uniform description of one form field for the view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: FieldId,
    pub label: String,
    pub options: Vec<SelectOption>,
    pub value: String,
    /// Options are being fetched; the view should disable the control
    pub loading: bool,
}
