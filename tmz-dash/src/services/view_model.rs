//! Prediction view-model assembly
//!
//! Pure functions: no I/O, no shared state. Turns a raw backend prediction
//! and the submitted filters into what the result panel displays.

use crate::models::{
    DisplayAttribute, FieldId, FilterSelection, PredictionResponseRaw, PredictionResult,
};

/// Delimiter between classification label and detail in `interpretacion`
pub const INTERPRETATION_DELIMITER: &str = " - ";

/// Label used when the interpretation carries no delimiter
pub const FALLBACK_LABEL: &str = "Predicción";

/// Actions shown when the backend sends none
pub const DEFAULT_RECOMMENDATIONS: [&str; 3] = [
    "Reforzar acciones preventivas y seguimiento.",
    "Monitorear indicadores críticos semanalmente.",
    "Coordinar intervención con equipos territoriales.",
];

/// Split "label - detail" on the first delimiter.
///
/// Without a delimiter the label is [`FALLBACK_LABEL`] and the detail is the
/// whole string.
pub fn split_interpretation(interpretation: &str) -> (String, String) {
    match interpretation.split_once(INTERPRETATION_DELIMITER) {
        Some((label, detail)) if !label.is_empty() => (label.to_string(), detail.to_string()),
        Some((_, detail)) => (FALLBACK_LABEL.to_string(), detail.to_string()),
        None => (FALLBACK_LABEL.to_string(), interpretation.to_string()),
    }
}

/// Rate on the 0-100 scale with two decimals, e.g. "33.54%"
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate)
}

/// Submitted filters as label/value pairs, plus the geocode when known
pub fn display_attributes(selection: &FilterSelection, geocode: Option<i64>) -> Vec<DisplayAttribute> {
    let mut attributes: Vec<DisplayAttribute> = FieldId::ALL
        .iter()
        .map(|field| DisplayAttribute {
            id: field.as_str().to_string(),
            label: field.label().to_string(),
            value: field.display_value(selection.get(*field)),
        })
        .collect();

    if let Some(code) = geocode {
        attributes.push(DisplayAttribute {
            id: "ubigeo".to_string(),
            label: "Ubigeo".to_string(),
            value: code.to_string(),
        });
    }

    attributes
}

/// Assemble the display-ready prediction
pub fn assemble(
    raw: &PredictionResponseRaw,
    selection: &FilterSelection,
    geocode: Option<i64>,
) -> PredictionResult {
    let (label, detail) = split_interpretation(raw.interpretation.as_deref().unwrap_or_default());
    let explanation = raw.explanation.clone().unwrap_or_default();

    let recommended_actions = match explanation.actions {
        Some(actions) if !actions.is_empty() => actions,
        _ => DEFAULT_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
    };

    PredictionResult {
        predicted_rate: raw.predicted_rate,
        display_value: format_rate(raw.predicted_rate),
        interpretation_label: label,
        interpretation_detail: detail,
        recommended_actions,
        situational_context: explanation.situational_context,
        key_factors: explanation.key_factors.unwrap_or_default(),
        attributes: display_attributes(selection, geocode),
        geocode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PredictionExplanation, NO_SELECTION_LABEL};

    fn selection() -> FilterSelection {
        FilterSelection {
            department: "Lima".to_string(),
            province: "Lima".to_string(),
            life_stage: "Adolescente".to_string(),
            screening_type: "Depresión".to_string(),
            sex: "F".to_string(),
            month: "6".to_string(),
        }
    }

    fn raw(rate: f64, interpretation: &str) -> PredictionResponseRaw {
        PredictionResponseRaw {
            predicted_rate: rate,
            interpretation: Some(interpretation.to_string()),
            explanation: None,
            input_data: None,
        }
    }

    #[test]
    fn test_split_with_delimiter() {
        let (label, detail) = split_interpretation("Riesgo Alto - Zona crítica");
        assert_eq!(label, "Riesgo Alto");
        assert_eq!(detail, "Zona crítica");
    }

    #[test]
    fn test_split_reassembles_original() {
        let inputs = [
            "Riesgo Alto - Zona crítica",
            "Riesgo Medio - Vigilar - revisar en 30 días",
            "A -  B",
            "x - ",
        ];

        for input in inputs {
            let (label, detail) = split_interpretation(input);
            assert_eq!(format!("{}{}{}", label, INTERPRETATION_DELIMITER, detail), input);
        }
    }

    #[test]
    fn test_split_keeps_later_delimiters_in_detail() {
        let (label, detail) = split_interpretation("Riesgo Medio - Vigilar - revisar");
        assert_eq!(label, "Riesgo Medio");
        assert_eq!(detail, "Vigilar - revisar");
    }

    #[test]
    fn test_split_without_delimiter_uses_fallback() {
        for input in ["Riesgo Bajo", "", "sin-espacios-alrededor"] {
            let (label, detail) = split_interpretation(input);
            assert_eq!(label, FALLBACK_LABEL);
            assert_eq!(detail, input);
        }
    }

    #[test]
    fn test_assemble_scenario() {
        let result = assemble(&raw(33.54, "Riesgo Alto - Zona crítica"), &selection(), None);

        assert_eq!(result.interpretation_label, "Riesgo Alto");
        assert_eq!(result.interpretation_detail, "Zona crítica");
        assert_eq!(result.display_value, "33.54%");
        assert_eq!(result.recommended_actions.len(), 3);
        assert_eq!(result.recommended_actions[0], DEFAULT_RECOMMENDATIONS[0]);
        assert!(result.key_factors.is_empty());
        assert!(result.situational_context.is_none());
    }

    #[test]
    fn test_assemble_uses_backend_explanation() {
        let mut response = raw(12.0, "Riesgo Bajo - Estable");
        response.explanation = Some(PredictionExplanation {
            situational_context: Some("Tendencia estable".to_string()),
            actions: Some(vec!["Mantener vigilancia".to_string()]),
            key_factors: Some(vec!["Ubigeo".to_string(), "NroMes".to_string()]),
        });

        let result = assemble(&response, &selection(), Some(150101));

        assert_eq!(result.recommended_actions, vec!["Mantener vigilancia"]);
        assert_eq!(result.situational_context.as_deref(), Some("Tendencia estable"));
        assert_eq!(result.key_factors, vec!["Ubigeo", "NroMes"]);
        assert_eq!(result.geocode, Some(150101));
    }

    #[test]
    fn test_empty_backend_actions_fall_back_to_defaults() {
        let mut response = raw(50.0, "Riesgo Alto - Crítico");
        response.explanation = Some(PredictionExplanation {
            actions: Some(Vec::new()),
            ..Default::default()
        });

        let result = assemble(&response, &selection(), None);
        assert_eq!(result.recommended_actions.len(), DEFAULT_RECOMMENDATIONS.len());
    }

    #[test]
    fn test_attributes_use_human_readable_labels() {
        let attributes = display_attributes(&selection(), Some(150101));

        let sex = attributes.iter().find(|a| a.id == "sex").unwrap();
        assert_eq!(sex.label, "Sexo");
        assert_eq!(sex.value, "Femenino");

        let month = attributes.iter().find(|a| a.id == "month").unwrap();
        assert_eq!(month.value, "Junio");

        let last = attributes.last().unwrap();
        assert_eq!(last.id, "ubigeo");
        assert_eq!(last.value, "150101");
    }

    #[test]
    fn test_attributes_without_geocode_or_selection() {
        let attributes = display_attributes(&FilterSelection::default(), None);
        assert_eq!(attributes.len(), FieldId::ALL.len());
        assert!(attributes.iter().all(|a| a.value == NO_SELECTION_LABEL));
    }

    #[test]
    fn test_format_rate_rounds_to_two_decimals() {
        assert_eq!(format_rate(33.54), "33.54%");
        assert_eq!(format_rate(7.0), "7.00%");
        assert_eq!(format_rate(12.345678), "12.35%");
    }
}
