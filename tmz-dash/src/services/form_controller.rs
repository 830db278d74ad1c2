//! Dependent filter form controller
//!
//! Owns the filter selection, the option lists and the last prediction.
//!
//! **States:** `Idle` → `LoadingInitialMetadata` → `Ready`, with
//! `LoadingProvinces` entered from `Ready` on every department change.
//!
//! **Ordering:** metadata loads, province loads and prediction submissions
//! are tagged with a monotonically increasing number taken under the state
//! lock. A completion whose tag is no longer current is discarded, so the
//! most recent initiating action always wins. The form stays in
//! `LoadingInitialMetadata` until the metadata lists are applied and the
//! province list that follows them resolves.
//!
//! The lock is never held across a network call.

use serde::Serialize;
use std::sync::Arc;
use tmz_common::{Error, Result};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::models::prediction::parse_month;
use crate::models::{
    FieldDescriptor, FieldId, FilterSelection, PredictionRequest, PredictionResult, SelectOption,
};
use crate::services::prediction_api::PredictionApi;
use crate::services::view_model;

/// Lifecycle of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormStatus {
    Idle,
    LoadingInitialMetadata,
    Ready,
    LoadingProvinces,
}

#[derive(Debug, Clone, Default)]
struct FieldOptions {
    departments: Vec<String>,
    provinces: Vec<String>,
    life_stages: Vec<String>,
    screening_types: Vec<String>,
}

impl FieldOptions {
    fn backend_options(&self, field: FieldId) -> Option<&[String]> {
        match field {
            FieldId::Department => Some(&self.departments),
            FieldId::Province => Some(&self.provinces),
            FieldId::LifeStage => Some(&self.life_stages),
            FieldId::ScreeningType => Some(&self.screening_types),
            FieldId::Sex | FieldId::Month => None,
        }
    }
}

#[derive(Debug)]
struct FormState {
    status: FormStatus,
    selection: FilterSelection,
    options: FieldOptions,
    /// Tag of the most recent metadata load
    metadata_request: u64,
    /// A metadata load has started and not yet applied its lists
    metadata_pending: bool,
    /// Bumped on every explicit department change
    department_changes: u64,
    /// Tag of the most recent province load
    province_request: u64,
    /// Tag of the most recent submission
    submission: u64,
    submitting: bool,
    result: Option<PredictionResult>,
    error: Option<String>,
    details_expanded: bool,
}

impl FormState {
    fn new() -> Self {
        Self {
            status: FormStatus::Idle,
            selection: FilterSelection::with_static_defaults(),
            options: FieldOptions::default(),
            metadata_request: 0,
            metadata_pending: false,
            department_changes: 0,
            province_request: 0,
            submission: 0,
            submitting: false,
            result: None,
            error: None,
            details_expanded: false,
        }
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        FieldId::ALL
            .iter()
            .map(|field| {
                let options = match self.options.backend_options(*field) {
                    Some(values) => values.iter().cloned().map(SelectOption::from_value).collect(),
                    None => field.static_options().unwrap_or_default(),
                };

                let loading = match field {
                    FieldId::Province => matches!(
                        self.status,
                        FormStatus::LoadingInitialMetadata | FormStatus::LoadingProvinces
                    ),
                    FieldId::Sex | FieldId::Month => false,
                    _ => self.status == FormStatus::LoadingInitialMetadata,
                };

                FieldDescriptor {
                    id: *field,
                    label: field.label().to_string(),
                    options,
                    value: self.selection.get(*field).to_string(),
                    loading,
                }
            })
            .collect()
    }

    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            status: self.status,
            selection: self.selection.clone(),
            fields: self.fields(),
            result: self.result.clone(),
            error: self.error.clone(),
            details_expanded: self.details_expanded,
            submitting: self.submitting,
        }
    }

    /// Reset province state and hand out a new load tag
    fn begin_province_load(&mut self) -> u64 {
        self.selection.province.clear();
        self.options.provinces.clear();
        self.province_request += 1;
        self.province_request
    }

    fn validate(&self, field: FieldId, value: &str) -> Result<()> {
        match field {
            FieldId::Sex => {
                if value != "M" && value != "F" {
                    return Err(Error::InvalidInput(format!(
                        "Sex must be 'M' or 'F', got '{}'",
                        value
                    )));
                }
            }
            FieldId::Month => {
                parse_month(value)?;
            }
            FieldId::Province => {
                if !value.is_empty() && !self.options.provinces.iter().any(|p| p == value) {
                    return Err(Error::InvalidInput(format!(
                        "Province '{}' is not valid for department '{}'",
                        value, self.selection.department
                    )));
                }
            }
            FieldId::LifeStage | FieldId::ScreeningType => {
                let known = self.options.backend_options(field).unwrap_or_default();
                if !known.is_empty() && !known.iter().any(|v| v == value) {
                    return Err(Error::InvalidInput(format!(
                        "'{}' is not a known option for {}",
                        value,
                        field.label()
                    )));
                }
            }
            FieldId::Department => {}
        }

        Ok(())
    }
}

/// Read-only view of the form for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub status: FormStatus,
    pub selection: FilterSelection,
    pub fields: Vec<FieldDescriptor>,
    pub result: Option<PredictionResult>,
    pub error: Option<String>,
    pub details_expanded: bool,
    pub submitting: bool,
}

/// Filter form controller. Clones share the same state.
#[derive(Debug, Clone)]
pub struct FormController {
    api: PredictionApi,
    state: Arc<RwLock<FormState>>,
}

impl FormController {
    pub fn new(api: PredictionApi) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(FormState::new())),
        }
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn status(&self) -> FormStatus {
        self.state.read().await.status
    }

    pub async fn selection(&self) -> FilterSelection {
        self.state.read().await.selection.clone()
    }

    /// Load departments, life stages and screening types concurrently, select
    /// the first of each, then load provinces for that department.
    ///
    /// A department chosen while the lists load is kept. A newer
    /// `initialize` call supersedes this one. `Ready` is reached only after
    /// the province list resolves.
    pub async fn initialize(&self) -> FormSnapshot {
        let (ticket, changes_at_start) = {
            let mut state = self.state.write().await;
            state.status = FormStatus::LoadingInitialMetadata;
            state.metadata_pending = true;
            state.metadata_request += 1;
            (state.metadata_request, state.department_changes)
        };

        let (departments, life_stages, screening_types) = tokio::join!(
            self.api.list_departments(),
            self.api.list_life_stages(),
            self.api.list_screening_types()
        );

        info!(
            departments = departments.len(),
            life_stages = life_stages.len(),
            screening_types = screening_types.len(),
            "Initial metadata loaded"
        );

        let (department, generation) = {
            let mut state = self.state.write().await;

            if state.metadata_request != ticket {
                debug!(ticket, current = state.metadata_request, "Discarding superseded metadata load");
                return state.snapshot();
            }

            if state.department_changes == changes_at_start {
                state.selection.department = departments.first().cloned().unwrap_or_default();
            } else {
                debug!(department = %state.selection.department, "Keeping department chosen during load");
            }
            state.selection.life_stage = life_stages.first().cloned().unwrap_or_default();
            state.selection.screening_type = screening_types.first().cloned().unwrap_or_default();
            state.options.departments = departments;
            state.options.life_stages = life_stages;
            state.options.screening_types = screening_types;
            state.metadata_pending = false;
            state.status = FormStatus::LoadingInitialMetadata;

            let generation = state.begin_province_load();
            (state.selection.department.clone(), generation)
        };

        let provinces = self.api.list_provinces(&department).await;
        self.apply_provinces(generation, &department, provinces).await;

        self.snapshot().await
    }

    /// Update one field.
    ///
    /// A department change clears the province and its options at once and
    /// reloads them; any other field updates synchronously after validation.
    pub async fn set_field(&self, field: FieldId, value: String) -> Result<FormSnapshot> {
        if field == FieldId::Department {
            return Ok(self.change_department(value).await);
        }

        let mut state = self.state.write().await;
        state.validate(field, &value)?;
        state.selection.set(field, value);

        debug!(field = %field, "Field updated");
        Ok(state.snapshot())
    }

    /// Select a department and reload its provinces
    pub async fn change_department(&self, department: String) -> FormSnapshot {
        let generation = {
            let mut state = self.state.write().await;

            state.selection.department = department.clone();
            state.department_changes += 1;
            let generation = state.begin_province_load();
            if state.status != FormStatus::LoadingInitialMetadata {
                state.status = FormStatus::LoadingProvinces;
            }
            generation
        };

        debug!(department = %department, generation, "Department changed, reloading provinces");

        let provinces = self.api.list_provinces(&department).await;
        self.apply_provinces(generation, &department, provinces).await;

        self.snapshot().await
    }

    async fn apply_provinces(&self, generation: u64, department: &str, provinces: Vec<String>) -> bool {
        let mut state = self.state.write().await;

        if state.province_request != generation {
            debug!(
                department = %department,
                generation,
                current = state.province_request,
                "Discarding superseded province list"
            );
            return false;
        }

        state.selection.province = provinces.first().cloned().unwrap_or_default();
        state.options.provinces = provinces;
        // The metadata load restarts provinces once its lists arrive
        if !state.metadata_pending {
            state.status = FormStatus::Ready;
        }
        true
    }

    /// Resolve the geocode (best effort), request a prediction and store its
    /// view-model.
    ///
    /// On failure any previous result is cleared. A submission overtaken by a
    /// newer one returns [`Error::Superseded`] and leaves state untouched.
    pub async fn submit(&self) -> Result<PredictionResult> {
        let (selection, ticket) = {
            let mut state = self.state.write().await;

            if state.status != FormStatus::Ready {
                return Err(Error::InvalidInput(format!(
                    "Form is not ready for submission ({:?})",
                    state.status
                )));
            }

            state.submission += 1;
            state.submitting = true;
            (state.selection.clone(), state.submission)
        };

        let outcome = self.run_prediction(&selection).await;

        let mut state = self.state.write().await;

        if state.submission != ticket {
            debug!(ticket, current = state.submission, "Discarding superseded prediction");
            return Err(Error::Superseded(
                "A newer prediction request was submitted".to_string(),
            ));
        }

        state.submitting = false;

        match outcome {
            Ok(result) => {
                state.result = Some(result.clone());
                state.error = None;
                state.details_expanded = false;
                Ok(result)
            }
            Err(e) => {
                error!(error = %e, "Prediction failed");
                state.result = None;
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn run_prediction(&self, selection: &FilterSelection) -> Result<PredictionResult> {
        let geocode = if !selection.department.is_empty() && !selection.province.is_empty() {
            match self
                .api
                .resolve_geocode(&selection.department, &selection.province)
                .await
            {
                Ok(code) => Some(code),
                Err(e) => {
                    warn!(
                        department = %selection.department,
                        province = %selection.province,
                        error = %e,
                        "Geocode lookup failed, predicting without it"
                    );
                    None
                }
            }
        } else {
            None
        };

        let request = PredictionRequest::from_selection(selection, geocode)?;
        let raw = self.api.predict(&request).await?;

        Ok(view_model::assemble(&raw, selection, geocode))
    }

    /// Flip the "details expanded" flag of the result panel
    pub async fn toggle_details(&self) -> bool {
        let mut state = self.state.write().await;
        state.details_expanded = !state.details_expanded;
        state.details_expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_state() -> FormState {
        let mut state = FormState::new();
        state.status = FormStatus::Ready;
        state.selection.department = "Cusco".to_string();
        state.options.departments = vec!["Cusco".to_string(), "Lima".to_string()];
        state.options.provinces = vec!["Cusco".to_string(), "Urubamba".to_string()];
        state.options.life_stages = vec!["Adolescente".to_string()];
        state
    }

    #[test]
    fn test_initial_state_is_idle_with_static_defaults() {
        let state = FormState::new();
        assert_eq!(state.status, FormStatus::Idle);
        assert_eq!(state.selection.sex, "F");
        assert_eq!(state.selection.month, "1");
    }

    #[test]
    fn test_begin_province_load_clears_and_bumps_tag() {
        let mut state = ready_state();
        state.selection.province = "Urubamba".to_string();

        let first = state.begin_province_load();
        let second = state.begin_province_load();

        assert!(second > first);
        assert!(state.selection.province.is_empty());
        assert!(state.options.provinces.is_empty());
    }

    #[test]
    fn test_validation_rules() {
        let state = ready_state();

        assert!(state.validate(FieldId::Sex, "M").is_ok());
        assert!(state.validate(FieldId::Sex, "X").is_err());
        assert!(state.validate(FieldId::Month, "12").is_ok());
        assert!(state.validate(FieldId::Month, "13").is_err());
        assert!(state.validate(FieldId::Province, "Urubamba").is_ok());
        assert!(state.validate(FieldId::Province, "Miraflores").is_err());
        assert!(state.validate(FieldId::Province, "").is_ok());
        assert!(state.validate(FieldId::LifeStage, "Adolescente").is_ok());
        assert!(state.validate(FieldId::LifeStage, "Anciano").is_err());
        // No screening types loaded: free value accepted
        assert!(state.validate(FieldId::ScreeningType, "Depresión").is_ok());
    }

    #[test]
    fn test_field_descriptors_flag_loading_province() {
        let mut state = ready_state();
        state.status = FormStatus::LoadingProvinces;

        let fields = state.fields();
        assert_eq!(fields.len(), 6);

        let province = fields.iter().find(|f| f.id == FieldId::Province).unwrap();
        assert!(province.loading);

        let department = fields.iter().find(|f| f.id == FieldId::Department).unwrap();
        assert!(!department.loading);
        assert_eq!(department.options.len(), 2);

        let month = fields.iter().find(|f| f.id == FieldId::Month).unwrap();
        assert_eq!(month.options.len(), 12);
    }
}
