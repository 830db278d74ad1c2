//! Backend clients, form state and view-model assembly

pub mod form_controller;
pub mod image_client;
pub mod prediction_api;
pub mod theme;
pub mod view_model;

pub use form_controller::{FormController, FormSnapshot, FormStatus};
pub use image_client::ImageAnalysisClient;
pub use prediction_api::{BackendHealth, PredictionApi};
pub use theme::{Theme, ThemeStore};
