//! HTTP API handlers for tmz-dash

pub mod error;
pub mod form;
pub mod health;
pub mod image;
pub mod insights;
pub mod predict;
pub mod theme;

pub use error::{ApiError, ApiResult};
pub use form::{get_form, reload_form, update_field};
pub use health::{get_build_info, health_routes};
pub use image::{analyze_image, image_model};
pub use insights::{model_overview, statistics};
pub use predict::{predict_batch, submit_prediction, toggle_details};
pub use theme::{get_theme, put_theme, toggle_theme};
