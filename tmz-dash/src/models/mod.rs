//! Domain models exchanged with the prediction backend and the view

pub mod filters;
pub mod image;
pub mod insights;
pub mod prediction;

pub use filters::{FieldDescriptor, FieldId, FilterSelection, SelectOption, NO_SELECTION_LABEL};
pub use image::{
    ClassMetrics, ClinicalExplanation, ImageMetadata, ImageModelClass, ImageModelInfo,
    ImageModelOverview, ImageModelStatistics, ImagePrediction,
};
pub use insights::{
    DepartmentHeatmap, DescriptiveStats, DistributionStats, ExploratoryStatistics,
    FeatureImportance, ModelInfo, ModelOverview, ScreeningTypeHeatmap, ScreeningTypesSummary,
};
pub use prediction::{
    BatchPrediction, DisplayAttribute, PredictionExplanation, PredictionRequest,
    PredictionResponseRaw, PredictionResult, Sex,
};
