//! Chest X-ray classification client
//!
//! Every call goes through the resilient executor: up to 4 retries with
//! exponential backoff on transport failures, 429 and 5xx, and a 45 s bound
//! on each attempt. Retries stay invisible to callers.

use reqwest::multipart::{Form, Part};
use tmz_common::{with_retry, Error, HttpClient, RequestOptions, Result, RetryPolicy};
use tracing::info;

use crate::models::{
    ImageModelClass, ImageModelInfo, ImageModelOverview, ImageModelStatistics, ImagePrediction,
};

/// Multipart field carrying the image
const UPLOAD_FIELD: &str = "file";

/// Image-analysis backend client
#[derive(Debug, Clone)]
pub struct ImageAnalysisClient {
    http: HttpClient,
    policy: RetryPolicy,
}

impl ImageAnalysisClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self::with_policy(HttpClient::new(base_url)?, RetryPolicy::default()))
    }

    pub fn with_policy(http: HttpClient, policy: RetryPolicy) -> Self {
        Self { http, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// `POST /image/predict/explain` with the image as multipart field `file`
    pub async fn predict_image(&self, bytes: Vec<u8>, filename: &str) -> Result<ImagePrediction> {
        let mime = detect_image_mime(&bytes)?;
        let filename = if filename.trim().is_empty() {
            "upload".to_string()
        } else {
            filename.to_string()
        };

        let prediction: ImagePrediction = with_retry(&self.policy, "image prediction", || {
            // Forms are consumed by send, so each attempt builds its own.
            let part = Part::bytes(bytes.clone()).file_name(filename.clone());
            let form = part
                .mime_str(mime)
                .map(|part| Form::new().part(UPLOAD_FIELD, part));

            async move {
                let form = form.map_err(|e| Error::Internal(format!("Invalid MIME type: {}", e)))?;
                self.http
                    .request("/image/predict/explain", RequestOptions::post_multipart(form))
                    .await
            }
        })
        .await?;

        info!(
            filename = %filename,
            predicted_class = %prediction.predicted_class,
            confidence = prediction.confidence,
            "Image classified"
        );

        Ok(prediction)
    }

    /// `GET /image/model/info`
    pub async fn model_info(&self) -> Result<ImageModelInfo> {
        with_retry(&self.policy, "image model info", || {
            self.http.get("/image/model/info")
        })
        .await
    }

    /// `GET /image/model/classes`
    pub async fn model_classes(&self) -> Result<Vec<ImageModelClass>> {
        with_retry(&self.policy, "image model classes", || {
            self.http.get("/image/model/classes")
        })
        .await
    }

    /// `GET /image/model/statistics`
    pub async fn model_statistics(&self) -> Result<ImageModelStatistics> {
        with_retry(&self.policy, "image model statistics", || {
            self.http.get("/image/model/statistics")
        })
        .await
    }

    /// Info, classes and statistics fetched concurrently
    pub async fn model_overview(&self) -> Result<ImageModelOverview> {
        let (info, classes, statistics) = tokio::try_join!(
            self.model_info(),
            self.model_classes(),
            self.model_statistics()
        )?;

        Ok(ImageModelOverview {
            info,
            classes,
            statistics,
        })
    }
}

/// MIME type of an image payload, rejecting empty and non-image data
pub fn detect_image_mime(bytes: &[u8]) -> Result<&'static str> {
    if bytes.is_empty() {
        return Err(Error::InvalidInput("Image upload is empty".to_string()));
    }

    match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(kind.mime_type()),
        Some(kind) => Err(Error::InvalidInput(format!(
            "Unsupported upload type {}, expected an image",
            kind.mime_type()
        ))),
        None => Err(Error::InvalidInput(
            "Unrecognized upload format, expected an image".to_string(),
        )),
    }
}
