//! JSON HTTP client wrapper
//!
//! Thin layer over `reqwest` bound to a configurable base URL. Every call
//! resolves a relative path against the base, sends JSON (or multipart when
//! asked to) and decodes the JSON response. Non-success statuses become
//! [`Error::Api`] carrying the raw body text; requests that never produced a
//! response become [`Error::Transport`].
//!
//! No timeout is configured here. Callers that need one wrap the call with
//! the retry executor, which bounds every attempt.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Result};

const USER_AGENT: &str = concat!("tamizajes-dashboard/", env!("CARGO_PKG_VERSION"));
const JSON_MIME: &str = "application/json";

/// Request payload
#[derive(Debug)]
pub enum RequestBody {
    /// Serialized JSON document
    Json(serde_json::Value),
    /// Multipart form (content type with boundary is set by reqwest)
    Multipart(Form),
}

/// Per-request options
#[derive(Debug)]
pub struct RequestOptions {
    /// HTTP method (GET when defaulted)
    pub method: Method,
    /// Optional body
    pub body: Option<RequestBody>,
    /// Content type override for JSON and empty bodies; JSON is used when
    /// `None`. Multipart bodies always carry reqwest's boundary header.
    pub content_type: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            content_type: None,
        }
    }
}

impl RequestOptions {
    /// POST with a JSON body
    pub fn post_json<B: Serialize + ?Sized>(body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::InvalidInput(format!("Unserializable request body: {}", e)))?;

        Ok(Self {
            method: Method::POST,
            body: Some(RequestBody::Json(value)),
            content_type: None,
        })
    }

    /// POST with a multipart form
    pub fn post_multipart(form: Form) -> Self {
        Self {
            method: Method::POST,
            body: Some(RequestBody::Multipart(form)),
            content_type: None,
        }
    }
}

/// HTTP client bound to a base URL
#[derive(Debug, Clone)]
pub struct HttpClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:8000`)
    pub fn new(base_url: &str) -> Result<Self> {
        let base = parse_base_url(base_url)?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a relative path (with optional query string) against the base
    pub fn url(&self, path: &str) -> Result<Url> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };

        Url::parse(&joined).map_err(|e| Error::InvalidInput(format!("Invalid path '{}': {}", path, e)))
    }

    /// Issue a request and decode the JSON response into `T`
    pub async fn request<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T> {
        let url = self.url(path)?;

        tracing::debug!(method = %options.method, url = %url, "Sending backend request");

        let mut builder = self
            .http_client
            .request(options.method.clone(), url.clone())
            .header(ACCEPT, JSON_MIME);

        builder = match options.body {
            Some(RequestBody::Multipart(form)) => builder.multipart(form),
            Some(RequestBody::Json(value)) => builder
                .header(
                    CONTENT_TYPE,
                    options.content_type.as_deref().unwrap_or(JSON_MIME),
                )
                .body(value.to_string()),
            None => builder.header(
                CONTENT_TYPE,
                options.content_type.as_deref().unwrap_or(JSON_MIME),
            ),
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::debug!(
                url = %url,
                status = status.as_u16(),
                "Backend returned error status"
            );
            return Err(Error::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        decode_body(&bytes)
    }

    /// GET `path` and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(path, RequestOptions::default()).await
    }

    /// POST a JSON body to `path` and decode the JSON response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(path, RequestOptions::post_json(body)?).await
    }
}

/// Validate a base URL: absolute, http or https, with a host
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "Base URL '{}' must use http or https",
            raw
        )));
    }

    if url.host_str().is_none() {
        return Err(Error::Config(format!("Base URL '{}' has no host", raw)));
    }

    Ok(url)
}

/// Build a path from raw segments, percent-encoding each one.
///
/// `encode_path(&["metadata", "provincias", "San Martín"])` yields
/// `/metadata/provincias/San%20Mart%C3%ADn`.
pub fn encode_path(segments: &[&str]) -> String {
    // Any absolute base works; only the encoded path is kept.
    let mut url = match Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return String::from("/"),
    };

    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }

    url.path().to_string()
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Transport(format!("Request timed out: {}", err))
    } else {
        Error::Transport(err.to_string())
    }
}

fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_value(serde_json::Value::Null)
            .map_err(|e| Error::MalformedResponse(format!("Empty response body: {}", e)));
    }

    serde_json::from_slice(bytes).map_err(|e| Error::MalformedResponse(e.to_string()))
}
