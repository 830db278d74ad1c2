//! # Tamizajes Common Library
//!
//! Shared code for every client of the tamizajes prediction backend:
//! - Error taxonomy (transport, API status, malformed payloads)
//! - Configuration resolution (CLI → ENV → TOML → compiled default)
//! - JSON HTTP client wrapper bound to a configurable base URL
//! - Bounded exponential-backoff retry executor

pub mod config;
pub mod error;
pub mod http;
pub mod retry;

pub use error::{Error, Result};
pub use http::{HttpClient, RequestBody, RequestOptions};
pub use retry::{with_retry, RetryPolicy};
