//! resilient-client: a resilient HTTP API client.
//!
//! Wraps `reqwest` with the coordination layer our front ends share:
//! - response caching for idempotent reads with lazy TTL expiry,
//! - bounded retry with geometric backoff for transient failures,
//! - a per-attempt timeout that cancels the in-flight call,
//! - transparent single-flight bearer-token refresh on 401,
//! - a typed error taxonomy with per-field validation messages.
//!
//! ```no_run
//! use resilient_client::ApiClient;
//!
//! # async fn run() -> Result<(), resilient_client::ErrorRecord> {
//! let client = ApiClient::builder()
//!     .base_url(url::Url::parse("https://api.example.com").unwrap())
//!     .build()?;
//!
//! let items: serde_json::Value = client.get("/api/v1/items", &[("page", "1")]).await?;
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use crate::core::client::{ApiClient, ApiClientBuilder, CacheMode, RetryPolicy};
pub use crate::core::error::{ErrorKind, ErrorRecord, classify_response};
pub use crate::core::request::{RequestBody, RequestDescriptor};
pub use crate::core::token::{MemoryTokenStore, TokenStore};
