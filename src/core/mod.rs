//! Core components of the `resilient-client` crate.
//!
//! This module contains the building blocks of the client:
//! - The main [`ApiClient`] and its builder.
//! - The typed failure surface ([`ErrorRecord`], [`ErrorKind`]).
//! - Request descriptors and the caching/retry/auth machinery behind them.

pub(crate) mod cache;
/// The main client (`ApiClient`), builder, and configuration.
pub mod client;
pub(crate) mod dispatch;
/// The typed error surface and response classification.
pub mod error;
pub(crate) mod interceptor;
/// Per-call request descriptors.
pub mod request;
/// The abstract token persistence trait.
pub mod token;

// convenient re-exports so most code can just `use crate::core::ApiClient`
pub use client::{ApiClient, ApiClientBuilder, CacheMode, RetryPolicy};
pub use error::{ErrorKind, ErrorRecord, classify_response};
pub use request::{RequestBody, RequestDescriptor};
pub use token::{MemoryTokenStore, TokenStore};
