//! Centralized constants for client defaults.

use std::time::Duration;

/// Default UA identifying the client and its version.
pub(crate) const USER_AGENT: &str = concat!("resilient-client/", env!("CARGO_PKG_VERSION"));

/// Default API origin (a local development server).
pub(crate) const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Path of the token refresh endpoint, relative to the base URL.
pub(crate) const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// Per-attempt deadline covering both the send and the body read.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a cached response stays fresh unless overridden.
pub(crate) const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
