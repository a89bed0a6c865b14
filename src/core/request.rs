//! Per-call request description.

use reqwest::Method;

use crate::core::client::CacheMode;

/// Body attached to a mutating request.
#[derive(Clone, Debug)]
pub enum RequestBody {
    /// JSON-encoded payload.
    Json(serde_json::Value),
    /// Multipart form: a single `file` part plus flat key/value metadata
    /// fields. Kept as raw parts so the form can be rebuilt per attempt.
    Multipart {
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
        fields: Vec<(String, String)>,
    },
}

/// One logical call through the client.
///
/// A descriptor is built once per call and stays put while the dispatcher
/// retries it. Only `retried_auth` ever changes after construction: it flips
/// exactly once when the interceptor resubmits after a token refresh, which
/// is what caps the unauthorized-refresh-retry cycle at one round.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
    pub(crate) idempotent: bool,
    pub(crate) cache_mode: CacheMode,
    pub(crate) retried_auth: bool,
}

impl RequestDescriptor {
    fn new(method: Method, path: &str, idempotent: bool) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            idempotent,
            cache_mode: CacheMode::Use,
            retried_auth: false,
        }
    }

    /// A cacheable, retriable read.
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path, true)
    }

    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path, false)
    }

    pub fn put(path: &str) -> Self {
        Self::new(Method::PUT, path, false)
    }

    pub fn patch(path: &str) -> Self {
        Self::new(Method::PATCH, path, false)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path, false)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Set an extra header. Header names are normalized to lowercase.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a multipart body: one `file` part plus flat metadata fields.
    pub fn multipart(
        mut self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
        fields: &[(&str, &str)],
    ) -> Self {
        self.body = Some(RequestBody::Multipart {
            file_name: file_name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self
    }

    /// Mark a non-GET request as a cacheable read, or opt a read out of
    /// caching and retry-safety.
    pub fn idempotent(mut self, idempotent: bool) -> Self {
        self.idempotent = idempotent;
        self
    }

    /// Choose how the cache participates in this call.
    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    pub(crate) fn set_authorization(&mut self, token: &str) {
        self.clear_authorization();
        self.headers
            .push(("authorization".to_string(), format!("Bearer {token}")));
    }

    pub(crate) fn clear_authorization(&mut self) {
        self.headers.retain(|(name, _)| name != "authorization");
    }
}
