//! Public client surface + builder.
//! Internals are split into `auth` (token refresh) and `constants` (defaults).

pub(crate) mod auth;
mod constants;
mod retry;

pub use retry::{CacheMode, RetryPolicy};

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::core::cache::CacheStore;
use crate::core::dispatch::Dispatcher;
use crate::core::error::ErrorRecord;
use crate::core::interceptor::AuthInterceptor;
use crate::core::request::RequestDescriptor;
use crate::core::token::{MemoryTokenStore, TokenStore};
use auth::TokenRefresher;
use constants::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_TTL, DEFAULT_REFRESH_PATH, DEFAULT_TIMEOUT, USER_AGENT,
};

/// One configured API client instance.
///
/// All shared state (response cache, refresh coordination, token store)
/// belongs to the instance rather than to the process, so independently
/// configured clients can coexist and be tested in isolation. Cloning is
/// cheap; clones share that state.
#[derive(Clone)]
pub struct ApiClient {
    interceptor: Arc<AuthInterceptor>,
    cache: Option<Arc<CacheStore>>,
    store: Arc<dyn TokenStore>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl ApiClient {
    /// Create a new builder.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Execute a prepared descriptor and return the raw response body.
    pub async fn execute(&self, descriptor: RequestDescriptor) -> Result<String, ErrorRecord> {
        self.interceptor.execute(descriptor).await
    }

    /// Execute a prepared descriptor and decode the response as JSON.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, ErrorRecord> {
        let body = self.interceptor.execute(descriptor).await?;
        serde_json::from_str(&body)
            .map_err(|e| ErrorRecord::unknown(format!("Unexpected response format: {e}")))
    }

    /// GET with query parameters, decoded as JSON. Cacheable and retriable.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ErrorRecord> {
        let mut desc = RequestDescriptor::get(path);
        for (key, value) in query {
            desc = desc.query(key, value);
        }
        self.fetch(desc).await
    }

    /// POST a JSON body, decoded as JSON.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ErrorRecord> {
        self.fetch(RequestDescriptor::post(path).json(to_value(body)?))
            .await
    }

    /// PUT a JSON body, decoded as JSON.
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ErrorRecord> {
        self.fetch(RequestDescriptor::put(path).json(to_value(body)?))
            .await
    }

    /// PATCH a JSON body, decoded as JSON.
    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ErrorRecord> {
        self.fetch(RequestDescriptor::patch(path).json(to_value(body)?))
            .await
    }

    /// DELETE; the response body, if any, is discarded.
    pub async fn delete(&self, path: &str) -> Result<(), ErrorRecord> {
        self.interceptor
            .execute(RequestDescriptor::delete(path))
            .await
            .map(|_| ())
    }

    /// Upload a file as `multipart/form-data`: a single `file` part plus flat
    /// key/value metadata fields.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
        fields: &[(&str, &str)],
    ) -> Result<T, ErrorRecord> {
        self.fetch(RequestDescriptor::post(path).multipart(file_name, None, bytes, fields))
            .await
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Drop every cached response.
    pub async fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear().await;
        }
    }

    /// The token store backing this client.
    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }
}

fn to_value<B: Serialize>(body: &B) -> Result<serde_json::Value, ErrorRecord> {
    serde_json::to_value(body)
        .map_err(|e| ErrorRecord::unknown(format!("Could not encode request body: {e}")))
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<Url>,
    refresh_path: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    cache_ttl: Option<Duration>,
    cache_disabled: bool,
    token_store: Option<Arc<dyn TokenStore>>,
}

impl ApiClientBuilder {
    /// Override the API origin (default `http://127.0.0.1:8000`).
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Override the refresh endpoint path (default `/auth/refresh`).
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Per-attempt deadline covering send and body read. Default: 10s.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Override the retry policy. Default: 3 attempts, 1s base delay,
    /// backoff factor 2.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Override the cache TTL (default: 5 minutes).
    pub fn cache_ttl(mut self, dur: Duration) -> Self {
        self.cache_ttl = Some(dur);
        self
    }

    /// Turn response caching off entirely.
    pub fn disable_cache(mut self) -> Self {
        self.cache_disabled = true;
        self
    }

    /// Provide the token persistence (default: in-process memory store).
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn build(self) -> Result<ApiClient, ErrorRecord> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| ErrorRecord::unknown(format!("Invalid base URL: {e}")))?,
        };
        let refresh_path = self
            .refresh_path
            .unwrap_or_else(|| DEFAULT_REFRESH_PATH.to_string());
        let refresh_url = base_url
            .join(&refresh_path)
            .map_err(|e| ErrorRecord::unknown(format!("Invalid refresh path: {e}")))?;
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let mut httpb =
            reqwest::Client::builder().user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }
        let http = httpb
            .build()
            .map_err(|e| ErrorRecord::unknown(format!("Could not build HTTP client: {e}")))?;

        let cache = (!self.cache_disabled).then(|| {
            Arc::new(CacheStore::new(
                self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL),
            ))
        });
        let store: Arc<dyn TokenStore> = self
            .token_store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));

        let dispatcher = Dispatcher::new(
            http.clone(),
            base_url,
            timeout,
            self.retry.unwrap_or_default(),
            cache.clone(),
        );
        let refresher = TokenRefresher::new(http, refresh_url, timeout, Arc::clone(&store));
        let interceptor = AuthInterceptor::new(dispatcher, refresher, Arc::clone(&store), refresh_path);

        Ok(ApiClient {
            interceptor: Arc::new(interceptor),
            cache,
            store,
        })
    }
}
