//! Single-flight bearer-token renewal.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

use crate::core::token::TokenStore;

/// Failure of a refresh attempt. `Clone`, so every awaiter of a shared
/// in-flight refresh receives the same outcome.
#[derive(Clone, Debug, Error)]
#[error("token refresh failed: {0}")]
pub(crate) struct RefreshError(pub(crate) String);

#[derive(Deserialize)]
struct TokenEnvelope {
    #[serde(alias = "accessToken", alias = "token")]
    access_token: String,
}

type RefreshFuture = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

struct RefresherInner {
    http: reqwest::Client,
    refresh_url: Url,
    timeout: Duration,
    store: Arc<dyn TokenStore>,
    /// The in-flight refresh, if any. Filled when a refresh starts, emptied
    /// inside the shared future when it settles.
    in_flight: Mutex<Option<RefreshFuture>>,
}

pub(crate) struct TokenRefresher {
    inner: Arc<RefresherInner>,
}

impl TokenRefresher {
    pub(crate) fn new(
        http: reqwest::Client,
        refresh_url: Url,
        timeout: Duration,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            inner: Arc::new(RefresherInner {
                http,
                refresh_url,
                timeout,
                store,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Renew the token, sharing one underlying call among concurrent callers.
    ///
    /// Whoever finds the slot empty starts the refresh; everyone else clones
    /// and awaits the same future, so all observe one outcome. On success the
    /// new token is persisted; on failure the stored token is cleared. Either
    /// way the slot is emptied at settlement so a later 401 can trigger a
    /// fresh attempt.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub(crate) async fn refresh(&self) -> Result<String, RefreshError> {
        let fut = {
            let mut slot = self.inner.in_flight.lock().await;
            if let Some(in_flight) = slot.as_ref() {
                in_flight.clone()
            } else {
                let inner = Arc::clone(&self.inner);
                let started = async move {
                    let outcome = inner.call_refresh_endpoint().await;
                    inner.in_flight.lock().await.take();
                    match &outcome {
                        Ok(token) => inner.store.set(token),
                        Err(_) => inner.store.clear(),
                    }
                    outcome
                }
                .boxed()
                .shared();
                *slot = Some(started.clone());
                // Drive the refresh to completion even if every awaiter is
                // dropped mid-flight.
                tokio::spawn(started.clone());
                started
            }
        };
        fut.await
    }
}

impl RefresherInner {
    /// Minimal transport call, deliberately not routed through the
    /// dispatcher so a failing refresh can never recurse into another one.
    async fn call_refresh_endpoint(&self) -> Result<String, RefreshError> {
        let io = async {
            let resp = self.http.post(self.refresh_url.clone()).send().await?;
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = match tokio::time::timeout(self.timeout, io).await {
            Err(_) => return Err(RefreshError("refresh request timed out".to_string())),
            Ok(Err(e)) => return Err(RefreshError(format!("refresh transport error: {e}"))),
            Ok(Ok(pair)) => pair,
        };
        if !(200..300).contains(&status) {
            return Err(RefreshError(format!(
                "refresh endpoint returned status {status}"
            )));
        }
        let envelope: TokenEnvelope = serde_json::from_str(&body)
            .map_err(|e| RefreshError(format!("invalid refresh response: {e}")))?;
        Ok(envelope.access_token)
    }
}
