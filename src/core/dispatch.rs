//! Single-request execution: cache consult, per-attempt timeout, bounded
//! retry with geometric backoff.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart;
use url::Url;

use crate::core::cache::CacheStore;
use crate::core::client::{CacheMode, RetryPolicy};
use crate::core::error::Failure;
use crate::core::request::{RequestBody, RequestDescriptor};

pub(crate) struct Dispatcher {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    policy: RetryPolicy,
    cache: Option<Arc<CacheStore>>,
}

impl Dispatcher {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: Url,
        timeout: Duration,
        policy: RetryPolicy,
        cache: Option<Arc<CacheStore>>,
    ) -> Self {
        Self {
            http,
            base_url,
            timeout,
            policy,
            cache,
        }
    }

    /// Execute one logical request and return the raw response body.
    ///
    /// A fresh cache entry short-circuits everything: no network call and no
    /// retry accounting. 401 responses are never retried here; only the
    /// interceptor above knows how to renew credentials.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(method = %desc.method, path = %desc.path))
    )]
    pub(crate) async fn execute(&self, desc: &RequestDescriptor) -> Result<String, Failure> {
        let url = self.resolve(desc)?;
        let fingerprint = format!("{} {}", desc.method, url);

        if desc.idempotent
            && desc.cache_mode == CacheMode::Use
            && let Some(cache) = &self.cache
            && let Some(body) = cache.get(&fingerprint).await
        {
            return Ok(body);
        }

        let mut attempt = 1u32;
        loop {
            match self.attempt(desc, &url).await {
                Ok(body) => {
                    if desc.idempotent
                        && desc.cache_mode != CacheMode::Bypass
                        && let Some(cache) = &self.cache
                    {
                        cache.put(&fingerprint, &body, None).await;
                    }
                    return Ok(body);
                }
                Err(failure) => {
                    if !failure.is_retriable() || attempt >= self.policy.max_attempts.max(1) {
                        return Err(failure);
                    }
                    let delay = self.policy.delay_for(attempt);
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, %failure, "retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Resolve the absolute URL for a descriptor, query applied.
    fn resolve(&self, desc: &RequestDescriptor) -> Result<Url, Failure> {
        let mut url = self.base_url.join(&desc.path)?;
        if !desc.query.is_empty() {
            let mut qp = url.query_pairs_mut();
            for (key, value) in &desc.query {
                qp.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// One network attempt under the per-attempt deadline. The deadline
    /// covers both the send and the body read; when it fires, dropping the
    /// in-flight future cancels the underlying call.
    async fn attempt(&self, desc: &RequestDescriptor, url: &Url) -> Result<String, Failure> {
        let mut req = self.http.request(desc.method.clone(), url.clone());
        for (name, value) in &desc.headers {
            req = req.header(name, value);
        }
        match &desc.body {
            Some(RequestBody::Json(value)) => req = req.json(value),
            Some(RequestBody::Multipart {
                file_name,
                content_type,
                bytes,
                fields,
            }) => {
                req = req.multipart(build_form(file_name, content_type.as_deref(), bytes, fields)?);
            }
            None => {}
        }

        let io = async {
            let resp = req.send().await?;
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = match tokio::time::timeout(self.timeout, io).await {
            Err(_) => return Err(Failure::Timeout),
            Ok(Err(e)) if e.is_timeout() => return Err(Failure::Timeout),
            Ok(Err(e)) => return Err(Failure::Transport(e)),
            Ok(Ok(pair)) => pair,
        };

        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(Failure::Status { status, body })
        }
    }
}

/// Multipart forms are single-use; rebuild one for every attempt.
fn build_form(
    file_name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
    fields: &[(String, String)],
) -> Result<multipart::Form, Failure> {
    let mut part = multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
    if let Some(ct) = content_type {
        part = part.mime_str(ct)?;
    }
    let mut form = multipart::Form::new().part("file", part);
    for (key, value) in fields {
        form = form.text(key.clone(), value.clone());
    }
    Ok(form)
}
