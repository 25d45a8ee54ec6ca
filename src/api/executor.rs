//! Request execution
//!
//! Sends one request, classifies the HTTP outcome and hands back a
//! [`ResponseEnvelope`]. There is no retry: a failed call is logged and
//! returned, and the caller decides whether to call again.

use super::backoff::{RateLimitPolicy, Sleeper};
use super::signer::Signer;
use crate::config::Settings;
use crate::types::{ApiErrorPayload, RequestBody, ResponseEnvelope};
use crate::{Error, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Issues signed GET/POST calls against the API base URL
#[derive(Debug)]
pub struct RequestExecutor<S: Sleeper> {
    base_url: String,
    user_agent: String,
    timeout: std::time::Duration,
    signer: Signer,
    http_client: RwLock<Client>,
    total_requests: AtomicU64,
    rate_limit: RateLimitPolicy,
    sleeper: Arc<S>,
}

impl<S: Sleeper> RequestExecutor<S> {
    pub fn new(settings: &Settings, sleeper: Arc<S>) -> Result<Self> {
        let user_agent = settings.api.user_agent.clone();
        let timeout = settings.network.timeout();
        let http_client = build_http_client(&user_agent, timeout, None)?;

        Ok(Self {
            base_url: settings.api.base_url.clone(),
            user_agent,
            timeout,
            signer: Signer::new(&settings.api.sig_key, &settings.api.sig_key_version),
            http_client: RwLock::new(http_client),
            total_requests: AtomicU64::new(0),
            rate_limit: RateLimitPolicy::from(&settings.rate_limit),
            sleeper,
        })
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Requests executed so far, successful or not
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Replace the connection with a fresh one: empty cookie jar, optional proxy
    pub async fn reset_connection(&self, proxy: Option<&str>) -> Result<()> {
        let client = build_http_client(&self.user_agent, self.timeout, proxy)?;
        *self.http_client.write().await = client;
        debug!("HTTP connection rebuilt (proxy: {:?})", proxy);
        Ok(())
    }

    /// Send one request. A body means POST, no body means GET.
    pub async fn execute(
        &self,
        endpoint: &str,
        body: Option<&RequestBody>,
    ) -> Result<ResponseEnvelope> {
        let client = self.http_client.read().await.clone();
        let url = format!("{}{}", self.base_url, endpoint);

        self.total_requests.fetch_add(1, Ordering::Relaxed);

        let request = match body {
            Some(RequestBody::Signed(params)) => {
                let signed = self.signer.sign(endpoint, params)?;
                client.post(&url).body(signed.body)
            }
            Some(RequestBody::Form(raw)) => client.post(&url).body(raw.clone()),
            None => client.get(&url),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request to {} failed: {}", endpoint, e);
                return Err(Error::Transport(e));
            }
        };

        let status = response.status();
        let cookies: HashMap<String, String> = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let raw_body = response.text().await.map_err(|e| {
            warn!("Reading response of {} failed: {}", endpoint, e);
            Error::Transport(e)
        })?;

        if status == StatusCode::OK {
            let json = serde_json::from_str(&raw_body).map_err(|e| {
                warn!("Response of {} is not JSON: {}", endpoint, e);
                Error::malformed(format!("{}: {}", endpoint, e))
            })?;
            debug!("{} -> 200", endpoint);
            return Ok(
                ResponseEnvelope::new(status.as_u16(), raw_body, json).with_cookies(cookies)
            );
        }

        error!("Request returns {} error!", status.as_u16());
        Err(self.classify_failure(status, &raw_body).await)
    }

    async fn classify_failure(&self, status: StatusCode, raw_body: &str) -> Error {
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(
                    "That means 'too many requests'. Going to sleep for {} minutes.",
                    self.rate_limit.cooldown.as_secs() / 60
                );
                self.sleeper.sleep(self.rate_limit.cooldown).await;
                Error::RateLimited {
                    cooldown_secs: self.rate_limit.cooldown.as_secs(),
                }
            }
            StatusCode::BAD_REQUEST => {
                let payload: ApiErrorPayload = serde_json::from_str(raw_body).unwrap_or_default();
                info!(
                    "Instagram's error message: {}",
                    payload.message.as_deref().unwrap_or("<none>")
                );
                if let Some(error_type) = &payload.error_type {
                    info!("Error type: {}", error_type);
                }
                Error::BadRequest {
                    message: payload.message,
                    error_type: payload.error_type,
                }
            }
            other => Error::Http {
                status: other.as_u16(),
                body: serde_json::from_str(raw_body).ok(),
            },
        }
    }
}

/// Build the connection: cookie jar, app headers, optional proxy.
///
/// Proxies only come from the argument, never from the process environment.
fn build_http_client(
    user_agent: &str,
    timeout: std::time::Duration,
    proxy: Option<&str>,
) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
    );
    headers.insert("cookie2", HeaderValue::from_static("$Version=1"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .cookie_store(true)
        .timeout(timeout)
        .no_proxy();

    if let Some(proxy) = proxy {
        let url = normalize_proxy(proxy);
        let proxy = reqwest::Proxy::all(&url).map_err(|e| Error::proxy(format!("{}: {}", url, e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))
}

/// `host:port` proxies get an `http://` scheme
pub fn normalize_proxy(proxy: &str) -> String {
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    }
}
