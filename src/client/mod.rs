//! API client: the single chokepoint for backend calls
//!
//! Attaches the bearer credential, drives the loading indicator around every
//! request, and turns a 401 into a session-level event (credential cleared,
//! one delayed hard navigation to login) while still returning the error to
//! the caller.

pub mod cancel;
pub mod loading;
pub mod navigator;

pub use cancel::CancelHandle;
pub use loading::{InFlight, LoadingIndicator, Overlay};
pub use navigator::{LogNavigator, Navigator, RecordingNavigator};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionStore;

/// Latch ensuring concurrent 401s produce a single navigation
struct SessionExpiry {
    redirected: AtomicBool,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    delay: Duration,
}

impl SessionExpiry {
    fn trigger(self: &Arc<Self>) {
        if self.redirected.swap(true, Ordering::SeqCst) {
            tracing::debug!("Login redirect already scheduled");
            return;
        }

        let expiry = Arc::clone(self);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) if !expiry.delay.is_zero() => {
                runtime.spawn(async move {
                    tokio::time::sleep(expiry.delay).await;
                    expiry.navigator.hard_navigate(&expiry.login_path);
                });
            }
            // No runtime or no delay: navigate inline
            _ => expiry.navigator.hard_navigate(&expiry.login_path),
        }
    }
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
    loading: LoadingIndicator,
    expiry: Arc<SessionExpiry>,
    timeout: Duration,
}

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        login_path: impl Into<String>,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        // Without the trailing slash `join` would replace the last segment
        let mut base = config.api_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ClientError::InvalidBaseUrl(config.api_base_url.clone()))?;

        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                session,
                loading: LoadingIndicator::new(config.hide_delay()),
                expiry: Arc::new(SessionExpiry {
                    redirected: AtomicBool::new(false),
                    navigator,
                    login_path: login_path.into(),
                    delay: config.redirect_delay(),
                }),
                timeout: config.request_timeout(),
            }),
        })
    }

    pub fn loading(&self) -> &LoadingIndicator {
        &self.inner.loading
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// True once a 401 has scheduled the login redirect
    pub fn session_expired(&self) -> bool {
        self.inner.expiry.redirected.load(Ordering::SeqCst)
    }

    /// Re-arm the login redirect after the user has signed in again
    pub fn resume_session(&self) {
        self.inner.expiry.redirected.store(false, Ordering::SeqCst);
    }

    /// Resolve `path` against the base URL; absolute URLs are refused
    pub fn url(&self, path: &str) -> ClientResult<Url> {
        if path.contains("://") || path.starts_with("//") {
            return Err(ClientError::InvalidPath(path.to_string()));
        }
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| ClientError::InvalidPath(path.to_string()))
    }

    pub fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        Ok(self.inner.http.request(method, self.url(path)?))
    }

    pub fn get(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> ClientResult<RequestBuilder> {
        self.request(Method::DELETE, path)
    }

    pub async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        self.dispatch(request, None).await
    }

    pub async fn send_with_cancel(&self, request: RequestBuilder, cancel: &CancelHandle) -> ClientResult<Response> {
        self.dispatch(request, Some(cancel)).await
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }

    async fn dispatch(&self, request: RequestBuilder, cancel: Option<&CancelHandle>) -> ClientResult<Response> {
        let in_flight = self.inner.loading.begin();

        let request = match self.inner.session.credential() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let timeout = self.inner.timeout;
        let cancelled = async {
            match cancel {
                Some(handle) => handle.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };

        let result = tokio::select! {
            biased;
            _ = cancelled => Err(ClientError::Cancelled),
            exchanged = tokio::time::timeout(timeout, exchange(&self.inner.http, request)) => {
                exchanged.unwrap_or(Err(ClientError::Timeout(timeout)))
            }
        };

        match &result {
            Ok(response) => {
                tracing::debug!(status = %response.status(), url = %response.url(), "API call succeeded");
                in_flight.succeed();
            }
            Err(err) => {
                in_flight.fail();
                if err.is_unauthorized() {
                    self.handle_unauthorized();
                } else {
                    tracing::debug!(error = %err, "API call failed");
                }
            }
        }

        result
    }

    fn handle_unauthorized(&self) {
        tracing::warn!("Backend rejected the session, clearing credential");
        self.inner.session.clear_credential();
        self.inner.expiry.trigger();
    }
}

async fn exchange(http: &reqwest::Client, request: RequestBuilder) -> ClientResult<Response> {
    let request = request.build()?;
    tracing::debug!(method = %request.method(), url = %request.url(), "API call");

    let response = http.execute(request).await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: Option<Value> = response
        .bytes()
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok());
    let message = body
        .as_ref()
        .and_then(|b| b.get("message").or_else(|| b.get("error")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    Err(ClientError::Status { status, message, body })
}
