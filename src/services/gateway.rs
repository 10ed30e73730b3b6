// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated request gateway.
//!
//! Every call to the backend goes through [`Gateway`]. It:
//! - Attaches the stored access token as a bearer header
//! - Refreshes the access token once when the backend answers 401
//! - Retries transport failures with exponential backoff
//! - Tears down the session and redirects to login when refresh fails
//!
//! Each logical call runs a small bounded state machine, so a backend that
//! always answers 401 costs at most two sends and one refresh.

use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::models::RefreshResponse;
use crate::routes::{LogNavigator, Navigator, Route};
use crate::services::transport::{ApiRequest, ApiResponse, Transport};
use crate::session::{SessionVault, SharedStore};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Token refresh endpoint, relative to the API base.
pub const REFRESH_PATH: &str = "/token/refresh/";

/// Bounded exponential backoff for transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total send attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.retry_max_attempts.max(1),
            base_delay: config.retry_base_delay,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// Where a logical call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Send { retried: bool },
    Refresh,
}

/// Gateway to the SagiTech backend.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn Transport>,
    vault: SessionVault,
    navigator: Arc<dyn Navigator>,
    base_url: String,
    retry: RetryPolicy,
}

impl Gateway {
    pub fn new(config: &Config, transport: Arc<dyn Transport>, store: SharedStore) -> Self {
        Self {
            transport,
            vault: SessionVault::new(store),
            navigator: Arc::new(LogNavigator),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from_config(config),
        }
    }

    /// Replace the navigator used for forced redirects.
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn vault(&self) -> &SessionVault {
        &self.vault
    }

    /// Resolve a path against the API base. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ─── Core Protocol ───────────────────────────────────────────────────────

    /// Send `request` with the current credentials.
    ///
    /// A 401 on the first send triggers one refresh and one retry with the
    /// new token. A 401 on the retry, or any other non-success status, is
    /// returned as [`GatewayError::Rejected`]. When refresh fails the
    /// session is cleared, the navigator is sent to login, and the call
    /// fails with a session error.
    pub async fn authenticated_fetch(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut state = CallState::Send { retried: false };

        loop {
            state = match state {
                CallState::Send { retried } => {
                    let authorized = match self.authorize(&request) {
                        Ok(r) => r,
                        Err(e) => {
                            self.clear_session();
                            self.navigator.navigate(Route::Login);
                            return Err(e);
                        }
                    };

                    let response = self.send_with_backoff(&authorized).await?;

                    if response.is_success() {
                        return Ok(response);
                    }

                    if response.status == StatusCode::UNAUTHORIZED && !retried {
                        tracing::info!(url = %request.url, "Access token rejected, refreshing");
                        CallState::Refresh
                    } else {
                        let err = GatewayError::rejected(response.status, &response.body);
                        tracing::debug!(
                            url = %request.url,
                            status = response.status.as_u16(),
                            retried,
                            error = %err,
                            "Request rejected"
                        );
                        return Err(err);
                    }
                }
                CallState::Refresh => match self.refresh_access_token().await {
                    Ok(()) => CallState::Send { retried: true },
                    Err(e) => {
                        self.navigator.navigate(Route::Login);
                        return Err(e);
                    }
                },
            };
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// On success only the access token is rewritten. On any failure the
    /// whole session is cleared.
    pub async fn refresh_access_token(&self) -> Result<()> {
        let refresh_token = match self.vault.refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!("No refresh token stored, ending session");
                self.clear_session();
                return Err(GatewayError::SessionExpired);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored token pair is malformed, ending session");
                self.clear_session();
                return Err(GatewayError::CorruptedSession(format!("token pair: {}", e)));
            }
        };

        let access_token = match self.request_access_token(&refresh_token).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, ending session");
                self.clear_session();
                return Err(GatewayError::SessionExpired);
            }
        };

        if let Err(e) = self.vault.replace_access_token(&access_token) {
            tracing::error!(error = %e, "Failed to store refreshed token, ending session");
            self.clear_session();
            return Err(GatewayError::SessionExpired);
        }

        tracing::info!("Access token refreshed");
        Ok(())
    }

    /// Send without credentials or refresh handling (login, register).
    pub async fn plain_fetch(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self.send_with_backoff(&request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(GatewayError::rejected(response.status, &response.body))
        }
    }

    /// Clear the session and redirect to login.
    pub fn end_session(&self) {
        self.clear_session();
        self.navigator.navigate(Route::Login);
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    fn authorize(&self, request: &ApiRequest) -> Result<ApiRequest> {
        let mut request = request.clone();
        if let Some(token) = self.vault.access_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                GatewayError::CorruptedSession("access token is not a valid header value".into())
            })?;
            request.headers.insert(AUTHORIZATION, value);
        }
        Ok(request)
    }

    async fn request_access_token(&self, refresh_token: &str) -> Result<String> {
        let request = ApiRequest::post(self.url(REFRESH_PATH))
            .json(&serde_json::json!({ "refresh": refresh_token }))?;

        let response = self.transport.send(&request).await?;
        if !response.is_success() {
            return Err(GatewayError::rejected(response.status, &response.body));
        }

        let body: RefreshResponse = response.json()?;
        if body.access.is_empty() {
            return Err(GatewayError::Decode("empty access token".to_string()));
        }
        Ok(body.access)
    }

    async fn send_with_backoff(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut attempt = 1;
        loop {
            tracing::debug!(method = %request.method, url = %request.url, attempt, "Sending request");

            match self.transport.send(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    tracing::warn!(
                        url = %request.url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transport error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(url = %request.url, attempt, error = %e, "Transport error, giving up");
                    return Err(e.into());
                }
            }
        }
    }

    fn clear_session(&self) {
        if let Err(e) = self.vault.clear() {
            tracing::error!(error = %e, "Failed to clear session");
        }
    }

    // ─── JSON Convenience ────────────────────────────────────────────────────

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.authenticated_fetch(ApiRequest::get(self.url(path)))
            .await?
            .json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::post(self.url(path)).json(body)?;
        self.authenticated_fetch(request).await?.json()
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::put(self.url(path)).json(body)?;
        self.authenticated_fetch(request).await?.json()
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::patch(self.url(path)).json(body)?;
        self.authenticated_fetch(request).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.authenticated_fetch(ApiRequest::delete(self.url(path)))
            .await?;
        Ok(())
    }
}
