// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gateway error types with human-readable messages.

use crate::services::transport::TransportError;
use crate::session::StoreError;
use reqwest::StatusCode;
use serde_json::Value;

/// Error returned by every gateway-backed call.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Refresh failed or no refresh token was stored. The session is gone.
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,

    /// Persisted session data could not be parsed. The session is gone.
    #[error("Session data is corrupted: {0}")]
    CorruptedSession(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] TransportError),

    /// A success response whose body did not match the expected shape.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    /// Client-side validation failed before any request was sent.
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    /// True when the gateway has already torn down the session and
    /// redirected to login. Callers should only show the message.
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::CorruptedSession(_))
    }

    /// HTTP status for rejected requests.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build a rejection from a non-success response.
    pub fn rejected(status: StatusCode, body: &[u8]) -> Self {
        Self::Rejected {
            status: status.as_u16(),
            message: extract_error_message(status, body),
        }
    }
}

/// Pick the most useful message out of an error response.
///
/// Structured fields win (`detail`, `error`, `message`, `non_field_errors`),
/// then the first message under any per-field validation key, then the
/// status reason phrase, then the raw body. Field keys are visited in
/// sorted order.
pub fn extract_error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        if let Some(detail) = map.get("detail").and_then(first_text) {
            return detail;
        }
        if let Some(error) = map.get("error").and_then(first_text) {
            // Backend pairs a short `error` with a longer `details`.
            return match map.get("details").and_then(first_text) {
                Some(details) => format!("{}: {}", error, details),
                None => error,
            };
        }
        if let Some(message) = map.get("message").and_then(first_text) {
            return message;
        }
        if let Some(message) = map.get("non_field_errors").and_then(first_text) {
            return message;
        }
        // DRF field errors: {"email": ["A user with this email already exists."]}
        if let Some(message) = map.values().find_map(first_text) {
            return message;
        }
    }

    if let Some(reason) = status.canonical_reason() {
        return reason.to_string();
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    format!("HTTP {}", status.as_u16())
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}

/// Result type alias for gateway calls
pub type Result<T> = std::result::Result<T, GatewayError>;
