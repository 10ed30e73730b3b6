//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use crate::models::Role;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL including the `/api` prefix
    pub api_base_url: String,
    /// Where the file-backed session store lives
    pub session_file: PathBuf,
    /// Total send attempts on transport failure
    pub retry_max_attempts: u32,
    /// First backoff delay; doubled per further attempt
    pub retry_base_delay: Duration,
    /// Dashboard the session-check binary asks the guard for
    pub view_role: Role,

    // --- Credentials (optional, used by the session-check binary) ---
    pub login_email: Option<String>,
    pub login_password: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            session_file: PathBuf::from(".sagitech_session.json"),
            retry_max_attempts: 3,
            retry_base_delay: Duration::from_millis(500),
            view_role: Role::Farmer,
            login_email: None,
            login_password: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let api_base_url = env::var("SAGITECH_API_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: "SAGITECH_API_URL",
                value: api_base_url,
            });
        }

        let retry_max_attempts = match env::var("SAGITECH_RETRY_ATTEMPTS") {
            Ok(v) => match v.trim().parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SAGITECH_RETRY_ATTEMPTS",
                        value: v,
                    })
                }
            },
            Err(_) => defaults.retry_max_attempts,
        };

        let retry_base_delay = match env::var("SAGITECH_RETRY_BASE_DELAY_MS") {
            Ok(v) => Duration::from_millis(v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "SAGITECH_RETRY_BASE_DELAY_MS",
                value: v.clone(),
            })?),
            Err(_) => defaults.retry_base_delay,
        };

        let view_role = match env::var("SAGITECH_VIEW_ROLE") {
            Ok(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: "SAGITECH_VIEW_ROLE",
                value: v.clone(),
            })?,
            Err(_) => defaults.view_role,
        };

        Ok(Self {
            api_base_url,
            session_file: env::var("SAGITECH_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            retry_max_attempts,
            retry_base_delay,
            view_role,
            login_email: env::var("SAGITECH_EMAIL").ok().map(|v| v.trim().to_string()),
            login_password: env::var("SAGITECH_PASSWORD").ok(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
