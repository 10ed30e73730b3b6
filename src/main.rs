// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SagiTech session check
//!
//! Logs in against the configured backend if no session is stored, then
//! asks the role guard for the dashboard named by `SAGITECH_VIEW_ROLE` and
//! fetches that dashboard's data through the authenticated gateway.

use sagitech_client::{
    config::Config,
    guard::GuardOutcome,
    models::Role,
    session::{FileStore, SessionStore},
    Client,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(api = %config.api_base_url, "Starting SagiTech session check");

    let store: Arc<dyn SessionStore> = Arc::new(FileStore::open(&config.session_file));
    tracing::info!(path = %config.session_file.display(), "Session store opened");

    let client = Client::new(&config, store);

    if client.gateway.vault().is_empty() {
        match (&config.login_email, &config.login_password) {
            (Some(email), Some(password)) => {
                client.auth.login(email, password).await?;
            }
            _ => {
                tracing::error!("No stored session and SAGITECH_EMAIL/SAGITECH_PASSWORD not set");
                return Err("not logged in".into());
            }
        }
    }

    tracing::info!(requested = %config.view_role, "Checking dashboard access");
    match client.guard.check(config.view_role) {
        GuardOutcome::Allow(user) => {
            tracing::info!(user = %user.display_name(), role = %user.role, "Session valid");
        }
        GuardOutcome::Redirect { route, notice } => {
            tracing::warn!(
                route = route.path(),
                notice = notice.as_ref().map(|n| n.message.as_str()),
                "Guard redirected"
            );
            return Err(format!("redirected to {}", route).into());
        }
    }

    let profile = client.farm.my_profile().await?;
    tracing::info!(username = %profile.username, email = %profile.email, "Profile fetched");

    match config.view_role {
        Role::Farmer => {
            let analytics = client.farm.analytics().await?;
            tracing::info!(
                total_scans = analytics.total_scans,
                total_bananas = analytics.total_bananas,
                avg_confidence = analytics.avg_confidence,
                last_scan = analytics.last_scan_date.as_deref().unwrap_or("never"),
                "Analytics fetched"
            );
        }
        Role::Admin => {
            let overview = client.farm.dashboard_overview().await?;
            tracing::info!(overview = %overview, "Dashboard overview fetched");
        }
    }

    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sagitech_client=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
