// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, registration, and logout.
//!
//! These calls run before a session exists, so they use the gateway's
//! plain (unauthenticated) path.

use crate::error::{GatewayError, Result};
use crate::models::{
    LoginRequest, ProfileResponse, RegisterRequest, Role, Session, TokenPair, UserProfile,
};
use crate::routes::Route;
use crate::services::gateway::Gateway;
use crate::services::transport::ApiRequest;
use validator::Validate;

const LOGIN_PATH: &str = "/token/";
const REGISTER_PATH: &str = "/register/";
const PROFILE_PATH: &str = "/profiles/me/";

/// Session lifecycle operations.
#[derive(Clone)]
pub struct AuthService {
    gateway: Gateway,
}

impl AuthService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Log in and persist a new session.
    ///
    /// The token pair and profile are only written once both were fetched,
    /// and they are written together.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let credentials = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        credentials.validate().map_err(validation_error)?;

        let request = ApiRequest::post(self.gateway.url(LOGIN_PATH)).json(&credentials)?;
        let tokens: TokenPair = self.gateway.plain_fetch(request).await?.json()?;
        if tokens.access.is_empty() || tokens.refresh.is_empty() {
            return Err(GatewayError::Decode("login returned an empty token".to_string()));
        }

        let request = ApiRequest::get(self.gateway.url(PROFILE_PATH))
            .header("Authorization", &format!("Bearer {}", tokens.access))?;
        let profile: ProfileResponse = self.gateway.plain_fetch(request).await?.json()?;
        let user = UserProfile::from(profile);

        let session = Session {
            access_token: tokens.access,
            refresh_token: tokens.refresh,
            user,
        };
        self.gateway.vault().save(&session)?;

        tracing::info!(
            user_id = session.user.id,
            role = %session.user.role,
            "Logged in"
        );
        Ok(session)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, registration: &RegisterRequest) -> Result<()> {
        registration.validate().map_err(validation_error)?;

        let request = ApiRequest::post(self.gateway.url(REGISTER_PATH)).json(registration)?;
        self.gateway.plain_fetch(request).await?;

        tracing::info!(
            username = %registration.username,
            role = %registration.role,
            "Account registered"
        );
        Ok(())
    }

    /// Drop the session and go to login.
    pub fn logout(&self) {
        self.gateway.end_session();
        tracing::info!("Logged out");
    }

    /// Dashboard a role lands on after login.
    pub fn landing_route(role: Role) -> Route {
        Route::landing(role)
    }
}

/// Flatten validator errors into one readable message.
fn validation_error(errors: validator::ValidationErrors) -> GatewayError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    GatewayError::Invalid(messages.join("; "))
}
