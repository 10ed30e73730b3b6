// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session guard for protected views.
//!
//! Reads the persisted session only; it never touches the network. Every
//! protected view runs [`SessionGuard::check`] once when it mounts.

use crate::models::{Role, UserProfile};
use crate::routes::Route;
use crate::session::SessionVault;

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Result of guarding a view.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// Session is usable and the role matches.
    Allow(UserProfile),
    /// The view must not render; go to `route` instead.
    Redirect {
        route: Route,
        notice: Option<Notice>,
    },
}

/// Role gate over the persisted session.
#[derive(Clone)]
pub struct SessionGuard {
    vault: SessionVault,
}

impl SessionGuard {
    pub fn new(vault: SessionVault) -> Self {
        Self { vault }
    }

    /// Decide whether a view requiring `required` may render.
    pub fn check(&self, required: Role) -> GuardOutcome {
        let user = match self.vault.user() {
            Ok(Some(user)) => user,
            Ok(None) => return Self::to_login(None),
            Err(e) => {
                tracing::warn!(error = %e, "Stored user profile is corrupted, clearing session");
                if let Err(e) = self.vault.clear() {
                    tracing::error!(error = %e, "Failed to clear session");
                }
                return Self::to_login(Some(Notice::error(
                    "Your session data was corrupted. Please log in again.",
                )));
            }
        };

        if self.vault.access_token().is_none() {
            // User without a token is a partial session; drop the rest too.
            tracing::warn!(user_id = user.id, "Stored session has no access token, clearing");
            if let Err(e) = self.vault.clear() {
                tracing::error!(error = %e, "Failed to clear session");
            }
            return Self::to_login(None);
        }

        if user.role != required {
            tracing::debug!(
                user_id = user.id,
                role = %user.role,
                required = %required,
                "Role mismatch, redirecting to own dashboard"
            );
            return GuardOutcome::Redirect {
                route: Route::landing(user.role),
                notice: Some(Notice::info(format!(
                    "This page is for {} accounts. Taking you to your dashboard.",
                    required
                ))),
            };
        }

        GuardOutcome::Allow(user)
    }

    fn to_login(notice: Option<Notice>) -> GuardOutcome {
        GuardOutcome::Redirect {
            route: Route::Login,
            notice,
        }
    }
}
