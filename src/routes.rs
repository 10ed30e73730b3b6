// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side view routes and navigation.

use crate::models::Role;

/// Views the client can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    FarmerDashboard,
    AdminDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::FarmerDashboard => "/farmer/dashboard",
            Route::AdminDashboard => "/admin/dashboard",
        }
    }

    /// Landing view for a role.
    pub fn landing(role: Role) -> Self {
        match role {
            Role::Farmer => Route::FarmerDashboard,
            Role::Admin => Route::AdminDashboard,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Performs redirects requested by the gateway and the auth service.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only records the redirect in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(route = route.path(), "Redirecting");
    }
}
