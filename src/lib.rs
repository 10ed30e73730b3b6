// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! SagiTech client: authenticated access to the SagiTech farm backend
//!
//! This crate provides the request gateway, session storage, and role guard
//! used by the farmer and admin front ends, plus typed wrappers over the
//! ripeness-analysis endpoints.

pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

use config::Config;
use services::{AuthService, FarmApi, Gateway, ReqwestTransport};
use session::SharedStore;
use std::sync::Arc;

/// Everything a front end needs, wired to one session store.
#[derive(Clone)]
pub struct Client {
    pub gateway: Gateway,
    pub auth: AuthService,
    pub farm: FarmApi,
    pub guard: guard::SessionGuard,
}

impl Client {
    /// Build a client over the `reqwest` transport.
    pub fn new(config: &Config, store: SharedStore) -> Self {
        Self::from_gateway(Gateway::new(config, Arc::new(ReqwestTransport::new()), store))
    }

    pub fn from_gateway(gateway: Gateway) -> Self {
        Self {
            auth: AuthService::new(gateway.clone()),
            farm: FarmApi::new(gateway.clone()),
            guard: guard::SessionGuard::new(gateway.vault().clone()),
            gateway,
        }
    }
}
