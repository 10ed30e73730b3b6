// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend access layer.

pub mod auth;
pub mod farm;
pub mod gateway;
pub mod transport;

pub use auth::AuthService;
pub use farm::{FarmApi, ImageUpload};
pub use gateway::{Gateway, RetryPolicy};
pub use transport::{ApiRequest, ApiResponse, FormPart, ReqwestTransport, Transport, TransportError};
