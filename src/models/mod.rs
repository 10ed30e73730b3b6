// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod scan;
pub mod user;

pub use activity::{ActivityLogEntry, SystemSetting};
pub use scan::{
    Analytics, AnalysisMode, Detection, Prediction, PredictionPage, ProcessingMetadata,
    RipenessDistribution, ScanRecord,
};
pub use user::{
    LoginRequest, ProfileResponse, RefreshResponse, RegisterRequest, Role, Session, TokenPair,
    UserProfile,
};
