// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed wrappers over the authenticated farm endpoints.

use crate::error::{GatewayError, Result};
use crate::models::{
    ActivityLogEntry, Analytics, AnalysisMode, Prediction, PredictionPage, ProfileResponse,
    ScanRecord, SystemSetting, UserProfile,
};
use crate::services::gateway::Gateway;
use crate::services::transport::{ApiRequest, FormPart};

/// Largest image the backend accepts (10 MiB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Image formats the classifier accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// An image selected or captured for analysis.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Reject uploads the backend would refuse, before sending them.
    pub fn validate(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(GatewayError::Invalid("No image provided".to_string()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(GatewayError::Invalid(format!(
                "Image too large. Maximum size is 10MB, got {} bytes.",
                self.bytes.len()
            )));
        }
        let content_type = self.content_type.to_ascii_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
            return Err(GatewayError::Invalid(format!(
                "Invalid file format. Supported formats: {}. Got: {}",
                ALLOWED_IMAGE_TYPES.join(", "),
                self.content_type
            )));
        }
        Ok(())
    }
}

/// Farm API client.
#[derive(Clone)]
pub struct FarmApi {
    gateway: Gateway,
}

impl FarmApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    // ─── Profile ─────────────────────────────────────────────────────────────

    /// Fetch the logged-in user's profile.
    pub async fn my_profile(&self) -> Result<UserProfile> {
        let profile: ProfileResponse = self.gateway.get_json("/profiles/me/").await?;
        Ok(profile.into())
    }

    // ─── Predictions ─────────────────────────────────────────────────────────

    /// Upload an image for ripeness analysis.
    pub async fn predict(&self, upload: &ImageUpload, mode: AnalysisMode) -> Result<Prediction> {
        upload.validate()?;

        let request = ApiRequest::post(self.gateway.url("/predict/")).multipart(vec![
            FormPart::File {
                name: "image".to_string(),
                file_name: upload.file_name.clone(),
                content_type: upload.content_type.to_ascii_lowercase(),
                bytes: upload.bytes.clone(),
            },
            FormPart::Text {
                name: "mode".to_string(),
                value: mode.as_str().to_string(),
            },
        ]);

        let prediction: Prediction = self.gateway.authenticated_fetch(request).await?.json()?;
        tracing::info!(
            prediction_id = prediction.id,
            total_count = prediction.total_count,
            mode = mode.as_str(),
            "Prediction complete"
        );
        Ok(prediction)
    }

    /// Fetch one prediction by ID.
    pub async fn prediction(&self, id: u64) -> Result<Prediction> {
        self.gateway.get_json(&format!("/prediction/{}/", id)).await
    }

    /// List predictions, newest first (paginated, `page` is 1-based).
    pub async fn predictions(&self, page: u32, page_size: u32) -> Result<PredictionPage> {
        if page == 0 || page_size == 0 {
            return Err(GatewayError::Invalid(
                "page and page_size must be at least 1".to_string(),
            ));
        }
        self.gateway
            .get_json(&format!("/predictions/?page={}&page_size={}", page, page_size))
            .await
    }

    /// All scan records visible to the user.
    pub async fn scan_records(&self) -> Result<Vec<ScanRecord>> {
        self.gateway.get_json("/scan-records/").await
    }

    /// Aggregate analytics for the user.
    pub async fn analytics(&self) -> Result<Analytics> {
        self.gateway.get_json("/analytics/").await
    }

    // ─── Administration ──────────────────────────────────────────────────────

    pub async fn settings(&self) -> Result<Vec<SystemSetting>> {
        self.gateway.get_json("/settings/").await
    }

    /// Change a setting's value, checked against its declared type first.
    pub async fn update_setting(&self, setting: &SystemSetting, value: &str) -> Result<SystemSetting> {
        setting.validate_value(value).map_err(GatewayError::Invalid)?;
        self.gateway
            .patch_json(
                &format!("/settings/{}/", setting.id),
                &serde_json::json!({ "value": value }),
            )
            .await
    }

    pub async fn activity_log(&self) -> Result<Vec<ActivityLogEntry>> {
        self.gateway.get_json("/activity/").await
    }

    /// System-wide dashboard numbers (admin only).
    pub async fn dashboard_overview(&self) -> Result<serde_json::Value> {
        self.gateway.get_json("/dashboard/overview/").await
    }

    /// System-wide analytics (admin only).
    pub async fn analytics_overview(&self) -> Result<serde_json::Value> {
        self.gateway.get_json("/analytics/overview/").await
    }

    /// Backend health. Needs no session.
    pub async fn health(&self) -> Result<serde_json::Value> {
        self.gateway
            .plain_fetch(ApiRequest::get(self.gateway.url("/health/")))
            .await?
            .json()
    }
}
