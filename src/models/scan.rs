// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Ripeness scan, prediction, and analytics models.

use serde::{Deserialize, Serialize};

/// Detection speed/recall trade-off requested for a prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Fast,
    #[default]
    Standard,
    HighRecall,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Fast => "fast",
            AnalysisMode::Standard => "standard",
            AnalysisMode::HighRecall => "high_recall",
        }
    }
}

/// Count of detections per ripeness stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RipenessDistribution {
    pub not_mature: u32,
    pub mature: u32,
    pub ripe: u32,
    pub over_ripe: u32,
}

impl RipenessDistribution {
    pub fn total(&self) -> u32 {
        self.not_mature + self.mature + self.ripe + self.over_ripe
    }
}

/// A single detected banana.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub ripeness: String,
    pub confidence: f64,
    #[serde(default)]
    pub bbox: Vec<f64>,
    #[serde(default)]
    pub centroid: Vec<f64>,
    #[serde(default)]
    pub area: f64,
    pub quality_score: Option<f64>,
}

/// Model settings reported with a prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingMetadata {
    pub model_version: String,
    pub processing_time: f64,
    pub analysis_mode: String,
    pub confidence_threshold: f64,
    pub has_segmentation: bool,
}

/// Result of `/predict/` and `/prediction/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: u64,
    pub image_url: Option<String>,
    pub total_count: u32,
    #[serde(default)]
    pub ripeness_distribution: RipenessDistribution,
    pub confidence: f64,
    #[serde(default)]
    pub bounding_boxes: Vec<Detection>,
    /// ISO 8601
    pub processed_at: String,
    #[serde(default)]
    pub processing_metadata: ProcessingMetadata,
}

/// Stored scan record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: u64,
    pub image_url: Option<String>,
    /// ISO 8601
    pub timestamp: String,
    #[serde(default)]
    pub banana_count: u32,
    #[serde(default)]
    pub ripeness_results: Vec<Detection>,
    #[serde(default)]
    pub avg_confidence: f64,
    #[serde(default)]
    pub dominant_ripeness: String,
    #[serde(default)]
    pub analysis_mode: AnalysisMode,
    #[serde(default)]
    pub processing_time: f64,
    #[serde(default)]
    pub model_version: String,
    pub quality_score: Option<f64>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub retry_count: u32,
}

/// One page of `/predictions/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPage {
    pub results: Vec<ScanRecord>,
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl PredictionPage {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Per-user aggregate from `/analytics/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_scans: u64,
    pub total_bananas: u64,
    pub avg_confidence: f64,
    #[serde(default)]
    pub ripeness_distribution: RipenessDistribution,
    #[serde(default)]
    pub scan_history: Vec<ScanRecord>,
    pub last_scan_date: Option<String>,
}
