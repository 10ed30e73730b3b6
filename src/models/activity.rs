// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Audit log and system settings models.

use serde::{Deserialize, Serialize};

/// Audit log entry from `/activity/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: u64,
    /// Acting user (absent for system events)
    pub username: Option<String>,
    pub action: String,
    pub description: String,
    pub ip_address: Option<String>,
    /// ISO 8601
    pub timestamp: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Admin-editable setting from `/settings/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSetting {
    pub id: u64,
    pub key: String,
    pub value: String,
    /// "system", "ai", "notifications", or "security"
    pub category: String,
    /// "string", "boolean", "integer", or "float"
    #[serde(default = "default_data_type")]
    pub data_type: String,
    pub updated_at: Option<String>,
}

fn default_data_type() -> String {
    "string".to_string()
}

impl SystemSetting {
    /// Check `value` against this setting's declared data type.
    pub fn validate_value(&self, value: &str) -> Result<(), String> {
        let ok = match self.data_type.as_str() {
            "boolean" => matches!(value, "true" | "false" | "True" | "False"),
            "integer" => value.trim().parse::<i64>().is_ok(),
            "float" => value.trim().parse::<f64>().is_ok(),
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(format!(
                "Setting {} expects a {} value, got {:?}",
                self.key, self.data_type, value
            ))
        }
    }
}
