use serde::{Deserialize, Serialize};

use crate::account::Platform;

/// Per-platform attempt record for multi-platform (third-party) methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformOutcome {
    pub platform: Platform,
    pub success: bool,
    pub message: String,
}

impl PlatformOutcome {
    pub fn succeeded(platform: Platform, message: impl Into<String>) -> Self {
        Self {
            platform,
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(platform: Platform, message: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            message: message.into(),
        }
    }
}

/// Transient result of one account's check-in run. Never persisted; only
/// derived fields travel back to the registry via `AccountUpdate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinOutcome {
    pub success: bool,
    pub method: String,
    /// Human-readable balance summary, only for successful attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Ordered platform attempts; empty for single-platform methods.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platform_results: Vec<PlatformOutcome>,
}

impl CheckinOutcome {
    pub fn succeeded(method: &str, summary: Option<String>) -> Self {
        Self {
            success: true,
            method: method.to_string(),
            summary,
            error: None,
            platform_results: Vec::new(),
        }
    }

    pub fn failed(method: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            method: method.to_string(),
            summary: None,
            error: Some(error.into()),
            platform_results: Vec::new(),
        }
    }
}
