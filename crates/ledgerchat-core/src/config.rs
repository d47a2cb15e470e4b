use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AUTOSCROLL_TO_TOP_THRESHOLD, MIN_MESSAGES_FOR_NEWER_AFFORDANCE, MSG_VISIBLE_THRESHOLD,
    VERTICAL_OFFSET_THRESHOLD,
};
use crate::error::{LedgerChatError, Result};

/// Tunable thresholds for a conversation view.
///
/// Can be loaded from a JSON file; missing fields fall back to the defaults
/// in `constants`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub msg_visible_threshold: f64,
    pub vertical_offset_threshold: f64,
    pub autoscroll_to_top_threshold: f64,
    pub min_messages_for_newer_affordance: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            msg_visible_threshold: MSG_VISIBLE_THRESHOLD,
            vertical_offset_threshold: VERTICAL_OFFSET_THRESHOLD,
            autoscroll_to_top_threshold: AUTOSCROLL_TO_TOP_THRESHOLD,
            min_messages_for_newer_affordance: MIN_MESSAGES_FOR_NEWER_AFFORDANCE,
        }
    }
}

impl EngineConfig {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LedgerChatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject negative or non-finite thresholds.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("msgVisibleThreshold", self.msg_visible_threshold),
            ("verticalOffsetThreshold", self.vertical_offset_threshold),
            ("autoscrollToTopThreshold", self.autoscroll_to_top_threshold),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(LedgerChatError::Config {
                    message: format!("{} must be a non-negative number, got {}", name, value),
                });
            }
        }
        Ok(())
    }
}
