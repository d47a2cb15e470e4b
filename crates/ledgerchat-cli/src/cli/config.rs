use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ledgerchat_core::EngineConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration that can be loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Engine thresholds
    #[serde(default)]
    pub engine: EngineConfig,

    /// Replaces the script's `currentUserId` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<String>,
}

impl CliConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: CliConfig = serde_json::from_str(json).context("Failed to deserialize config")?;
        config.engine.validate().context("Invalid engine config")?;
        Ok(config)
    }

    /// `~/.config/ledgerchat/cli.json` (platform equivalent)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ledgerchat").join("cli.json"))
    }

    /// Explicit `--config` path first, then the default location if it
    /// exists, then built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "using default config file");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config_minimal() {
        let config = CliConfig::from_json("{}").unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert!(config.current_user_id.is_none());
    }

    #[test]
    fn test_parse_config_with_engine_overrides() {
        let json = r#"{
            "engine": {"msgVisibleThreshold": 400},
            "currentUserId": "u42"
        }"#;
        let config = CliConfig::from_json(json).unwrap();
        assert_eq!(config.engine.msg_visible_threshold, 400.0);
        assert_eq!(config.engine.vertical_offset_threshold, 200.0);
        assert_eq!(config.current_user_id.as_deref(), Some("u42"));
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let json = r#"{"engine": {"verticalOffsetThreshold": -1}}"#;
        assert!(CliConfig::from_json(json).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"currentUserId": "me"}}"#).unwrap();

        let config = CliConfig::resolve(Some(file.path())).unwrap();
        assert_eq!(config.current_user_id.as_deref(), Some("me"));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = CliConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("nope.json"));
    }
}
