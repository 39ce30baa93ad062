//! Player configuration (JSON).
//!
//! Every field has a default, so an empty object `{}` is a valid config and
//! unknown keys are rejected.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::updater::DEFAULT_UPDATE_INTERVAL_MS;

/// Player variables passed to the streaming embed when it is attached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerVars {
    /// Embed's own controls (0 = hidden, we draw our own)
    pub controls: u8,
    pub wmode: String,
    /// Related videos at the end
    pub rel: u8,
    pub showinfo: u8,
    pub enablejsapi: u8,
    pub modestbranding: u8,
    pub html5: u8,
}

impl Default for PlayerVars {
    fn default() -> Self {
        Self {
            controls: 0,
            wmode: "transparent".to_string(),
            rel: 0,
            showinfo: 0,
            enablejsapi: 1,
            modestbranding: 1,
            html5: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Poll cadence while playing
    pub update_interval_ms: u64,
    pub player_vars: PlayerVars,
    /// Quality requested when the HD toggle is switched on
    pub hd_quality: String,
    /// Quality requested when the HD toggle is switched off
    pub sd_quality: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            player_vars: PlayerVars::default(),
            hd_quality: "hd720".to_string(),
            sd_quality: "large".to_string(),
        }
    }
}

impl PlayerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse player config")
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read player config: {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("In {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(PlayerConfig::from_json("{}").unwrap(), PlayerConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let cfg = PlayerConfig::from_json(
            r#"{ "update_interval_ms": 250, "player_vars": { "controls": 1 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.update_interval_ms, 250);
        assert_eq!(cfg.player_vars.controls, 1);
        assert_eq!(cfg.player_vars.wmode, "transparent");
        assert_eq!(cfg.hd_quality, "hd720");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(PlayerConfig::from_json(r#"{ "autoplay": true }"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = PlayerConfig::load(Path::new("/nonexistent/vidctl.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/vidctl.json"));
    }
}
