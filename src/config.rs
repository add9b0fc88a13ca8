//! Configuration for FLOW8 Remote
//!
//! Loaded from a YAML file. Every field has a default, so a partial file or
//! no file at all yields a usable configuration.

use crate::device::DEFAULT_PRODUCT_MATCH;
use crate::panel::phantom::DEFAULT_HOLD_MS;
use crate::panel::PanelSettings;
use crate::state::{DEFAULT_DEBOUNCE_MS, DEFAULT_SCENE_KEY};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::info;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub midi: MidiConfig,
    pub persistence: PersistenceConfig,
    pub panel: PanelConfig,
}

/// MIDI output selection
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MidiConfig {
    /// Output to open at startup (case-insensitive substring). When unset the
    /// port naming `product_match` is chosen, else the first one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_port: Option<String>,
    pub product_match: String,
    pub client_name: String,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            output_port: None,
            product_match: DEFAULT_PRODUCT_MATCH.to_string(),
            client_name: "FLOW8-Remote".to_string(),
        }
    }
}

/// Scene storage
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PersistenceConfig {
    pub scene_key: String,
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            scene_key: DEFAULT_SCENE_KEY.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Gesture timing
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PanelConfig {
    /// 48V hold-to-activate duration
    pub hold_ms: u64,
    /// Timer resolution of the event loop
    pub tick_ms: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            hold_ms: DEFAULT_HOLD_MS,
            tick_ms: 20,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as a map
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: AppConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.persistence.scene_key.trim().is_empty() {
            anyhow::bail!("persistence.scene_key cannot be empty");
        }
        if self.midi.client_name.trim().is_empty() {
            anyhow::bail!("midi.client_name cannot be empty");
        }
        if self.panel.tick_ms == 0 {
            anyhow::bail!("panel.tick_ms must be at least 1");
        }
        Ok(())
    }

    pub fn panel_settings(&self) -> PanelSettings {
        PanelSettings {
            scene_key: self.persistence.scene_key.clone(),
            debounce: Duration::from_millis(self.persistence.debounce_ms),
            hold: Duration::from_millis(self.panel.hold_ms),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.panel.tick_ms)
    }
}
