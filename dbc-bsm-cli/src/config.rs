//! Configuration loading and parsing

use anyhow::{Context, Result};
use dbc_bsm::{ConverterConfig, DeviceSettings, OversizePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub filtering: FilteringConfig,
    #[serde(default)]
    pub device: DeviceSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default)]
    pub dbc_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub timestamps: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub oversize: OversizePolicy,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FilteringConfig {
    pub message_ids: Option<Vec<u32>>,
}

impl AppConfig {
    /// Library configuration for this application configuration
    pub fn converter_config(&self) -> ConverterConfig {
        let mut config = ConverterConfig::new()
            .with_timestamps(self.output.timestamps)
            .with_oversize_policy(self.layout.oversize)
            .with_device(self.device.clone());
        if let Some(ids) = &self.filtering.message_ids {
            config = config.with_message_filter(ids.clone());
        }
        config
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .device
        .validate()
        .with_context(|| format!("Invalid device settings in {:?}", path))?;

    Ok(config)
}

/// Parse a CAN ID given as decimal or 0x-prefixed hex
pub fn parse_can_id(text: &str) -> std::result::Result<u32, String> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid CAN ID '{}': {}", text, e))
}
