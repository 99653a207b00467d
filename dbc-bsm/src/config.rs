//! Converter configuration types
//!
//! Everything a caller can tune about the generated document: the optional
//! timestamp comment, how oversized frames are handled, which messages are
//! emitted and the CAN device parameters written into the document prefix.

use crate::types::{BsmError, Result};
use serde::{Deserialize, Serialize};

/// Baud rates accepted by the CAN interface library
pub const SUPPORTED_BAUDRATES: [u32; 10] = [
    10_000, 20_000, 50_000, 62_500, 100_000, 125_000, 250_000, 500_000, 800_000, 1_000_000,
];

/// Highest port number of the CAN interface
pub const MAX_PORT: u8 = 3;

/// Configuration for the converter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Whether to add a "Generated on" comment with the local time
    #[serde(default)]
    pub timestamps: bool,

    /// What to do with messages spanning more than 32 bits
    #[serde(default)]
    pub oversize: OversizePolicy,

    /// Optional: only emit these CAN message IDs
    #[serde(default)]
    pub message_filter: Option<Vec<u32>>,

    /// CAN device parameters for the open/configure sequence
    #[serde(default)]
    pub device: DeviceSettings,
}

/// Handling of messages whose layout needs more than 32 padding bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Fail the conversion
    #[default]
    Reject,
    /// Declare a 32 bit padding size and emit the blocks unchanged
    Clamp,
}

/// CAN device parameters written into the document prefix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeviceSettings {
    /// Device address shown to the operator
    pub address: String,
    /// Interface port (0-3)
    pub port: u8,
    /// Bus baud rate
    pub baudrate: u32,
    /// Interface library implementing the open/write/close procedures
    pub library: String,
    /// Upper bound of bytes the generator produces per message
    pub max_bytes_to_generate: u32,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            address: "<CAN Device>".to_string(),
            port: 0,
            baudrate: 250_000,
            library: "CAN Interface.dll".to_string(),
            max_bytes_to_generate: 8,
        }
    }
}

impl DeviceSettings {
    /// Check port and baud rate against what the interface accepts
    pub fn validate(&self) -> Result<()> {
        if self.port > MAX_PORT {
            return Err(BsmError::InvalidConfig(format!(
                "port {} out of range, should be 0 to {}",
                self.port, MAX_PORT
            )));
        }
        if !SUPPORTED_BAUDRATES.contains(&self.baudrate) {
            return Err(BsmError::InvalidConfig(format!(
                "unsupported baud rate {}",
                self.baudrate
            )));
        }
        if self.library.is_empty() {
            return Err(BsmError::InvalidConfig("empty interface library name".to_string()));
        }
        Ok(())
    }
}

impl ConverterConfig {
    /// Create a new converter configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable the timestamp comment
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Builder method: set the oversize policy
    pub fn with_oversize_policy(mut self, policy: OversizePolicy) -> Self {
        self.oversize = policy;
        self
    }

    /// Builder method: set message filter
    pub fn with_message_filter(mut self, messages: Vec<u32>) -> Self {
        self.message_filter = Some(messages);
        self
    }

    /// Builder method: set device parameters
    pub fn with_device(mut self, device: DeviceSettings) -> Self {
        self.device = device;
        self
    }

    /// Check if a message ID should be emitted
    pub fn should_emit_message(&self, can_id: u32) -> bool {
        match &self.message_filter {
            Some(messages) => messages.contains(&can_id),
            None => true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.device.validate()
    }
}
