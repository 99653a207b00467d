//! Core types for the DBC to BSM converter
//!
//! This module defines the error type shared by every stage of the conversion
//! and the summary the converter reports once a document has been written.

use serde::{Deserialize, Serialize};

/// Result type for converter operations
pub type Result<T> = std::result::Result<T, BsmError>;

/// Errors that can occur during conversion
#[derive(Debug, thiserror::Error)]
pub enum BsmError {
    #[error("Multiple multiplexor signals in message {message} ('{first}' and '{second}'), only one per CAN message is allowed")]
    MultipleMultiplexors {
        message: String,
        first: String,
        second: String,
    },

    #[error("Message {message} spans {raw_size} bits, more than the 32 bit maximum padding size")]
    FrameTooLarge { message: String, raw_size: u32 },

    #[error("Failed to parse DBC file: {0}")]
    DbcParseError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BsmError {
    /// True if the error comes from the message model rather than from the
    /// output sink or the environment
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            BsmError::MultipleMultiplexors { .. } | BsmError::FrameTooLarge { .. }
        )
    }
}

/// Counts collected while a document is assembled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Messages written to the document
    pub messages: usize,
    /// `<BB>` descriptors written, after splitting
    pub descriptors: usize,
    /// Inferred UNKNOWN blocks (before splitting)
    pub gap_blocks: usize,
    /// Blocks wider than 16 bits that were split into LSB/MSB halves
    pub split_blocks: usize,
    /// Multiplexed signals left out of the emitted layouts
    pub skipped_multiplexed: usize,
}
