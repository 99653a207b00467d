//! DBC to BSM converter library
//!
//! Turns CAN message definitions from DBC files into the XML configuration
//! read by the beSTORM protocol fuzzer (BSM).
//!
//! # Architecture
//!
//! Conversion is a one-way pipeline with no state kept between messages:
//! - [`layout`] reconciles each message's signals into a padding size and an
//!   ordered, gap-filled block list
//! - [`emitter`] turns each block into one or two 16 bit descriptors
//! - [`document`] wraps everything in the CAN open/write/close sequence
//! - [`xml`] renders the finished tree
//!
//! # Example Usage
//!
//! ```no_run
//! use dbc_bsm::{Converter, ConverterConfig, OversizePolicy};
//! use std::path::Path;
//!
//! let config = ConverterConfig::new()
//!     .with_timestamps(true)
//!     .with_oversize_policy(OversizePolicy::Clamp);
//!
//! let mut converter = Converter::with_config(config);
//! converter.add_dbc(Path::new("powertrain.dbc")).unwrap();
//!
//! let mut out = std::io::stdout();
//! converter.convert(&mut out).unwrap();
//! ```

// Public modules
pub mod config;
pub mod converter;
pub mod document;
pub mod emitter;
pub mod layout;
pub mod signals;
pub mod types;
pub mod xml;

// Re-export main types for convenience
pub use config::{ConverterConfig, DeviceSettings, OversizePolicy};
pub use converter::Converter;
pub use emitter::BitBlock;
pub use layout::{reconcile, Block, FrameLayout, PaddingSize};
pub use signals::{DatabaseStats, MessageDefinition, MultiplexRole, SignalDefinition};
pub use types::{BsmError, ConversionSummary, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
