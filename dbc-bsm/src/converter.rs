//! Main converter API
//!
//! The Converter struct is the entry point for loading message definitions
//! and writing the BSM document.

use crate::config::ConverterConfig;
use crate::document;
use crate::signals::{DatabaseStats, MessageDefinition, SignalDatabase};
use crate::types::{ConversionSummary, Result};
use crate::xml::{self, Document};
use std::io::Write;
use std::path::Path;

/// The main converter struct - entry point for all conversion operations
pub struct Converter {
    /// Message definitions in document order
    signal_db: SignalDatabase,
    config: ConverterConfig,
}

impl Converter {
    /// Create a converter with the default configuration
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    /// Create a converter with the given configuration
    pub fn with_config(config: ConverterConfig) -> Self {
        Self {
            signal_db: SignalDatabase::new(),
            config,
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Load a DBC file and append its messages
    ///
    /// # Example
    /// ```no_run
    /// use dbc_bsm::Converter;
    /// use std::path::Path;
    ///
    /// let mut converter = Converter::new();
    /// converter.add_dbc(Path::new("powertrain.dbc")).unwrap();
    /// ```
    pub fn add_dbc(&mut self, path: &Path) -> Result<()> {
        log::info!("Loading DBC file: {:?}", path);

        let messages = crate::signals::dbc::parse_dbc_file(path)?;
        for message in messages {
            self.signal_db.add_message(message);
        }

        log::info!("DBC file loaded successfully: {:?}", path);
        Ok(())
    }

    /// Parse DBC text and append its messages
    pub fn add_dbc_str(&mut self, content: &str, source: &str) -> Result<()> {
        for message in crate::signals::dbc::parse_dbc_str(content, source)? {
            self.signal_db.add_message(message);
        }
        Ok(())
    }

    /// Append a single message definition
    pub fn add_message(&mut self, message: MessageDefinition) {
        self.signal_db.add_message(message);
    }

    /// Messages in document order
    pub fn messages(&self) -> &[MessageDefinition] {
        self.signal_db.messages()
    }

    /// Get statistics about the loaded messages
    pub fn database_stats(&self) -> DatabaseStats {
        self.signal_db.stats()
    }

    /// Build the document tree without writing it
    pub fn build_document(&self) -> Result<(Document, ConversionSummary)> {
        self.config.validate()?;

        let generated_on = if self.config.timestamps {
            document::timestamp_comment()
        } else {
            None
        };

        document::build_document(self.signal_db.messages(), &self.config, generated_on)
    }

    /// Convert all loaded messages and write the document to `out`
    ///
    /// Nothing is written unless every message reconciles. A failing sink
    /// aborts with [`BsmError::IoError`](crate::BsmError::IoError); callers
    /// should discard whatever reached the sink before the failure.
    ///
    /// # Example
    /// ```no_run
    /// use dbc_bsm::{Converter, ConverterConfig};
    /// use std::path::Path;
    ///
    /// let mut converter = Converter::with_config(ConverterConfig::new().with_timestamps(true));
    /// converter.add_dbc(Path::new("powertrain.dbc")).unwrap();
    ///
    /// let mut out = Vec::new();
    /// let summary = converter.convert(&mut out).unwrap();
    /// println!("{} messages", summary.messages);
    /// ```
    pub fn convert<W: Write + ?Sized>(&self, out: &mut W) -> Result<ConversionSummary> {
        log::info!("Converting {} messages", self.signal_db.messages().len());

        let (document, summary) = self.build_document()?;
        xml::render(&document, out)?;

        log::info!(
            "Wrote {} messages, {} bit blocks ({} gaps, {} split)",
            summary.messages,
            summary.descriptors,
            summary.gap_blocks,
            summary.split_blocks
        );
        Ok(summary)
    }

    /// Convert into an in-memory string
    pub fn convert_to_string(&self) -> Result<(String, ConversionSummary)> {
        let (document, summary) = self.build_document()?;
        Ok((document.to_string(), summary))
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
