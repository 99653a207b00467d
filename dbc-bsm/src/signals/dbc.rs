//! DBC file parser
//!
//! Parses Vector DBC files with `can-dbc` and converts them into the
//! converter's message definitions.

use crate::signals::database::{MessageDefinition, MultiplexRole, SignalDefinition};
use crate::types::{BsmError, Result};
use std::path::Path;

/// Parse a DBC file and return message definitions in declaration order
pub fn parse_dbc_file(path: &Path) -> Result<Vec<MessageDefinition>> {
    log::info!("Parsing DBC file: {:?}", path);

    let bytes = std::fs::read(path).map_err(|e| {
        BsmError::DbcParseError(format!("Failed to read file {:?}: {}", path, e))
    })?;

    // DBC files are frequently Windows-1252; fall back to Latin-1 when not UTF-8
    let dbc_content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("DBC file is not UTF-8, trying Latin-1 encoding");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    };

    let source_filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown.dbc");

    let messages = parse_dbc_str(&dbc_content, source_filename)?;

    log::info!("Parsed {} messages from {:?}", messages.len(), path);

    Ok(messages)
}

/// Parse DBC text already held in memory
///
/// `source` names the origin of the text in diagnostics.
pub fn parse_dbc_str(content: &str, source: &str) -> Result<Vec<MessageDefinition>> {
    let dbc = can_dbc::DBC::from_slice(content.as_bytes()).map_err(|e| {
        BsmError::DbcParseError(format!("Failed to parse DBC {}: {:?}", source, e))
    })?;

    Ok(dbc
        .messages()
        .iter()
        .map(|dbc_msg| convert_message(dbc_msg, source))
        .collect())
}

/// Convert a can-dbc message to our MessageDefinition
fn convert_message(dbc_msg: &can_dbc::Message, source: &str) -> MessageDefinition {
    MessageDefinition {
        id: dbc_msg.message_id().0,
        name: dbc_msg.message_name().to_string(),
        size: *dbc_msg.message_size() as usize,
        signals: dbc_msg.signals().iter().map(convert_signal).collect(),
        source: source.to_string(),
    }
}

/// Convert a can-dbc signal to our SignalDefinition
fn convert_signal(dbc_sig: &can_dbc::Signal) -> SignalDefinition {
    let multiplex = match *dbc_sig.multiplexer_indicator() {
        can_dbc::MultiplexIndicator::Multiplexor => MultiplexRole::Multiplexor,
        can_dbc::MultiplexIndicator::MultiplexedSignal(switch_value) => {
            MultiplexRole::Multiplexed { switch_value }
        }
        can_dbc::MultiplexIndicator::MultiplexorAndMultiplexedSignal(switch_value) => {
            MultiplexRole::MultiplexorAndMultiplexed { switch_value }
        }
        can_dbc::MultiplexIndicator::Plain => MultiplexRole::Plain,
    };

    SignalDefinition {
        name: dbc_sig.name().to_string(),
        start_bit: *dbc_sig.start_bit() as u16,
        length: *dbc_sig.signal_size() as u16,
        multiplex,
        unit: if dbc_sig.unit().is_empty() {
            None
        } else {
            Some(dbc_sig.unit().to_string())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SIMPLE_DBC: &str = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1 ECU2

BO_ 291 EngineData: 8 ECU1
 SG_ EngineSpeed : 0|16@1+ (1,0) [0|8000] "rpm" ECU2
 SG_ EngineTemp : 16|8@1+ (1,-40) [-40|215] "C" ECU2

BO_ 512 BatteryStatus: 8 ECU1
 SG_ BatteryVoltage : 0|16@1+ (0.01,0) [0|16] "V" ECU2
"#;

    #[test]
    fn test_parse_simple_dbc() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SIMPLE_DBC.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let messages = parse_dbc_file(temp_file.path()).unwrap();

        assert_eq!(messages.len(), 2);

        let msg1 = &messages[0];
        assert_eq!(msg1.id, 291);
        assert_eq!(msg1.name, "EngineData");
        assert_eq!(msg1.size, 8);
        assert_eq!(msg1.signals.len(), 2);
        assert_eq!(msg1.signals[1].name, "EngineTemp");
        assert_eq!(msg1.signals[1].start_bit, 16);
        assert_eq!(msg1.signals[1].length, 8);
        assert_eq!(msg1.signals[0].unit, Some("rpm".to_string()));
        assert_eq!(messages[1].name, "BatteryStatus");
    }

    #[test]
    fn test_parse_multiplexed_signals() {
        let dbc_content = r#"
VERSION ""

NS_ :

BS_:

BU_: ECU1

BO_ 512 MultiplexedMsg: 8 ECU1
 SG_ Mode M : 0|8@1+ (1,0) [0|3] "" ECU1
 SG_ SignalA m0 : 8|16@1+ (1,0) [0|100] "%" ECU1
 SG_ SignalB m1 : 8|16@1+ (0.1,0) [0|1000] "mV" ECU1
"#;

        let messages = parse_dbc_str(dbc_content, "inline.dbc").unwrap();

        assert_eq!(messages.len(), 1);
        let msg = &messages[0];
        assert!(msg.is_multiplexed());
        assert_eq!(msg.source, "inline.dbc");

        assert!(msg.signals[0].is_multiplexor());
        assert_eq!(msg.signals[0].unit, None);
        assert_eq!(
            msg.signals[2].multiplex,
            MultiplexRole::Multiplexed { switch_value: 1 }
        );
    }

    #[test]
    fn test_missing_file() {
        let result = parse_dbc_file(Path::new("/nonexistent/powertrain.dbc"));
        assert!(matches!(result, Err(BsmError::DbcParseError(_))));
    }
}
