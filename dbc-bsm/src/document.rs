//! Document assembly
//!
//! Builds the complete BSM configuration tree: the CAN open and configure
//! sequence, one `CAN Send` write per message carrying its reconciled bit
//! blocks, and the closing sequence. The tree is finished before anything is
//! rendered, so a message that fails reconciliation leaves no partial output.

use crate::config::{ConverterConfig, DeviceSettings, MAX_PORT, SUPPORTED_BAUDRATES};
use crate::emitter;
use crate::layout::{self, FrameLayout};
use crate::signals::MessageDefinition;
use crate::types::{ConversionSummary, Result};
use crate::xml::{Document, Element, Node};
use std::fmt::Write;

/// Format version of the generated document
pub const BSM_VERSION: &str = "1.2";

/// Format of the "Generated on" comment (asctime style)
pub const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

const MODULE_NAME: &str = "CAN";
const PROTOCOL_NAME: &str = "CAN Protocol";
const SEQUENCE_NAME: &str = "CAN Sequence";
const OPEN_STEP: &str = "CAN Open";
const HANDLE: &str = "HANDLE";

const PROC_OPEN: &str = "OpenDevice";
const PROC_SET_GLOBALS: &str = "SetGlobals";
const PROC_WRITE: &str = "Write";
const PROC_CLOSE: &str = "CloseDevice";

/// Comment naming the generator
pub fn provenance_comment() -> String {
    format!("Generated by dbc-bsm v{}", crate::VERSION)
}

/// Comment with the current local time, None if it cannot be formatted
pub fn timestamp_comment() -> Option<String> {
    let now = chrono::Local::now();
    let mut comment = String::from("Generated on: ");
    match write!(comment, "{}", now.format(TIMESTAMP_FORMAT)) {
        Ok(()) => Some(comment),
        Err(e) => {
            log::warn!("Could not format generation timestamp: {}", e);
            None
        }
    }
}

/// Assemble the document for `messages`
///
/// Messages are emitted in slice order, filtered by the configured message
/// IDs. `generated_on` is added as a second top-level comment when present.
pub fn build_document(
    messages: &[MessageDefinition],
    config: &ConverterConfig,
    generated_on: Option<String>,
) -> Result<(Document, ConversionSummary)> {
    let mut summary = ConversionSummary::default();
    let mut sequence = Element::new("SE").attr("Name", "Messages");

    for message in messages.iter().filter(|m| config.should_emit_message(m.id)) {
        let layout = layout::reconcile(message, config.oversize)?;
        sequence = sequence.node(Node::Blank);
        sequence.push(message_element(message, &layout, &config.device, &mut summary));
        summary.messages += 1;
    }

    let root = document_root(&config.device, sequence.node(Node::Blank));

    let mut document = Document::new(root);
    document.comments.push(provenance_comment());
    if let Some(generated_on) = generated_on {
        document.comments.push(generated_on);
    }

    Ok((document, summary))
}

/// `CAN Send` write step for one message
pub fn message_element(
    message: &MessageDefinition,
    layout: &FrameLayout<'_>,
    device: &DeviceSettings,
    summary: &mut ConversionSummary,
) -> Element {
    let mut bits = Element::new("BC")
        .attr("Name", "Message Bits")
        .attr("PaddingSize", layout.padding_size)
        .attr("PaddingBit", 0);

    for block in &layout.blocks {
        if block.is_gap() {
            summary.gap_blocks += 1;
        }
        if emitter::is_split(block) {
            summary.split_blocks += 1;
        }
        for descriptor in emitter::emit(block) {
            bits.push(descriptor.to_element());
            summary.descriptors += 1;
        }
    }
    summary.skipped_multiplexed += layout.skipped_multiplexed;

    Element::new("SP")
        .attr("Name", format!("CAN Send ({} - {})", message.name, message.id))
        .attr("Library", &device.library)
        .attr("Procedure", PROC_WRITE)
        .child(handle_parameter(HANDLE))
        .child(
            Element::new("S")
                .attr("Name", "Identifier")
                .child(Element::new("C").attr("Name", "Identifier").text(message.id)),
        )
        .child(
            Element::new("S")
                .attr("ParamName", "Data")
                .attr("Name", "Message")
                .child(bits),
        )
}

/// Wrap the message sequence in the device open/configure/close steps
fn document_root(device: &DeviceSettings, messages: Element) -> Element {
    let options = Element::new("GeneratorOptSettings").child(
        Element::new("BT")
            .attr("FactoryDefined", 1)
            .attr("MaxBytesToGenerate", device.max_bytes_to_generate)
            .attr("FactoryType", "Binary"),
    );

    let open = procedure(OPEN_STEP, device, PROC_OPEN)
        .child(
            Element::new("S").attr("Name", "IPAddress").child(
                Element::new("EV")
                    .attr("Name", "IPAddress")
                    .attr("Description", "CAN IP Address")
                    .attr("ASCIIValue", &device.address)
                    .attr("Required", 1),
            ),
        )
        .child(
            Element::new("S").attr("Name", "Port").child(
                Element::new("EV")
                    .attr("Name", "Port")
                    .attr("Description", "CAN Port")
                    .attr("ASCIIValue", device.port)
                    .attr("Required", 1)
                    .attr("Comment", port_hint()),
            ),
        );

    let globals = procedure("CAN SetGlobals", device, PROC_SET_GLOBALS)
        .child(handle_parameter("CAN"))
        .child(
            Element::new("S").attr("Name", "Baudrate").child(
                Element::new("EV")
                    .attr("Name", "Baudrate")
                    .attr("Description", "Baudrate")
                    .attr("ASCIIValue", device.baudrate)
                    .attr("Required", 1)
                    .attr("Comment", baudrate_hint()),
            ),
        );

    let close = procedure("CAN Close", device, PROC_CLOSE).child(handle_parameter("CAN"));

    let sequence = Element::new("SC")
        .attr("Name", SEQUENCE_NAME)
        .child(open)
        .child(globals)
        .node(Node::Blank)
        .child(messages)
        .node(Node::Blank)
        .child(close);

    Element::new("beSTORM")
        .attr("Version", BSM_VERSION)
        .child(options)
        .child(
            Element::new("ModuleSettings").child(
                Element::new("M").attr("Name", MODULE_NAME).child(
                    Element::new("P").attr("Name", PROTOCOL_NAME).child(sequence),
                ),
            ),
        )
}

fn procedure(name: &str, device: &DeviceSettings, proc_name: &str) -> Element {
    Element::new("SP")
        .attr("Name", name)
        .attr("Library", &device.library)
        .attr("Procedure", proc_name)
}

/// Parameter passing the device handle returned by the open step
fn handle_parameter(name: &str) -> Element {
    Element::new("S").attr("Name", HANDLE).child(
        Element::new("PC")
            .attr("Name", name)
            .attr("ConditionedName", OPEN_STEP)
            .attr("Parameter", HANDLE),
    )
}

fn port_hint() -> String {
    let ports: Vec<String> = (0..=MAX_PORT).map(|p| p.to_string()).collect();
    format!("Should be either {}", either_list(&ports))
}

fn baudrate_hint() -> String {
    let rates: Vec<String> = SUPPORTED_BAUDRATES
        .iter()
        .map(|rate| format!("'{}'", rate))
        .collect();
    format!("Should be either {}", either_list(&rates))
}

/// "a, b, or c"
fn either_list(items: &[String]) -> String {
    match items.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}
