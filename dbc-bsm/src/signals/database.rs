//! Message database
//!
//! Holds message definitions from one or more DBC files in the order they
//! were declared. That order is the order messages appear in the generated
//! document.

/// A complete CAN message definition
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDefinition {
    /// CAN message ID
    pub id: u32,
    /// Message name
    pub name: String,
    /// Declared message size in bytes (DLC)
    pub size: usize,
    /// All signals in this message, in declaration order
    pub signals: Vec<SignalDefinition>,
    /// Source file (DBC filename)
    pub source: String,
}

impl MessageDefinition {
    /// True if any signal takes part in multiplexing
    pub fn is_multiplexed(&self) -> bool {
        self.signals
            .iter()
            .any(|s| s.multiplex != MultiplexRole::Plain)
    }
}

/// A CAN signal definition
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDefinition {
    /// Signal name
    pub name: String,
    /// Start bit in the CAN frame
    pub start_bit: u16,
    /// Length in bits
    pub length: u16,
    /// Role of the signal in message multiplexing
    pub multiplex: MultiplexRole,
    /// Engineering unit (e.g., "km/h", "V")
    pub unit: Option<String>,
}

impl SignalDefinition {
    /// Create a plain (non-multiplexed) signal
    pub fn new(name: impl Into<String>, start_bit: u16, length: u16) -> Self {
        Self {
            name: name.into(),
            start_bit,
            length,
            multiplex: MultiplexRole::Plain,
            unit: None,
        }
    }

    /// Builder method: set the multiplex role
    pub fn with_multiplex(mut self, multiplex: MultiplexRole) -> Self {
        self.multiplex = multiplex;
        self
    }

    /// Builder method: set the engineering unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn is_multiplexor(&self) -> bool {
        matches!(
            self.multiplex,
            MultiplexRole::Multiplexor | MultiplexRole::MultiplexorAndMultiplexed { .. }
        )
    }

    pub fn is_multiplexed(&self) -> bool {
        matches!(
            self.multiplex,
            MultiplexRole::Multiplexed { .. } | MultiplexRole::MultiplexorAndMultiplexed { .. }
        )
    }

    /// First bit past the end of the signal
    pub fn end_bit(&self) -> u32 {
        u32::from(self.start_bit) + u32::from(self.length)
    }
}

/// Multiplexing role of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplexRole {
    /// Always present in the frame
    Plain,
    /// Selects which multiplexed signals are present
    Multiplexor,
    /// Present only when the multiplexor equals `switch_value`
    Multiplexed { switch_value: u64 },
    /// Extended multiplexing: selected by one multiplexor, selecting others
    MultiplexorAndMultiplexed { switch_value: u64 },
}

/// The ordered message database
#[derive(Debug, Default)]
pub struct SignalDatabase {
    messages: Vec<MessageDefinition>,
}

impl SignalDatabase {
    /// Create a new empty database
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Append a message definition, keeping declaration order
    pub fn add_message(&mut self, message: MessageDefinition) {
        if let Some(existing) = self.get_message(message.id) {
            log::warn!(
                "Message ID 0x{:X} defined twice ({} from {}, {} from {})",
                message.id,
                existing.name,
                existing.source,
                message.name,
                message.source
            );
        }
        self.messages.push(message);
    }

    /// All messages in declaration order
    pub fn messages(&self) -> &[MessageDefinition] {
        &self.messages
    }

    /// Get the first message definition with the given CAN ID
    pub fn get_message(&self, can_id: u32) -> Option<&MessageDefinition> {
        self.messages.iter().find(|m| m.id == can_id)
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            num_messages: self.messages.len(),
            num_signals: self.messages.iter().map(|m| m.signals.len()).sum(),
            num_multiplexed_messages: self.messages.iter().filter(|m| m.is_multiplexed()).count(),
        }
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Total number of message definitions
    pub num_messages: usize,
    /// Total number of signal definitions
    pub num_signals: usize,
    /// Messages with at least one multiplexor or multiplexed signal
    pub num_multiplexed_messages: usize,
}
