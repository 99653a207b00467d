//! Frame layout reconciliation
//!
//! Turns a message's signal list into the padding size and the ordered block
//! sequence written into the document. The work happens in two sweeps over
//! the signals in declaration order:
//!
//! 1. sizing: every signal (multiplexor and multiplexed included) plus the
//!    gaps in front of them is summed and rounded up to 8, 16, 24 or 32 bits;
//! 2. block construction: the multiplexor is checked for uniqueness,
//!    multiplexed signals are dropped, and an `UNKNOWN` gap block is inserted
//!    wherever a signal starts after the end of the previous emitted one.
//!
//! Placement follows declaration order, not bit order. Signals declared out
//! of bit order produce the gaps and ordering their declaration implies.

use crate::config::OversizePolicy;
use crate::signals::{MessageDefinition, SignalDefinition};
use crate::types::{BsmError, Result};
use std::fmt;

/// Name given to inferred blocks covering unassigned bits
pub const GAP_NAME: &str = "UNKNOWN";

/// Padding size of a message, in bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PaddingSize {
    Bits8,
    Bits16,
    Bits24,
    Bits32,
}

impl PaddingSize {
    /// Smallest padding size holding `raw_size` bits, None above 32
    pub fn for_bits(raw_size: u32) -> Option<Self> {
        match raw_size {
            0..=8 => Some(PaddingSize::Bits8),
            9..=16 => Some(PaddingSize::Bits16),
            17..=24 => Some(PaddingSize::Bits24),
            25..=32 => Some(PaddingSize::Bits32),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            PaddingSize::Bits8 => 8,
            PaddingSize::Bits16 => 16,
            PaddingSize::Bits24 => 24,
            PaddingSize::Bits32 => 32,
        }
    }
}

impl fmt::Display for PaddingSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// One reconciled block, before splitting into descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block<'a> {
    /// A real signal
    Named { name: &'a str, bit_length: u32 },
    /// Bits no emitted signal covers
    Gap { bit_length: u32 },
}

impl<'a> Block<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Block::Named { name, .. } => name,
            Block::Gap { .. } => GAP_NAME,
        }
    }

    pub fn bit_length(&self) -> u32 {
        match *self {
            Block::Named { bit_length, .. } | Block::Gap { bit_length } => bit_length,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, Block::Gap { .. })
    }
}

/// Reconciled layout of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout<'a> {
    /// Total frame size declared to the consumer
    pub padding_size: PaddingSize,
    /// Blocks in emission order
    pub blocks: Vec<Block<'a>>,
    /// Multiplexed signals left out of `blocks`
    pub skipped_multiplexed: usize,
}

impl<'a> FrameLayout<'a> {
    /// Number of gap blocks in the layout
    pub fn gap_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_gap()).count()
    }
}

/// Sum of signal lengths plus the gaps in front of them, in declaration order
///
/// Overlapping signals (typically multiplexed ones sharing bits) are counted
/// in full.
pub fn raw_size(signals: &[SignalDefinition]) -> u32 {
    let mut last_bit = 0u32;
    let mut size = 0u32;

    for signal in signals {
        let start = u32::from(signal.start_bit);
        if start > last_bit {
            size += start - last_bit;
        }
        size += u32::from(signal.length);
        last_bit = signal.end_bit();
    }

    size
}

/// Compute the padding size and block sequence of a message
pub fn reconcile(message: &MessageDefinition, policy: OversizePolicy) -> Result<FrameLayout<'_>> {
    let raw = raw_size(&message.signals);
    let padding_size = match (PaddingSize::for_bits(raw), policy) {
        (Some(size), _) => size,
        (None, OversizePolicy::Clamp) => {
            log::warn!(
                "Message {} (ID {}) spans {} bits, clamping padding size to 32",
                message.name,
                message.id,
                raw
            );
            PaddingSize::Bits32
        }
        (None, OversizePolicy::Reject) => {
            return Err(BsmError::FrameTooLarge {
                message: message.name.clone(),
                raw_size: raw,
            });
        }
    };

    if message.size > 0 && padding_size.bits() as usize > message.size * 8 {
        log::warn!(
            "Message {} declares {} bytes but needs a {} bit padding size",
            message.name,
            message.size,
            padding_size
        );
    }

    let mut blocks = Vec::with_capacity(message.signals.len());
    let mut multiplexor: Option<&SignalDefinition> = None;
    let mut skipped_multiplexed = 0;
    let mut last_bit = 0u32;

    for signal in &message.signals {
        if signal.is_multiplexor() {
            if let Some(first) = multiplexor {
                return Err(BsmError::MultipleMultiplexors {
                    message: message.name.clone(),
                    first: first.name.clone(),
                    second: signal.name.clone(),
                });
            }
            multiplexor = Some(signal);
            continue;
        }
        if signal.is_multiplexed() {
            log::trace!("Skipping multiplexed signal {}.{}", message.name, signal.name);
            skipped_multiplexed += 1;
            continue;
        }

        let start = u32::from(signal.start_bit);
        if start > last_bit {
            blocks.push(Block::Gap {
                bit_length: start - last_bit,
            });
        }
        blocks.push(Block::Named {
            name: &signal.name,
            bit_length: u32::from(signal.length),
        });
        last_bit = signal.end_bit();
    }

    log::debug!(
        "Message {} (ID {}): {} raw bits, padding size {}, {} blocks",
        message.name,
        message.id,
        raw,
        padding_size,
        blocks.len()
    );

    Ok(FrameLayout {
        padding_size,
        blocks,
        skipped_multiplexed,
    })
}
