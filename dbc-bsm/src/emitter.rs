//! Block emitter
//!
//! Renders reconciled blocks as `<BB>` bit-block descriptors. The target
//! treats a descriptor as a 16 bit element, so anything wider is split into a
//! 16 bit low half and a high half holding the rest. Gaps follow the same
//! rule as signals.

use crate::layout::Block;
use crate::xml::Element;

/// Widest descriptor the target accepts
pub const BLOCK_WIDTH: u32 = 16;

/// Name suffix of the low half of a split block
pub const LSB_SUFFIX: &str = " (LSB)";

/// Name suffix of the high half of a split block
pub const MSB_SUFFIX: &str = " (MSB)";

/// One `<BB>` descriptor
///
/// Descriptors carry no absolute position; the consumer infers it from
/// emission order, so `bits` is always 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitBlock {
    pub name: String,
    pub bits: u32,
    pub size: u32,
}

impl BitBlock {
    fn new(name: String, size: u32) -> Self {
        Self { name, bits: 0, size }
    }

    /// XML element for this descriptor
    pub fn to_element(&self) -> Element {
        Element::new("BB")
            .attr("Name", &self.name)
            .attr("Bits", self.bits)
            .attr("Size", self.size)
    }
}

/// Render one block as one descriptor, or two when wider than 16 bits
///
/// Blocks wider than 32 bits are not decomposed further: the high half
/// carries everything above the first 16 bits.
pub fn emit(block: &Block<'_>) -> Vec<BitBlock> {
    let name = block.name();
    let length = block.bit_length();

    if length > BLOCK_WIDTH {
        log::trace!("Splitting {} ({} bits) into LSB/MSB descriptors", name, length);
        vec![
            BitBlock::new(format!("{}{}", name, LSB_SUFFIX), BLOCK_WIDTH),
            BitBlock::new(format!("{}{}", name, MSB_SUFFIX), length - BLOCK_WIDTH),
        ]
    } else {
        vec![BitBlock::new(name.to_string(), length)]
    }
}

/// True if `emit` splits this block
pub fn is_split(block: &Block<'_>) -> bool {
    block.bit_length() > BLOCK_WIDTH
}
