use crate::block::{Block, BlockSize};

/// A single byte slot in one of the four per-block tracks: three valued,
/// unsolved, in progress, or solved. `Block` itself stores raw `u8`s
/// because the working-previous and cyphertext tracks are always fully
/// populated; only the intermediate/plaintext tracks need this tri-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteSlot {
    Unsolved,
    InProgress(u8),
    Solved(u8),
}

impl ByteSlot {
    pub fn glyph(self) -> String {
        match self {
            ByteSlot::Unsolved => "??".to_string(),
            ByteSlot::InProgress(g) | ByteSlot::Solved(g) => format!("{:02x}", g),
        }
    }

    pub fn is_solved(self) -> bool {
        matches!(self, ByteSlot::Solved(_))
    }
}

/// One block's worth of tri-state bytes, index 0 is the leftmost byte.
#[derive(Debug, Clone)]
pub struct SlotBlock(pub Vec<ByteSlot>);

impl SlotBlock {
    pub fn unsolved(block_size: BlockSize) -> Self {
        Self(vec![ByteSlot::Unsolved; block_size.as_usize()])
    }
}

/// An immutable, value-typed view of solver state at one point in time
/// Produced by copy on every publish; the
/// renderer never aliases solver-mutable storage.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub version: u64,
    pub complete: bool,

    pub block_count: usize, // number of target blocks (N-1, IV excluded)
    pub block_size: BlockSize,
    pub current_block: usize, // n
    pub current_byte: usize,  // i
    pub current_guess: u8,    // g
    pub pad_width: u8,        // k

    pub cyphertext: Vec<Block>,
    pub working_previous: Vec<Block>,
    pub intermediate: Vec<SlotBlock>,
    pub plaintext: Vec<SlotBlock>,
}
