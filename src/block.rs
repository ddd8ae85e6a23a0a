use std::{
    fmt::{self, Display},
    ops::{BitXor, Deref, DerefMut},
    str::FromStr,
};

use anyhow::{anyhow, Result};

/// A fixed-size block of bytes. The size is a runtime parameter, fixed once
/// per message, but the storage itself is a plain `Vec` since the solver
/// allocates many of these up front and resizes none of them afterward.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block(Vec<u8>);

/// The cypher's block size, parsed from `--block-size`. AES (the only cypher
/// the bundled demos use) is 16; 8 is kept around for toy/legacy block
/// cyphers a user-supplied oracle might front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSize {
    Eight,
    Sixteen,
}

impl Default for BlockSize {
    fn default() -> Self {
        BlockSize::Sixteen
    }
}

impl BlockSize {
    pub fn as_usize(self) -> usize {
        match self {
            BlockSize::Eight => 8,
            BlockSize::Sixteen => 16,
        }
    }
}

impl FromStr for BlockSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "8" => Ok(BlockSize::Eight),
            "16" => Ok(BlockSize::Sixteen),
            other => Err(anyhow!(
                "`{}` is not a supported block size. Expected one of: [8, 16]",
                other
            )),
        }
    }
}

impl Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_usize())
    }
}

impl Block {
    pub fn zeroed(block_size: BlockSize) -> Self {
        Self(vec![0u8; block_size.as_usize()])
    }

    pub fn block_size(&self) -> BlockSize {
        if self.0.len() == 8 {
            BlockSize::Eight
        } else {
            BlockSize::Sixteen
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl From<&[u8]> for Block {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Block {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Deref for Block {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Block {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl BitXor for &Block {
    type Output = Result<Block>;

    fn bitxor(self, rhs: Self) -> Self::Output {
        if self.len() != rhs.len() {
            return Err(anyhow!(
                "Can't XOR blocks of size {} and {}",
                self.len(),
                rhs.len()
            ));
        }

        Ok(Block(
            self.0.iter().zip(rhs.0.iter()).map(|(l, r)| l ^ r).collect(),
        ))
    }
}

/// Splits a flat byte buffer into block-sized chunks. Used by both the
/// cyphertext parser and the demo plaintext encoder.
pub fn chunk_into_blocks(data: &[u8], block_size: BlockSize) -> Result<Vec<Block>> {
    let size = block_size.as_usize();
    if data.len() % size != 0 {
        return Err(anyhow!(
            "Data length {} is not a multiple of the block size {}",
            data.len(),
            size
        ));
    }

    Ok(data.chunks(size).map(Block::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_is_bytewise() {
        let a = Block::from(vec![0xff, 0x00, 0x0f]);
        let b = Block::from(vec![0x0f, 0xff, 0xf0]);
        let xored = (&a ^ &b).unwrap();
        assert_eq!(&*xored, &[0xf0, 0xff, 0xff]);
    }

    #[test]
    fn xor_rejects_mismatched_sizes() {
        let a = Block::from(vec![0u8; 16]);
        let b = Block::from(vec![0u8; 8]);
        assert!((&a ^ &b).is_err());
    }

    #[test]
    fn chunk_into_blocks_rejects_misaligned_data() {
        let data = vec![0u8; 17];
        assert!(chunk_into_blocks(&data, BlockSize::Sixteen).is_err());
    }

    #[test]
    fn chunk_into_blocks_splits_evenly() {
        let data = vec![0u8; 32];
        let blocks = chunk_into_blocks(&data, BlockSize::Sixteen).unwrap();
        assert_eq!(blocks.len(), 2);
    }
}
