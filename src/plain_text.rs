use anyhow::{anyhow, Result};

use crate::block::Block;

/// Concatenates solved blocks and strips PKCS#7 padding. This is
/// deliberately outside the solver: the solver hands back full blocks,
/// padding and all, and never itself decides what counts as "the message".
pub fn strip_padding(blocks: &[Block], block_size: usize) -> Result<Vec<u8>> {
    let joined: Vec<u8> = blocks.iter().flat_map(|b| b.to_vec()).collect();
    if joined.is_empty() {
        return Ok(joined);
    }

    let pad = *joined.last().unwrap() as usize;
    if pad == 0 || pad > block_size || pad > joined.len() {
        return Err(anyhow!(
            "Recovered plaintext ends in an invalid PKCS#7 pad byte ({})",
            pad
        ));
    }
    if joined[joined.len() - pad..].iter().any(|&b| b as usize != pad) {
        return Err(anyhow!("Recovered plaintext's padding bytes are not uniform"));
    }

    Ok(joined[..joined.len() - pad].to_vec())
}

/// Pads `data` to a multiple of `block_size` with PKCS#7, for the demo
/// scenarios and for `demo_api`'s `/encrypt`.
pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad_len = block_size - (data.len() % block_size);
    let mut out = data.to_vec();
    out.extend(std::iter::repeat(pad_len as u8).take(pad_len));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_padding_removes_uniform_tail() {
        let data = pad(b"Hello, world!", 16);
        let block = Block::from(data);
        assert_eq!(strip_padding(&[block], 16).unwrap(), b"Hello, world!");
    }

    #[test]
    fn strip_padding_rejects_non_uniform_tail() {
        let mut data = pad(b"Hello, world!", 16);
        let last = data.len() - 1;
        data[last - 1] ^= 0xff;
        let block = Block::from(data);
        assert!(strip_padding(&[block], 16).is_err());
    }

    #[test]
    fn pad_always_adds_at_least_one_byte() {
        let padded = pad(b"exactly16bytes!!", 16);
        assert_eq!(padded.len(), 32);
        assert_eq!(*padded.last().unwrap(), 16);
    }
}
