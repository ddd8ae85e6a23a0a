use aes::{
    cipher::{
        block_padding::{NoPadding, Pkcs7},
        BlockDecryptMut, BlockEncryptMut, KeyIvInit,
    },
    Aes128,
};
use anyhow::{anyhow, Result};
use rand::RngCore;

use crate::plain_text;

type CbcEnc = cbc::Encryptor<Aes128>;
type CbcDec = cbc::Decryptor<Aes128>;

pub const KEY_LEN: usize = 16;
pub const BLOCK_LEN: usize = 16;

/// A single AES-128-CBC key, generated once per `demo-api` process and held
/// for its lifetime: the service is a fixed-key oracle, not a key-rotation
/// demo. A fresh process gets a fresh key, with no on-disk persistence.
pub struct Key([u8; KEY_LEN]);

impl Key {
    pub fn random() -> Self {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self(key)
    }

    /// Encrypts `plaintext` under a random IV, returning `iv ‖ cyphertext`,
    /// matching the wire shape `solve --web` (and this crate's own
    /// `oracle::web::WebOracle`) expects as `--ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let mut iv = [0u8; BLOCK_LEN];
        rand::thread_rng().fill_bytes(&mut iv);

        let mut buf = plain_text::pad(plaintext, BLOCK_LEN);
        let enc = CbcEnc::new(&self.0.into(), &iv.into());
        let len = buf.len();
        enc.encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .expect("buf is already block-aligned by plain_text::pad");

        let mut out = iv.to_vec();
        out.extend(buf);
        out
    }

    /// Validates `iv_and_cyphertext` as `/validate` does: split off the IV,
    /// decrypt, and report whether PKCS#7 unpadding succeeds. This *is* the
    /// padding oracle; everything else in this module exists to drive it.
    pub fn validate(&self, iv_and_cyphertext: &[u8]) -> Result<bool> {
        if iv_and_cyphertext.len() < 2 * BLOCK_LEN || iv_and_cyphertext.len() % BLOCK_LEN != 0 {
            return Err(anyhow!(
                "Ciphertext must be at least {} bytes and block-aligned",
                2 * BLOCK_LEN
            ));
        }
        let (iv, body) = iv_and_cyphertext.split_at(BLOCK_LEN);
        let iv: [u8; BLOCK_LEN] = iv.try_into().expect("checked length above");

        let mut buf = body.to_vec();
        let dec = CbcDec::new(&self.0.into(), &iv.into());
        Ok(dec.decrypt_padded_mut::<Pkcs7>(&mut buf).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_then_validate_round_trips() {
        let key = Key::random();
        let ciphertext = key.encrypt(b"Hello, world!");
        assert!(key.validate(&ciphertext).unwrap());
    }

    #[test]
    fn validate_rejects_tampered_padding() {
        let key = Key::random();
        let mut ciphertext = key.encrypt(b"Hello, world!");
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xff;
        assert!(!key.validate(&ciphertext).unwrap());
    }

    #[test]
    fn validate_rejects_short_input() {
        let key = Key::random();
        assert!(key.validate(&[0u8; 16]).is_err());
    }
}
