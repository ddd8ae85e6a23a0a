use aes::{
    cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit},
    Aes128,
};
use anyhow::Result;
use rand::RngCore;

use crate::block::Block;

use super::Oracle;

type CbcEnc = cbc::Encryptor<Aes128>;
type CbcDec = cbc::Decryptor<Aes128>;

/// An in-process AES-128-CBC/PKCS#7 oracle. Backs `demo1`/`demo2`/`demo3`
/// and the test suite: a real block cypher and a real padding check, but
/// called as a function instead of over HTTP, so the solver's test
/// coverage doesn't depend on spinning up `demo_api`.
pub struct AesCbcOracle {
    key: [u8; 16],
}

impl AesCbcOracle {
    pub fn new(key: [u8; 16]) -> Self {
        Self { key }
    }

    pub fn random() -> Self {
        let mut key = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }

    /// Encrypts already-padded `plaintext` under a random IV, returning
    /// `iv ‖ cyphertext`.
    pub fn encrypt(&self, padded_plaintext: &[u8]) -> Vec<u8> {
        let mut iv = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut iv);
        let mut out = iv.to_vec();
        out.extend(self.encrypt_with_iv(&iv, padded_plaintext));
        out
    }

    /// Encrypts already-padded `plaintext` under a caller-supplied IV,
    /// returning only the cyphertext body (no IV prefix). Used by tests
    /// that want a fixed IV for reproducibility.
    pub fn encrypt_with_iv(&self, iv: &[u8; 16], padded_plaintext: &[u8]) -> Vec<u8> {
        let mut buf = padded_plaintext.to_vec();
        let enc = CbcEnc::new(&self.key.into(), iv.into());
        enc.encrypt_padded_mut::<NoPadding>(&mut buf, padded_plaintext.len())
            .expect("plaintext is already block-aligned")
            .to_vec()
    }

    /// Decrypts `iv ‖ cyphertext` and reports whether the result is valid
    /// PKCS#7 -- this *is* the padding oracle.
    fn validate(&self, iv_and_cyphertext: &[u8]) -> bool {
        if iv_and_cyphertext.len() < 32 || iv_and_cyphertext.len() % 16 != 0 {
            return false;
        }
        let (iv, body) = iv_and_cyphertext.split_at(16);
        let iv: [u8; 16] = iv.try_into().expect("checked length above");
        let mut buf = body.to_vec();
        let dec = CbcDec::new(&self.key.into(), &iv.into());
        dec.decrypt_padded_mut::<aes::cipher::block_padding::Pkcs7>(&mut buf)
            .is_ok()
    }
}

impl Oracle for AesCbcOracle {
    fn ask(&self, prev: &Block, target: &Block) -> Result<bool> {
        let mut probe = prev.to_vec();
        probe.extend_from_slice(target);
        Ok(self.validate(&probe))
    }
}
