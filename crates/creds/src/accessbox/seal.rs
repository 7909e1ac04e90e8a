//! Authenticated sealing of gate-bundle plaintexts
//!
//! ChaCha20-Poly1305 AEAD under a key derived by [`super::agreement`]. The
//! nonce is generated fresh per record at pack time and travels in the clear
//! as its own envelope field; it is not secret, it only must never repeat
//! under the same derived key.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand_core::{CryptoRng, RngCore};

/// Size of ChaCha20-Poly1305 nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of the Poly1305 authentication tag in bytes
pub const TAG_SIZE: usize = 16;
/// Size of the derived sealing key in bytes (256 bits)
pub const SEALING_KEY_SIZE: usize = 32;

/// Sealing failed (ciphertext would overflow; not reachable for any
/// bundle a gateway can actually produce)
#[derive(Debug, thiserror::Error)]
#[error("failed to seal plaintext")]
pub struct SealError;

/// Authentication failed while opening a sealed record
///
/// Any single-bit corruption of key, nonce, ciphertext or tag lands here.
/// Callers treat this as a security event, distinct from a box that simply
/// was not addressed to them.
#[derive(Debug, thiserror::Error)]
#[error("sealed record failed authentication")]
pub struct DecryptionError;

/// A 256-bit symmetric key derived via ECDH, valid for exactly one
/// (owner, recipient) pair
#[derive(Clone, PartialEq, Eq)]
pub struct SealingKey([u8; SEALING_KEY_SIZE]);

impl From<[u8; SEALING_KEY_SIZE]> for SealingKey {
    fn from(bytes: [u8; SEALING_KEY_SIZE]) -> Self {
        SealingKey(bytes)
    }
}

impl std::fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SealingKey(..)")
    }
}

impl SealingKey {
    /// Encrypt and authenticate `plaintext` under this key and `nonce`
    ///
    /// Returns `ciphertext || tag`.
    pub fn seal(&self, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Vec<u8>, SealError> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.0));
        cipher
            .encrypt(&Nonce::from(*nonce), plaintext)
            .map_err(|_| SealError)
    }

    /// Decrypt and verify `ciphertext || tag`, failing closed on any
    /// corruption
    pub fn open(
        &self,
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, DecryptionError> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.0));
        cipher
            .decrypt(&Nonce::from(*nonce), ciphertext)
            .map_err(|_| DecryptionError)
    }
}

/// Generate a fresh random nonce from a caller-supplied CSPRNG
pub fn generate_nonce<R: RngCore + CryptoRng>(rng: &mut R) -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce);
    nonce
}
