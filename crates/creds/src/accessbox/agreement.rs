//! X25519 key agreement for record sealing
//!
//! Both sides of the protocol derive the same symmetric key from opposite
//! halves of the two keypairs: the owner calls
//! `derive_sealing_key(owner_secret, recipient_public)` at pack time, and the
//! recipient calls `derive_sealing_key(recipient_secret, owner_public)` at
//! retrieval time. ECDH symmetry guarantees both produce the identical key
//! without either side ever seeing the other's private scalar.
//!
//! The shared Montgomery u-coordinate is never used as a key directly; it is
//! reduced through SHA-256 to the ChaCha20-Poly1305 key.

use sha2::{Digest, Sha256};

use super::keys::{PublicKey, SecretKey};
use super::seal::SealingKey;

/// Errors that can occur during key agreement
#[derive(Debug, thiserror::Error)]
pub enum KeyAgreementError {
    /// The exchange produced an all-zero shared point, which happens only
    /// when the peer public key is the identity or another low-order point.
    /// Sealing under such a key would be trivially breakable, so the
    /// exchange is refused outright.
    #[error("degenerate public key: key exchange was not contributory")]
    NonContributory,
}

/// Derive the symmetric sealing key shared by two keypairs
///
/// # Errors
///
/// Returns [`KeyAgreementError::NonContributory`] if `other` is the identity
/// point or otherwise of low order.
pub fn derive_sealing_key(
    own: &SecretKey,
    other: &PublicKey,
) -> Result<SealingKey, KeyAgreementError> {
    let shared = own.as_x25519().diffie_hellman(other.as_x25519());
    if !shared.was_contributory() {
        return Err(KeyAgreementError::NonContributory);
    }

    let digest = Sha256::digest(shared.as_bytes());
    Ok(SealingKey::from(<[u8; 32]>::from(digest)))
}
