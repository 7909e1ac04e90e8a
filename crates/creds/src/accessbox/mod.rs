//! Multi-recipient encrypted credential boxes
//!
//! This module implements the gateway's access-box protocol: a user's
//! long-lived authorization material is packaged once and made independently
//! retrievable by an arbitrary set of gateway-side key holders, without the
//! plaintext ever being stored and without any recipient learning another
//! recipient's private key.
//!
//! # Protocol Overview
//!
//! Packing (issuance side):
//! 1. Build one [`GateBundle`] per recipient (bearer token + session tokens)
//! 2. For each recipient, derive a sealing key via X25519 ECDH between the
//!    owner's private key and the recipient's public key, reduced through
//!    SHA-256
//! 3. Seal the encoded bundle with ChaCha20-Poly1305 under a fresh nonce
//! 4. Collect the sealed records into an [`AccessBox`] and marshal it for
//!    external storage
//!
//! Retrieval (gateway side):
//! 1. Unmarshal the box, derive the node's public key from its private key
//! 2. Scan the records for that public key
//! 3. Derive the same sealing key from the node's private key and the box
//!    owner's public key (ECDH symmetry), open, and decode the bundle
//!
//! # Security Properties
//!
//! - **Pairwise secrecy**: each record is readable only by its recipient and
//!   the box owner
//! - **Integrity**: Poly1305 authentication fails closed on any corruption
//! - **No plaintext at rest**: bundles exist in the clear only inside a
//!   single `pack` or `get_gate_bundle` call
//!
//! The protocol is stateless: packing and retrieval are pure functions of
//! their arguments and safe to call concurrently. The only shared resource
//! is the caller-supplied CSPRNG used for nonces.

mod agreement;
mod bundle;
mod envelope;
mod keys;
mod seal;
mod wire;

pub use agreement::{derive_sealing_key, KeyAgreementError};
pub use bundle::GateBundle;
pub use envelope::{AccessBox, AccessBoxError, SealedRecord};
pub use keys::{KeyError, PublicKey, SecretKey, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};
pub use seal::{generate_nonce, DecryptionError, SealError, SealingKey, NONCE_SIZE, TAG_SIZE};
pub use wire::FormatError;
