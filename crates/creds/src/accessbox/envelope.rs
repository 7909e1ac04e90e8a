//! The access box: a multi-recipient encrypted credential envelope
//!
//! An access box carries one sealed record per recipient. Each record holds
//! the same kind of payload (a [`GateBundle`], possibly a different one per
//! recipient) encrypted under the key that only that recipient and the box
//! owner can derive. The box itself is an opaque blob to whatever stores or
//! transports it; the owner's public key rides along in the clear so that a
//! recipient can run the key agreement without any out-of-band material
//! beyond its own private key.
//!
//! # Wire Format
//!
//! ```text
//! [ owner_pubkey: 32 bytes ]
//! [ record_count: u32 le ]
//! ( [ recipient_pubkey: 32 bytes ]
//!   [ nonce: 12 bytes ]
//!   [ ciphertext_len: u32 le ][ ciphertext || tag ] )*
//! ```
//!
//! The layout is stable: two implementations sharing this format produce and
//! accept bit-identical envelopes, which matters because boxes persist in
//! external storage for the lifetime of the credential.

use bytes::BufMut;
use rand_core::{CryptoRng, RngCore};

use super::agreement::{derive_sealing_key, KeyAgreementError};
use super::bundle::GateBundle;
use super::keys::{PublicKey, SecretKey, PUBLIC_KEY_SIZE};
use super::seal::{self, DecryptionError, SealError, NONCE_SIZE};
use super::wire::{self, FormatError};

/// Errors surfaced by packing, unmarshaling or retrieval
///
/// The variants are deliberately distinct: `UnknownKey` is the routine
/// outcome for a box not addressed to the caller, while `Decryption` means
/// a record that *should* have opened did not and is treated as a security
/// event. The gateway maps both to access-denied responses without leaking
/// which occurred.
#[derive(Debug, thiserror::Error)]
pub enum AccessBoxError {
    #[error("malformed data: {0}")]
    Format(#[from] FormatError),
    #[error("access box holds no record for the supplied private key")]
    UnknownKey,
    #[error(transparent)]
    Decryption(#[from] DecryptionError),
    #[error(transparent)]
    KeyAgreement(#[from] KeyAgreementError),
    #[error(transparent)]
    Seal(#[from] SealError),
    #[error("duplicate recipient public key {0}")]
    DuplicateRecipient(PublicKey),
}

/// One recipient's encrypted gate bundle plus the metadata needed to open it
///
/// The recipient public key is stored in the clear purely for lookup; the
/// nonce is public by construction. Only the ciphertext is secret-bearing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedRecord {
    recipient: PublicKey,
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
}

impl SealedRecord {
    pub fn recipient(&self) -> &PublicKey {
        &self.recipient
    }
}

/// The serializable multi-recipient envelope
///
/// Created once by [`AccessBox::pack`], marshaled into external storage, and
/// read back any number of times by [`AccessBox::get_gate_bundle`]. There is
/// no update operation: rotating a recipient's access means packing a fresh
/// box from fresh bundles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessBox {
    owner: PublicKey,
    records: Vec<SealedRecord>,
}

impl AccessBox {
    /// Seal one gate bundle per recipient into a new access box
    ///
    /// For every `(recipient, bundle)` entry, independently: derive the
    /// shared sealing key from the owner's private key and the recipient's
    /// public key, encode the bundle, and seal it under a fresh nonce drawn
    /// from `rng`. Entries are consumed so the plaintext bundles drop when
    /// packing returns.
    ///
    /// # Errors
    ///
    /// - [`AccessBoxError::DuplicateRecipient`] if two entries name the same
    ///   public key. Rejecting beats silently replacing an earlier
    ///   recipient's access.
    /// - [`AccessBoxError::KeyAgreement`] if a recipient key is degenerate.
    pub fn pack<R: RngCore + CryptoRng>(
        owner: &SecretKey,
        entries: Vec<(PublicKey, GateBundle)>,
        rng: &mut R,
    ) -> Result<Self, AccessBoxError> {
        let mut records: Vec<SealedRecord> = Vec::with_capacity(entries.len());

        for (recipient, bundle) in entries {
            if records.iter().any(|r| r.recipient == recipient) {
                return Err(AccessBoxError::DuplicateRecipient(recipient));
            }

            let key = derive_sealing_key(owner, &recipient)?;
            let plaintext = bundle.encode()?;
            let nonce = seal::generate_nonce(rng);
            let ciphertext = key.seal(&nonce, &plaintext)?;

            records.push(SealedRecord {
                recipient,
                nonce,
                ciphertext,
            });
        }

        tracing::debug!(recipients = records.len(), "packed access box");

        Ok(Self {
            owner: owner.public(),
            records,
        })
    }

    /// The box owner's public key
    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }

    /// The sealed records, in pack order
    pub fn records(&self) -> &[SealedRecord] {
        &self.records
    }

    /// Serialize the box into its stable binary envelope
    pub fn marshal(&self) -> Vec<u8> {
        let body: usize = self
            .records
            .iter()
            .map(|r| PUBLIC_KEY_SIZE + NONCE_SIZE + 4 + r.ciphertext.len())
            .sum();
        let mut out = Vec::with_capacity(PUBLIC_KEY_SIZE + 4 + body);

        out.put_slice(&self.owner.to_bytes());
        // record count and ciphertext lengths fit u32 by construction:
        // records only come from `pack` (bundle codec is u32-prefixed) or
        // from `unmarshal` (lengths read as u32)
        out.put_u32_le(self.records.len() as u32);
        for record in &self.records {
            out.put_slice(&record.recipient.to_bytes());
            out.put_slice(&record.nonce);
            out.put_u32_le(record.ciphertext.len() as u32);
            out.put_slice(&record.ciphertext);
        }

        out
    }

    /// Deserialize a box from bytes produced by [`AccessBox::marshal`]
    ///
    /// Rejects truncation, oversized declared lengths and trailing bytes;
    /// never panics.
    pub fn unmarshal(mut data: &[u8]) -> Result<Self, FormatError> {
        let buf = &mut data;

        let owner = PublicKey::from(wire::read_array::<PUBLIC_KEY_SIZE>(buf, "owner key")?);

        let count = wire::read_u32(buf, "record count")?;
        // A record is at least 48 bytes, so any count beyond the remaining
        // byte count is a lie; this also bounds the allocation below.
        if count as usize > buf.len() {
            return Err(FormatError::LengthOverflow {
                field: "record count",
                declared: count,
                remaining: buf.len(),
            });
        }

        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let recipient =
                PublicKey::from(wire::read_array::<PUBLIC_KEY_SIZE>(buf, "recipient key")?);
            let nonce = wire::read_array::<NONCE_SIZE>(buf, "nonce")?;
            let ciphertext = wire::read_prefixed(buf, "ciphertext")?;

            records.push(SealedRecord {
                recipient,
                nonce,
                ciphertext,
            });
        }

        wire::expect_consumed(data)?;
        Ok(Self { owner, records })
    }

    /// Find and open the record addressed to `recipient`
    ///
    /// Derives the caller's public key, linear-scans the records for it,
    /// then derives the shared key against the box owner's public key and
    /// opens the matching ciphertext.
    ///
    /// # Errors
    ///
    /// - [`AccessBoxError::UnknownKey`] if no record names the caller: the
    ///   expected outcome for a box addressed to someone else.
    /// - [`AccessBoxError::Decryption`] if the matching record fails
    ///   authentication: the box was tampered with. Never retried against
    ///   the remaining records.
    /// - [`AccessBoxError::Format`] if the opened plaintext is not a valid
    ///   gate bundle.
    pub fn get_gate_bundle(&self, recipient: &SecretKey) -> Result<GateBundle, AccessBoxError> {
        let public = recipient.public();

        let record = self
            .records
            .iter()
            .find(|r| r.recipient == public)
            .ok_or(AccessBoxError::UnknownKey)?;

        let key = derive_sealing_key(recipient, &self.owner)?;
        let plaintext = key.open(&record.nonce, &record.ciphertext).map_err(|err| {
            tracing::warn!(
                recipient = %public,
                "access box record failed authentication"
            );
            err
        })?;

        Ok(GateBundle::decode(&plaintext)?)
    }
}
