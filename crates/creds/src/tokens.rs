//! Opaque capability tokens carried inside gate bundles
//!
//! Tokens are issued and signed elsewhere (the gateway's issuance service);
//! this crate only moves them around as byte sequences with equality
//! semantics. Signature, expiry and scope validation happen at the point
//! where a retrieved bundle is consumed, never here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A signed capability authorizing object-level storage operations
///
/// Bearer tokens are minted by the credential issuer on behalf of a user and
/// grant object read/write rights on the storage network. The gateway treats
/// the token body as opaque: it is sealed into an access box, retrieved, and
/// attached to outgoing storage-network requests without inspection.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BearerToken(Vec<u8>);

/// A signed capability scoped to a single container
///
/// Session tokens authorize container-configuration operations (for example
/// updating an access-control table) within a bounded validity window. A
/// gate bundle carries zero or more of them, in issuance order.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(Vec<u8>);

macro_rules! token_impl {
    ($name:ident) => {
        impl $name {
            /// Wrap already-signed token bytes
            pub fn new(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }

            /// Get a reference to the raw token bytes
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Consume the token, returning its bytes
            pub fn into_bytes(self) -> Vec<u8> {
                self.0
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<Vec<u8>> for $name {
            fn from(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }
        }

        impl From<&[u8]> for $name {
            fn from(bytes: &[u8]) -> Self {
                Self(bytes.to_vec())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Token bodies can be large; show a hex prefix only
                let shown = &self.0[..self.0.len().min(8)];
                if self.0.len() > 8 {
                    write!(
                        f,
                        "{}({}.. {} bytes)",
                        stringify!($name),
                        hex::encode(shown),
                        self.0.len()
                    )
                } else {
                    write!(f, "{}({})", stringify!($name), hex::encode(shown))
                }
            }
        }
    };
}

token_impl!(BearerToken);
token_impl!(SessionToken);
