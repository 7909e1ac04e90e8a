//! Gate bundle: the plaintext credential unit addressed to one recipient
//!
//! A bundle is what a recipient actually gets out of an access box: one
//! bearer token granting object operations, plus zero or more session tokens
//! granting container-configuration operations. Bundles exist in plaintext
//! only transiently, between issuance and sealing on one side and between
//! opening and consumption on the other.
//!
//! # Wire Format
//!
//! ```text
//! [ bearer_flag: 1 byte (0 or 1) ]
//! [ bearer_len: u32 le ][ bearer bytes ]      -- only if bearer_flag == 1
//! [ session_count: u32 le ]
//! ( [ session_len: u32 le ][ session bytes ] )*
//! ```
//!
//! The encoding is deterministic and self-delimiting; `decode` consumes its
//! input exactly and rejects anything it did not produce.

use bytes::BufMut;
use serde::{Deserialize, Serialize};

use super::wire::{self, FormatError};
use crate::tokens::{BearerToken, SessionToken};

/// One bearer token plus an ordered list of session tokens
///
/// The bearer slot may be empty for session-only bundles (a recipient that
/// only manages container configuration and never touches objects). Session
/// order is preserved end-to-end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateBundle {
    bearer: Option<BearerToken>,
    sessions: Vec<SessionToken>,
}

impl GateBundle {
    pub fn new(bearer: Option<BearerToken>, sessions: Vec<SessionToken>) -> Self {
        Self { bearer, sessions }
    }

    /// A bundle with no bearer token and no session tokens
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bearer(&self) -> Option<&BearerToken> {
        self.bearer.as_ref()
    }

    pub fn sessions(&self) -> &[SessionToken] {
        &self.sessions
    }

    /// Encode the bundle into its deterministic binary form
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Oversize`] if a token body or the session
    /// list cannot be described by a u32 prefix. No token a gateway issues
    /// comes anywhere near that size.
    pub fn encode(&self) -> Result<Vec<u8>, FormatError> {
        let mut out = Vec::with_capacity(self.encoded_len());

        match &self.bearer {
            Some(bearer) => {
                out.put_u8(1);
                out.put_u32_le(checked_len(bearer.len(), "bearer token")?);
                out.put_slice(bearer.as_bytes());
            }
            None => out.put_u8(0),
        }

        out.put_u32_le(checked_len(self.sessions.len(), "session count")?);
        for session in &self.sessions {
            out.put_u32_le(checked_len(session.len(), "session token")?);
            out.put_slice(session.as_bytes());
        }

        Ok(out)
    }

    /// Decode a bundle from bytes produced by [`GateBundle::encode`]
    ///
    /// Never panics and never returns a partially populated bundle:
    /// truncated prefixes, oversized declared lengths, an invalid bearer
    /// flag, and trailing bytes all fail with a [`FormatError`].
    pub fn decode(mut data: &[u8]) -> Result<Self, FormatError> {
        let buf = &mut data;

        let bearer = match wire::read_u8(buf, "bearer flag")? {
            0 => None,
            1 => Some(BearerToken::from(wire::read_prefixed(
                buf,
                "bearer token",
            )?)),
            value => {
                return Err(FormatError::InvalidMarker {
                    field: "bearer flag",
                    value,
                })
            }
        };

        let count = wire::read_u32(buf, "session count")?;
        // Each session token costs at least its 4-byte prefix, so a count
        // larger than the remaining byte count is unsatisfiable; checking
        // here bounds the allocation below.
        if count as usize > buf.len() {
            return Err(FormatError::LengthOverflow {
                field: "session count",
                declared: count,
                remaining: buf.len(),
            });
        }

        let mut sessions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            sessions.push(SessionToken::from(wire::read_prefixed(
                buf,
                "session token",
            )?));
        }

        wire::expect_consumed(data)?;
        Ok(Self { bearer, sessions })
    }

    fn encoded_len(&self) -> usize {
        let bearer = match &self.bearer {
            Some(bearer) => 4 + bearer.len(),
            None => 0,
        };
        let sessions: usize = self.sessions.iter().map(|s| 4 + s.len()).sum();
        1 + bearer + 4 + sessions
    }
}

fn checked_len(len: usize, field: &'static str) -> Result<u32, FormatError> {
    u32::try_from(len).map_err(|_| FormatError::Oversize { field, len })
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> GateBundle {
        GateBundle::new(
            Some(BearerToken::from(b"signed-bearer".as_slice())),
            vec![
                SessionToken::from(b"session-alpha".as_slice()),
                SessionToken::from(b"session-beta".as_slice()),
            ],
        )
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let bundle = sample();
        let encoded = bundle.encode().unwrap();
        let decoded = GateBundle::decode(&encoded).unwrap();

        assert_eq!(bundle, decoded);
        assert_eq!(decoded.sessions().len(), 2);
        assert_eq!(decoded.sessions()[0].as_bytes(), b"session-alpha");
    }

    #[test]
    fn test_empty_bundle_roundtrip() {
        let bundle = GateBundle::empty();
        let encoded = bundle.encode().unwrap();

        // flag byte + zero session count
        assert_eq!(encoded, vec![0, 0, 0, 0, 0]);
        assert_eq!(GateBundle::decode(&encoded).unwrap(), bundle);
    }

    #[test]
    fn test_session_only_bundle_roundtrip() {
        let bundle = GateBundle::new(None, vec![SessionToken::from(b"only".as_slice())]);
        let decoded = GateBundle::decode(&bundle.encode().unwrap()).unwrap();

        assert!(decoded.bearer().is_none());
        assert_eq!(decoded.sessions().len(), 1);
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let encoded = sample().encode().unwrap();

        // every strict prefix must fail, none may panic
        for cut in 0..encoded.len() {
            assert!(
                GateBundle::decode(&encoded[..cut]).is_err(),
                "prefix of {} bytes decoded",
                cut
            );
        }
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut encoded = sample().encode().unwrap();
        encoded.push(0);

        assert!(matches!(
            GateBundle::decode(&encoded),
            Err(FormatError::TrailingBytes(1))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_bearer_flag() {
        let err = GateBundle::decode(&[7, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidMarker {
                field: "bearer flag",
                value: 7
            }
        ));
    }

    #[test]
    fn test_decode_rejects_absurd_session_count() {
        // no bearer, count u32::MAX, no bodies
        let data = [0, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(
            GateBundle::decode(&data),
            Err(FormatError::LengthOverflow { .. })
        ));
    }

    #[test]
    fn test_session_order_is_preserved() {
        let sessions: Vec<SessionToken> = (0u8..20)
            .map(|i| SessionToken::from(vec![i, i, i]))
            .collect();
        let bundle = GateBundle::new(None, sessions.clone());

        let decoded = GateBundle::decode(&bundle.encode().unwrap()).unwrap();
        assert_eq!(decoded.sessions(), sessions.as_slice());
    }
}
