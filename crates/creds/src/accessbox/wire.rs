//! Checked readers for the stable binary layouts
//!
//! Both the gate-bundle codec and the box envelope are hand-rolled,
//! length-prefixed formats that must stay bit-exact across implementations,
//! so decoding goes through these helpers rather than raw slice indexing:
//! every read is bounds-checked and every declared length is validated
//! against the remaining input before any allocation.

use bytes::Buf;

/// Errors raised while decoding a gate bundle or a box envelope
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("unexpected end of input while reading {0}")]
    Truncated(&'static str),
    #[error("declared {field} length {declared} exceeds {remaining} remaining bytes")]
    LengthOverflow {
        field: &'static str,
        declared: u32,
        remaining: usize,
    },
    #[error("{field} length {len} does not fit a u32 prefix")]
    Oversize { field: &'static str, len: usize },
    #[error("{0} trailing bytes after the last field")]
    TrailingBytes(usize),
    #[error("invalid {field} marker byte {value:#04x}")]
    InvalidMarker { field: &'static str, value: u8 },
}

pub(crate) fn read_u8(buf: &mut &[u8], field: &'static str) -> Result<u8, FormatError> {
    if buf.remaining() < 1 {
        return Err(FormatError::Truncated(field));
    }
    Ok(buf.get_u8())
}

pub(crate) fn read_u32(buf: &mut &[u8], field: &'static str) -> Result<u32, FormatError> {
    if buf.remaining() < 4 {
        return Err(FormatError::Truncated(field));
    }
    Ok(buf.get_u32_le())
}

/// Read a u32 length prefix followed by that many bytes
pub(crate) fn read_prefixed(buf: &mut &[u8], field: &'static str) -> Result<Vec<u8>, FormatError> {
    let len = read_u32(buf, field)?;
    if len as usize > buf.remaining() {
        return Err(FormatError::LengthOverflow {
            field,
            declared: len,
            remaining: buf.remaining(),
        });
    }
    let bytes = buf[..len as usize].to_vec();
    buf.advance(len as usize);
    Ok(bytes)
}

pub(crate) fn read_array<const N: usize>(
    buf: &mut &[u8],
    field: &'static str,
) -> Result<[u8; N], FormatError> {
    if buf.remaining() < N {
        return Err(FormatError::Truncated(field));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[..N]);
    buf.advance(N);
    Ok(out)
}

/// Decoding must consume the input exactly; anything left over means the
/// bytes were not produced by this codec
pub(crate) fn expect_consumed(buf: &[u8]) -> Result<(), FormatError> {
    if !buf.is_empty() {
        return Err(FormatError::TrailingBytes(buf.len()));
    }
    Ok(())
}
