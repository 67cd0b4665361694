//! Byte sequence ⇄ base64 (standard alphabet, padded).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

/// Appends the base64 form of `value`.
pub fn write(out: &mut String, value: &[u8]) {
    STANDARD.encode_string(value, out);
}

/// Decodes base64 text.
///
/// # Examples
///
/// ```
/// use fj_codec::primitives::binary;
///
/// let mut out = String::new();
/// binary::write(&mut out, b"fj");
/// assert_eq!(out, "Zmo=");
/// assert_eq!(binary::parse("Zmo=").unwrap().as_ref(), b"fj");
/// assert!(binary::parse("Zm*=").is_none());
/// ```
pub fn parse(text: &str) -> Option<Bytes> {
    STANDARD.decode(text).ok().map(Bytes::from)
}
