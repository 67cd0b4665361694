//! Guid ⇄ canonical hyphenated text.

use uuid::Uuid;

/// Appends the lower-case hyphenated form, e.g.
/// `67e55044-10b1-426f-9247-bb680e5fe0c8`.
pub fn write(out: &mut String, value: &Uuid) {
    let mut buf = Uuid::encode_buffer();
    out.push_str(value.hyphenated().encode_lower(&mut buf));
}

/// Parses hyphenated, simple, braced or URN forms.
///
/// # Examples
///
/// ```
/// use fj_codec::primitives::guid;
///
/// let a = guid::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
/// let b = guid::parse("{67E55044-10B1-426F-9247-BB680E5FE0C8}").unwrap();
/// assert_eq!(a, b);
///
/// let mut out = String::new();
/// guid::write(&mut out, &b);
/// assert_eq!(out, "67e55044-10b1-426f-9247-bb680e5fe0c8");
/// ```
pub fn parse(text: &str) -> Option<Uuid> {
    Uuid::try_parse(text).ok()
}
