//! Scalar type inference for untyped targets.
//!
//! Numbers take the narrowest of `i32`, `i64` and [`Decimal`] that holds
//! them when they are integers, and `f64` otherwise. Strings that look like
//! dates or guids become [`JsonValue::DateTime`] and [`JsonValue::Guid`].
//!
//! The rules are heuristics. A fractional number with more digits than an
//! `f64` holds is rounded, and a string that merely looks like a date is
//! read as one.
//!
//! # Examples
//!
//! ```
//! use fj_codec::settings::Settings;
//! use fj_codec::value::infer::{infer_number, infer_string};
//! use fj_codec::value::{JsonValue, Number};
//!
//! assert_eq!(infer_number("12"), Some(Number::I32(12)));
//! assert_eq!(infer_number("12345678901"), Some(Number::I64(12345678901)));
//! assert_eq!(infer_number("0.5"), Some(Number::F64(0.5)));
//! assert_eq!(infer_number("twelve"), None);
//!
//! let s = Settings::default();
//! assert!(matches!(infer_string("2024-05-01T12:00:00Z", &s), JsonValue::DateTime(_)));
//! assert!(matches!(infer_string("hello", &s), JsonValue::String(_)));
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::primitives::{Decimal, date, float, guid, integer};
use crate::settings::Settings;
use crate::value::{JsonValue, Number};

/// Integers of up to this many digits always fit an `i32`.
const I32_DIGITS: usize = 9;

lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"^-?(0|[1-9][0-9]*)$").unwrap();
    static ref FLOAT: Regex =
        Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][-+]?[0-9]+)?$").unwrap();
    static ref LEGACY_DATE: Regex = Regex::new(r"^/Date\(-?[0-9]+([-+][0-9]{4})?\)/$").unwrap();
    static ref ISO_DATE: Regex = Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}(T[0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]+)?)?(Z|[-+][0-9]{2}:[0-9]{2})?)?$"
    )
    .unwrap();
    static ref GUID: Regex = Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$"
    )
    .unwrap();
}

/// Infers the type of a bare numeric token.
pub fn infer_number(token: &str) -> Option<Number> {
    if INTEGER.is_match(token) {
        let digits = token.len() - usize::from(token.starts_with('-'));
        if digits <= I32_DIGITS {
            return integer::parse_i32(token).map(Number::I32);
        }
        if let Some(n) = integer::parse_i64(token) {
            return Some(Number::I64(n));
        }
        if let Ok(d) = token.parse::<Decimal>() {
            return Some(Number::Decimal(d));
        }
        return float::parse_f64(token).map(Number::F64);
    }
    if FLOAT.is_match(token) {
        return float::parse_f64(token).map(Number::F64);
    }
    None
}

/// Infers the type of decoded string content.
pub fn infer_string(text: &str, settings: &Settings) -> JsonValue {
    if (LEGACY_DATE.is_match(text) || ISO_DATE.is_match(text))
        && let Some(value) = date::parse_offset(text, settings)
    {
        return JsonValue::DateTime(value);
    }
    if GUID.is_match(text)
        && let Some(value) = guid::parse(text)
    {
        return JsonValue::Guid(value);
    }
    JsonValue::String(text.into())
}

#[cfg(test)]
mod tests {
    use super::{infer_number, infer_string};
    use crate::settings::Settings;
    use crate::value::{JsonValue, Number};

    #[test]
    fn integer_widths() {
        assert_eq!(infer_number("-999999999"), Some(Number::I32(-999_999_999)));
        // Ten digits go to i64 even when an i32 would do.
        assert_eq!(infer_number("1000000000"), Some(Number::I64(1_000_000_000)));
        assert_eq!(infer_number("-9223372036854775808"), Some(Number::I64(i64::MIN)));
        assert!(matches!(
            infer_number("123456789012345678901234"),
            Some(Number::Decimal(_))
        ));
        assert_eq!(infer_number("007"), None);
    }

    #[test]
    fn fractions_are_lossy() {
        let Some(Number::F64(x)) = infer_number("0.10000000000000000000001") else {
            panic!("expected f64");
        };
        assert_eq!(x, 0.1);
        assert_eq!(infer_number("1e3"), Some(Number::F64(1000.0)));
        assert_eq!(infer_number("1."), None);
    }

    #[test]
    fn strings() {
        let s = Settings::default();
        assert!(matches!(infer_string("/Date(0)/", &s), JsonValue::DateTime(_)));
        assert!(matches!(infer_string("2024-05-01", &s), JsonValue::DateTime(_)));
        assert!(matches!(
            infer_string("67e55044-10b1-426f-9247-bb680e5fe0c8", &s),
            JsonValue::Guid(_)
        ));
        // Looks like a date but is not one.
        assert_eq!(
            infer_string("2024-13-45", &s),
            JsonValue::String("2024-13-45".into())
        );
    }
}
