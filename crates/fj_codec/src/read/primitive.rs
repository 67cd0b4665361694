use core::any::Any;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::error::JsonResult;
use crate::info::{EnumInfo, downcast_mut};
use crate::primitives::{Decimal, PrimitiveKind};
use crate::primitives::{binary, date, float, guid, integer, time_span};
use crate::settings::Settings;

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn text_only<T>(quoted: bool, text: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    if quoted { parse(text) } else { None }
}

/// Parses token text into `target`.
///
/// `quoted` tells whether the text was a string. Numbers and booleans are
/// accepted either way. Text-only kinds require quotes. Dates also accept a
/// bare epoch number.
///
/// Returns `Ok(false)` when the text does not convert.
pub(crate) fn parse_primitive(
    kind: PrimitiveKind,
    text: &str,
    quoted: bool,
    target: &mut dyn Any,
    settings: &Settings,
) -> JsonResult<bool> {
    macro_rules! assign {
        ($ty:ty, $parsed:expr) => {{
            let slot = downcast_mut::<$ty>(target)?;
            match $parsed {
                Some(value) => {
                    *slot = value;
                    true
                }
                None => false,
            }
        }};
    }

    Ok(match kind {
        PrimitiveKind::Bool => assign!(
            bool,
            match text {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            }
        ),
        PrimitiveKind::I8 => assign!(i8, integer::parse_i8(text)),
        PrimitiveKind::I16 => assign!(i16, integer::parse_i16(text)),
        PrimitiveKind::I32 => assign!(i32, integer::parse_i32(text)),
        PrimitiveKind::I64 => assign!(i64, integer::parse_i64(text)),
        PrimitiveKind::Isize => assign!(isize, integer::parse_isize(text)),
        PrimitiveKind::U8 => assign!(u8, integer::parse_u8(text)),
        PrimitiveKind::U16 => assign!(u16, integer::parse_u16(text)),
        PrimitiveKind::U32 => assign!(u32, integer::parse_u32(text)),
        PrimitiveKind::U64 => assign!(u64, integer::parse_u64(text)),
        PrimitiveKind::Usize => assign!(usize, integer::parse_usize(text)),
        PrimitiveKind::F32 => assign!(f32, float::parse_f32(text)),
        PrimitiveKind::F64 => assign!(f64, float::parse_f64(text)),
        PrimitiveKind::Decimal => assign!(Decimal, text.parse::<Decimal>().ok()),
        PrimitiveKind::Char => assign!(char, text_only(quoted, text, single_char)),
        PrimitiveKind::String => {
            let slot = downcast_mut::<String>(target)?;
            if quoted {
                slot.clear();
                slot.push_str(text);
            }
            quoted
        }
        PrimitiveKind::DateTime => assign!(DateTime<Utc>, date::parse_utc(text, settings)),
        PrimitiveKind::NaiveDateTime => {
            assign!(NaiveDateTime, date::parse_naive(text, settings))
        }
        PrimitiveKind::DateTimeOffset => {
            assign!(DateTime<FixedOffset>, date::parse_offset(text, settings))
        }
        PrimitiveKind::TimeSpan => assign!(TimeDelta, text_only(quoted, text, time_span::parse)),
        PrimitiveKind::Guid => assign!(Uuid, text_only(quoted, text, guid::parse)),
        PrimitiveKind::Bytes => assign!(Bytes, text_only(quoted, text, binary::parse)),
    })
}

/// Finds an enum variant by name or by number.
///
/// Names are tried first, under the given case sensitivity.
pub(crate) fn parse_variant(info: &EnumInfo, text: &str, case_sensitive: bool) -> Option<usize> {
    let variants = info.variants();
    let by_name = if case_sensitive {
        variants.iter().position(|v| v.name == text)
    } else {
        variants.iter().position(|v| v.name.eq_ignore_ascii_case(text))
    };
    by_name.or_else(|| {
        let value = integer::parse_i64(text)?;
        variants.iter().position(|v| v.value == value)
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::{parse_primitive, single_char};
    use crate::primitives::{Decimal, PrimitiveKind};
    use crate::settings::Settings;

    #[test]
    fn numbers_accept_quotes() {
        let s = Settings::default();
        let mut n = 0_i32;
        assert!(parse_primitive(PrimitiveKind::I32, "42", false, &mut n, &s).unwrap());
        assert_eq!(n, 42);
        assert!(parse_primitive(PrimitiveKind::I32, "-7", true, &mut n, &s).unwrap());
        assert_eq!(n, -7);
        assert!(!parse_primitive(PrimitiveKind::I32, "4.5", false, &mut n, &s).unwrap());
        assert!(!parse_primitive(PrimitiveKind::U8, "256", false, &mut 0_u8, &s).unwrap());

        let mut d = Decimal::ZERO;
        assert!(parse_primitive(PrimitiveKind::Decimal, "1.50", false, &mut d, &s).unwrap());
        assert_eq!(d.to_string(), "1.50");
    }

    #[test]
    fn text_kinds_require_quotes() {
        let s = Settings::default();
        let mut text = String::from("old");
        assert!(!parse_primitive(PrimitiveKind::String, "12", false, &mut text, &s).unwrap());
        assert_eq!(text, "old");
        assert!(parse_primitive(PrimitiveKind::String, "new", true, &mut text, &s).unwrap());
        assert_eq!(text, "new");

        let mut span = TimeDelta::zero();
        assert!(parse_primitive(PrimitiveKind::TimeSpan, "01:00:00", true, &mut span, &s).unwrap());
        assert_eq!(span, TimeDelta::hours(1));
    }

    #[test]
    fn wrong_target_is_an_error() {
        let s = Settings::default();
        assert!(parse_primitive(PrimitiveKind::I64, "1", false, &mut 0_i32, &s).is_err());
    }

    #[test]
    fn chars() {
        assert_eq!(single_char("é"), Some('é'));
        assert_eq!(single_char("ab"), None);
        assert_eq!(single_char(""), None);
    }
}
