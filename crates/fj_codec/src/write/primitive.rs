use core::any::Any;
use core::fmt::{self, Write};

use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::error::{JsonError, JsonResult};
use crate::info::downcast_ref;
use crate::primitives::{Decimal, PrimitiveKind};
use crate::primitives::{binary, date, float, guid, integer, text, time_span};
use crate::settings::Settings;

fn format_failed(kind: PrimitiveKind) -> impl FnOnce(fmt::Error) -> JsonError {
    move |_| JsonError::unsupported(kind.name(), "the value cannot be formatted")
}

fn write_quoted(out: &mut String, quote: char, f: impl FnOnce(&mut String)) {
    out.push(quote);
    f(out);
    out.push(quote);
}

/// Appends a primitive as a complete JSON token.
pub(crate) fn write_primitive(
    out: &mut String,
    kind: PrimitiveKind,
    value: &dyn Any,
    settings: &Settings,
) -> JsonResult<()> {
    let quote = settings.write_quote();
    match kind {
        PrimitiveKind::Bool => {
            out.push_str(if *downcast_ref::<bool>(value)? { "true" } else { "false" });
        }
        PrimitiveKind::I8 => integer::write_i64(out, (*downcast_ref::<i8>(value)?).into()),
        PrimitiveKind::I16 => integer::write_i64(out, (*downcast_ref::<i16>(value)?).into()),
        PrimitiveKind::I32 => integer::write_i64(out, (*downcast_ref::<i32>(value)?).into()),
        PrimitiveKind::I64 => integer::write_i64(out, *downcast_ref::<i64>(value)?),
        PrimitiveKind::Isize => integer::write_i64(out, *downcast_ref::<isize>(value)? as i64),
        PrimitiveKind::U8 => integer::write_u64(out, (*downcast_ref::<u8>(value)?).into()),
        PrimitiveKind::U16 => integer::write_u64(out, (*downcast_ref::<u16>(value)?).into()),
        PrimitiveKind::U32 => integer::write_u64(out, (*downcast_ref::<u32>(value)?).into()),
        PrimitiveKind::U64 => integer::write_u64(out, *downcast_ref::<u64>(value)?),
        PrimitiveKind::Usize => integer::write_u64(out, *downcast_ref::<usize>(value)? as u64),
        PrimitiveKind::F32 => {
            let x = *downcast_ref::<f32>(value)?;
            match float::non_finite_name(x.into()) {
                Some(name) => text::write_escaped(out, name, quote),
                None => float::write_f32(out, x),
            }
        }
        PrimitiveKind::F64 => write_f64(out, *downcast_ref::<f64>(value)?, quote),
        PrimitiveKind::Decimal => {
            write!(out, "{}", downcast_ref::<Decimal>(value)?).map_err(format_failed(kind))?;
        }
        PrimitiveKind::Char => {
            let mut buf = [0; 4];
            let c = downcast_ref::<char>(value)?.encode_utf8(&mut buf);
            text::write_escaped(out, c, quote);
        }
        PrimitiveKind::String => text::write_escaped(out, downcast_ref::<String>(value)?, quote),
        PrimitiveKind::DateTime => {
            date::write_utc(out, downcast_ref::<DateTime<Utc>>(value)?, settings)
                .map_err(format_failed(kind))?;
        }
        PrimitiveKind::NaiveDateTime => {
            date::write_naive(out, downcast_ref::<NaiveDateTime>(value)?, settings)
                .map_err(format_failed(kind))?;
        }
        PrimitiveKind::DateTimeOffset => {
            date::write_offset(out, downcast_ref::<DateTime<FixedOffset>>(value)?, settings)
                .map_err(format_failed(kind))?;
        }
        PrimitiveKind::TimeSpan => {
            let span = *downcast_ref::<TimeDelta>(value)?;
            write_quoted(out, quote, |out| time_span::write(out, span));
        }
        PrimitiveKind::Guid => {
            let id = downcast_ref::<Uuid>(value)?;
            write_quoted(out, quote, |out| guid::write(out, id));
        }
        PrimitiveKind::Bytes => {
            let bytes = downcast_ref::<Bytes>(value)?;
            write_quoted(out, quote, |out| binary::write(out, bytes));
        }
    }
    Ok(())
}

/// Appends an `f64`, writing non-finite values as strings.
pub(crate) fn write_f64(out: &mut String, x: f64, quote: char) {
    match float::non_finite_name(x) {
        Some(name) => text::write_escaped(out, name, quote),
        None => float::write_f64(out, x),
    }
}

/// Appends a primitive as an object key, which is always quoted.
pub(crate) fn write_key(
    out: &mut String,
    kind: PrimitiveKind,
    value: &dyn Any,
    settings: &Settings,
) -> JsonResult<()> {
    let quote = settings.write_quote();
    if matches!(
        kind,
        PrimitiveKind::Bool
            | PrimitiveKind::I8
            | PrimitiveKind::I16
            | PrimitiveKind::I32
            | PrimitiveKind::I64
            | PrimitiveKind::Isize
            | PrimitiveKind::U8
            | PrimitiveKind::U16
            | PrimitiveKind::U32
            | PrimitiveKind::U64
            | PrimitiveKind::Usize
            | PrimitiveKind::Decimal
    ) {
        out.push(quote);
        write_primitive(out, kind, value, settings)?;
        out.push(quote);
        return Ok(());
    }

    let start = out.len();
    write_primitive(out, kind, value, settings)?;
    if !out[start..].starts_with(quote) {
        out.insert(start, quote);
        out.push(quote);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{write_key, write_primitive};
    use crate::primitives::PrimitiveKind;
    use crate::settings::{DateFormat, QuoteChar, Settings};

    fn written(kind: PrimitiveKind, value: &dyn core::any::Any, settings: &Settings) -> String {
        let mut out = String::new();
        write_primitive(&mut out, kind, value, settings).unwrap();
        out
    }

    #[test]
    fn numbers_and_booleans_are_bare() {
        let s = Settings::default();
        assert_eq!(written(PrimitiveKind::I8, &-128_i8, &s), "-128");
        assert_eq!(written(PrimitiveKind::U64, &u64::MAX, &s), "18446744073709551615");
        assert_eq!(written(PrimitiveKind::Bool, &true, &s), "true");
        assert_eq!(written(PrimitiveKind::F64, &1.5_f64, &s), "1.5");
        assert_eq!(written(PrimitiveKind::F64, &f64::NAN, &s), r#""NaN""#);
        assert_eq!(written(PrimitiveKind::F32, &f32::NEG_INFINITY, &s), r#""-Infinity""#);
    }

    #[test]
    fn strings_use_the_active_quote() {
        let s = Settings::default().with_quote_char(QuoteChar::Single);
        assert_eq!(written(PrimitiveKind::String, &String::from("it's"), &s), r"'it\'s'");
        assert_eq!(written(PrimitiveKind::Char, &'x', &s), "'x'");
    }

    #[test]
    fn keys_are_always_quoted() {
        let mut out = String::new();
        let s = Settings::default().with_date_format(DateFormat::EpochMilliseconds);
        write_key(&mut out, PrimitiveKind::I32, &7_i32, &s).unwrap();
        out.push(' ');
        let date = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap();
        write_key(&mut out, PrimitiveKind::DateTime, &date, &s).unwrap();
        out.push(' ');
        write_key(&mut out, PrimitiveKind::F64, &f64::INFINITY, &s).unwrap();
        assert_eq!(out, r#""7" "1000" "Infinity""#);
    }

    #[test]
    fn wrong_value_type_is_an_error() {
        let mut out = String::new();
        let err = write_primitive(&mut out, PrimitiveKind::I32, &1_u8, &Settings::default());
        assert!(err.is_err());
    }
}
