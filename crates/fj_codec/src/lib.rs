#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Derive expansions name this crate by an absolute path, which must also
// resolve inside the crate and its doctests.
extern crate self as fj_codec;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod impls;

pub mod info;
pub mod primitives;
pub mod read;
pub mod registry;
pub mod settings;
pub mod shape;
pub mod value;
pub mod write;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use error::{JsonError, JsonResult};
pub use fj_codec_derive::Json;
pub use info::JsonType;

use core::any::Any;
use std::io;

use info::{BoxedValue, TypeRef};
use registry::CodecRegistry;
use settings::Settings;
use value::JsonValue;

// -----------------------------------------------------------------------------
// Free functions

/// Serializes `value` with this thread's current [`Settings`].
///
/// Uses the process-wide [`CodecRegistry::shared`].
///
/// # Examples
///
/// ```
/// use fj_codec::Json;
///
/// #[derive(Json, Default)]
/// pub struct User {
///     pub name: String,
///     pub age: Option<u8>,
/// }
///
/// let user = User { name: "Ann".into(), age: None };
/// assert_eq!(fj_codec::serialize(&user).unwrap(), r#"{"name":"Ann","age":null}"#);
/// ```
pub fn serialize<T: JsonType>(value: &T) -> JsonResult<String> {
    Settings::with_current(|settings| serialize_with(value, settings))
}

pub fn serialize_with<T: JsonType>(value: &T, settings: &Settings) -> JsonResult<String> {
    CodecRegistry::shared().serialize(value, settings)
}

/// Appends the serialized `value` to `out`, with the current settings.
pub fn serialize_into<T: JsonType>(value: &T, out: &mut String) -> JsonResult<()> {
    let codec = CodecRegistry::shared().codec::<T>()?;
    Settings::with_current(|settings| codec.write_into(value, out, settings))
}

/// Serializes `value` into an [`io::Write`], with the current settings.
pub fn to_writer<W: io::Write, T: JsonType>(mut writer: W, value: &T) -> JsonResult<()> {
    let text = serialize(value)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Deserializes a `T` with this thread's current [`Settings`].
///
/// # Examples
///
/// ```
/// use fj_codec::Json;
///
/// #[derive(Json, Default, Debug, PartialEq)]
/// pub struct User {
///     #[json(rename = "Name")]
///     pub name: String,
/// }
///
/// let user: User = fj_codec::deserialize(r#"{"unknownField":123,"Name":"A"}"#).unwrap();
/// assert_eq!(user, User { name: "A".into() });
/// ```
pub fn deserialize<T: JsonType>(text: &str) -> JsonResult<T> {
    Settings::with_current(|settings| deserialize_with(text, settings))
}

pub fn deserialize_with<T: JsonType>(text: &str, settings: &Settings) -> JsonResult<T> {
    CodecRegistry::shared().deserialize(text, settings)
}

/// Reads all of `reader` and deserializes a `T` with the current settings.
pub fn from_reader<R: io::Read, T: JsonType>(mut reader: R) -> JsonResult<T> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    deserialize(&text)
}

/// Serializes a value whose type is given by a runtime token.
pub fn serialize_dyn(value: &dyn Any, ty: TypeRef) -> JsonResult<String> {
    Settings::with_current(|settings| CodecRegistry::shared().serialize_dyn(value, ty, settings))
}

/// Deserializes into the type given by a runtime token.
///
/// # Examples
///
/// ```
/// use fj_codec::info::TypeRef;
///
/// let value = fj_codec::deserialize_dyn("[1,2]", TypeRef::of::<Vec<u32>>()).unwrap();
/// assert_eq!(value.downcast_ref::<Vec<u32>>(), Some(&vec![1, 2]));
/// ```
pub fn deserialize_dyn(text: &str, ty: TypeRef) -> JsonResult<BoxedValue> {
    Settings::with_current(|settings| CodecRegistry::shared().deserialize_dyn(text, ty, settings))
}

/// Deserializes into an untyped tree, inferring scalar types.
pub fn deserialize_any(text: &str) -> JsonResult<JsonValue> {
    Settings::with_current(|settings| CodecRegistry::shared().deserialize_any(text, settings))
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use std::collections::HashMap;

    use bytes::Bytes;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use uuid::Uuid;

    use crate::primitives::Decimal;
    use crate::registry::CodecRegistry;
    use crate::settings::{DateFormat, QuoteChar, Settings, TimeZoneFormat};
    use crate::value::{Dynamic, JsonValue};
    use crate::Json;

    #[derive(Json, Default, Debug, PartialEq)]
    pub struct Record {
        #[json(rename = "ID")]
        pub id: i32,
        #[json(rename = "Name")]
        pub name: String,
    }

    #[derive(Json, Default, Debug, PartialEq, Eq, Hash, Clone, Copy)]
    pub enum Status {
        #[default]
        Draft,
        Placed,
        Shipped = 10,
    }

    #[derive(Json, Default, Debug, PartialEq)]
    pub struct Line {
        pub sku: String,
        pub quantity: u32,
        pub price: Decimal,
    }

    #[derive(Json, Default, Debug, PartialEq)]
    pub struct Order {
        pub id: Uuid,
        pub placed_at: DateTime<Utc>,
        pub status: Status,
        pub lines: Vec<Line>,
        pub tags: BTreeMap<String, i64>,
        pub note: Option<String>,
        pub ratio: f64,
        pub payload: Bytes,
        pub wait: TimeDelta,
        pub by_status: HashMap<Status, u8>,
    }

    fn order() -> Order {
        Order {
            id: Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef),
            placed_at: Utc.with_ymd_and_hms(2023, 7, 14, 9, 30, 0).unwrap(),
            status: Status::Shipped,
            lines: vec![
                Line {
                    sku: "A-1 \"quoted\" 'single'".into(),
                    quantity: 2,
                    price: "19.99".parse().unwrap(),
                },
                Line::default(),
            ],
            tags: BTreeMap::from([("priority".into(), -3), ("zone".into(), 12_000_000_000)]),
            note: Some("línea\nnueva".into()),
            ratio: 0.125,
            payload: Bytes::from_static(b"\x00\x01binary\xff"),
            wait: TimeDelta::milliseconds(90_500),
            by_status: HashMap::from([(Status::Placed, 1)]),
        }
    }

    #[test]
    fn scenario_skip_defaults() {
        let registry = CodecRegistry::new();
        let s = Settings::default().with_skip_defaults(true);

        let record = Record { id: 100, name: "Test".into() };
        let text = registry.serialize(&record, &s).unwrap();
        assert_eq!(text, r#"{"ID":100,"Name":"Test"}"#);
        assert_eq!(registry.deserialize::<Record>(&text, &s).unwrap(), record);
    }

    #[test]
    fn scenario_null_root() {
        let registry = CodecRegistry::new();
        let s = Settings::default();

        let text = registry.serialize(&None::<Record>, &s).unwrap();
        assert_eq!(text, "null");
        assert_eq!(registry.deserialize::<Option<Record>>(&text, &s).unwrap(), None);
    }

    #[test]
    fn default_members() {
        let registry = CodecRegistry::new();
        let empty = Order::default();

        let skipping = Settings::default().with_skip_defaults(true);
        assert_eq!(registry.serialize(&empty, &skipping).unwrap(), "{}");

        let text = registry.serialize(&empty, &Settings::default()).unwrap();
        for name in ["id", "placed_at", "status", "lines", "note", "ratio", "wait"] {
            assert!(text.contains(&format!("\"{name}\":")), "{name} missing in {text}");
        }
        assert!(text.contains(r#""note":null"#));
        assert!(text.contains(r#""status":0"#));
    }

    #[test]
    fn round_trips_across_settings() {
        let registry = CodecRegistry::new();
        let all = [
            Settings::default(),
            Settings::default().with_skip_defaults(true),
            Settings::default().with_enum_as_string(true),
            Settings::default().with_camel_case(true),
            Settings::default().with_pretty_print(true),
            Settings::default().with_type_discriminator(true),
            Settings::default().with_quote_char(QuoteChar::Single),
            Settings::default().with_date_format(DateFormat::Legacy),
            Settings::default().with_date_format(DateFormat::EpochMilliseconds),
            Settings::default().with_time_zone(TimeZoneFormat::Utc),
            Settings::default().with_time_zone(TimeZoneFormat::Local),
            Settings::default()
                .with_date_format(DateFormat::Legacy)
                .with_time_zone(TimeZoneFormat::Local),
            Settings::default().with_case_sensitive(false),
        ];

        let original = order();
        for s in &all {
            let text = registry.serialize(&original, s).unwrap();
            let back: Order = registry
                .deserialize(&text, s)
                .unwrap_or_else(|err| panic!("{s:?}: {err}\n{text}"));
            assert_eq!(back, original, "{s:?}");

            if s.quote_char != Some(QuoteChar::Single) {
                serde_json::from_str::<serde_json::Value>(&text)
                    .unwrap_or_else(|err| panic!("{s:?}: {err}\n{text}"));
            }
        }
    }

    #[test]
    fn malformed_dates_are_conversion_errors() {
        let registry = CodecRegistry::new();
        let max_millis = chrono::NaiveDateTime::MAX.and_utc().timestamp_millis();
        let texts = [
            r#""\/Date(0+1é2)\/""#.to_owned(),
            r#""\/Date(0+12:0)\/""#.to_owned(),
            format!(r#""\/Date({max_millis}+2359)\/""#),
        ];
        for s in [
            Settings::default(),
            Settings::default().with_time_zone(TimeZoneFormat::Local),
        ] {
            for text in &texts {
                let err = registry.deserialize::<DateTime<Utc>>(text, &s).unwrap_err();
                assert!(err.is_conversion(), "{text}: {err}");
            }
        }
    }

    #[test]
    fn discriminated_objects() {
        let registry = CodecRegistry::new();
        let s = Settings::default().with_type_discriminator(true);

        let text = registry.serialize(&Record { id: 1, name: "a".into() }, &s).unwrap();
        assert_eq!(text, r#"{"$type":"fj_codec::tests::Record","ID":1,"Name":"a"}"#);
        assert!(registry.get_with_type_name("fj_codec::tests::Record").is_some());

        let value: Dynamic = registry.deserialize(&text, &s).unwrap();
        assert_eq!(
            value.downcast_ref::<Record>(),
            Some(&Record { id: 1, name: "a".into() })
        );

        let unknown: Dynamic = registry.deserialize(r#"{"$type":"nowhere","x":1}"#, &s).unwrap();
        let untyped = unknown.as_value().unwrap();
        assert_eq!(untyped.get("x").and_then(JsonValue::as_i64), Some(1));
    }

    #[test]
    fn io_adapters() {
        let lines = vec![Line { sku: "x".into(), quantity: 1, price: Decimal::ZERO }];

        let mut out = Vec::new();
        crate::to_writer(&mut out, &lines).unwrap();
        assert_eq!(out, br#"[{"sku":"x","quantity":1,"price":0}]"#);

        let back: Vec<Line> = crate::from_reader(out.as_slice()).unwrap();
        assert_eq!(back, lines);

        let mut text = String::from("lines=");
        crate::serialize_into(&lines, &mut text).unwrap();
        assert_eq!(text, r#"lines=[{"sku":"x","quantity":1,"price":0}]"#);
    }

    #[test]
    fn current_settings_apply() {
        let list = vec![Status::Placed];
        Settings::set_current(Settings::default().with_enum_as_string(true));
        let text = crate::serialize(&list);
        Settings::set_current(Settings::default());

        assert_eq!(text.unwrap(), r#"["Placed"]"#);
        assert_eq!(crate::serialize(&list).unwrap(), "[1]");
    }

    #[test]
    fn untyped_documents() {
        let value = crate::deserialize_any(r#"{"All":{"ym":"ss"},"n":[1,2.5,null]}"#).unwrap();
        assert_eq!(
            value.get("All").and_then(|all| all.get("ym")).and_then(JsonValue::as_str),
            Some("ss")
        );
        let n = value.get("n").and_then(JsonValue::as_array).unwrap();
        assert_eq!(n[1].as_f64(), Some(2.5));
        assert!(n[2].is_null());
    }
}
