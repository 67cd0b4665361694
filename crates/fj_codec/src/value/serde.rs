use core::fmt;

use chrono::SecondsFormat;
use serde_core::de::{self, MapAccess, SeqAccess, Visitor};
use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use crate::primitives::Decimal;
use crate::value::{JsonMap, JsonValue, Number};

// -----------------------------------------------------------------------------
// Serialize

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::I32(n) => serializer.serialize_i32(*n),
            Self::I64(n) => serializer.serialize_i64(*n),
            Self::F64(x) => serializer.serialize_f64(*x),
            Self::Decimal(d) => d.serialize(serializer),
        }
    }
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::DateTime(d) => {
                serializer.serialize_str(&d.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Self::Guid(id) => serializer.collect_str(&id.hyphenated()),
            Self::Array(items) => serializer.collect_seq(items),
            Self::Object(map) => serializer.collect_map(map),
        }
    }
}

// -----------------------------------------------------------------------------
// Deserialize

struct DecimalVisitor;

impl Visitor<'_> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Decimal::new(v.into(), 0).ok_or_else(|| E::custom("decimal out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = JsonValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<JsonValue, D::Error> {
        JsonValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<JsonValue, E> {
        Ok(JsonValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(match i32::try_from(v) {
            Ok(n) => Number::I32(n),
            Err(_) => Number::I64(v),
        }))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JsonValue, E> {
        match i64::try_from(v) {
            Ok(n) => self.visit_i64(n),
            Err(_) => DecimalVisitor.visit_u64(v).map(|d| JsonValue::Number(Number::Decimal(d))),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(Number::F64(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v.into()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<JsonValue, E> {
        Ok(JsonValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<JsonValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(JsonValue::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<JsonValue, A::Error> {
        let mut members = JsonMap::with_capacity_and_hasher(
            map.size_hint().unwrap_or(0),
            Default::default(),
        );
        while let Some((key, value)) = map.next_entry::<String, JsonValue>()? {
            members.insert(key, value);
        }
        Ok(JsonValue::Object(members))
    }
}

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use crate::value::{JsonValue, Number};

    #[test]
    fn agrees_with_serde_json() {
        let text = r#"{"a":[1,-2,3.5,"x",null,true],"b":{"c":12345678901}}"#;
        let ours = crate::deserialize_any(text).unwrap();
        let theirs: JsonValue = serde_json::from_str(text).unwrap();
        assert_eq!(ours, theirs);

        let round: serde_json::Value = serde_json::to_value(&ours).unwrap();
        let expected: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(round, expected);
    }

    #[test]
    fn large_unsigned_becomes_decimal() {
        let value: JsonValue = serde_json::from_str("18446744073709551615").unwrap();
        let Some(Number::Decimal(d)) = value.as_number() else {
            panic!("expected a decimal");
        };
        assert_eq!(d.to_string(), "18446744073709551615");
    }
}
