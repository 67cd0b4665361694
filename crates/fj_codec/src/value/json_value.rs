use chrono::{DateTime, FixedOffset};
use fj_utils::hash::HashMap;
use uuid::Uuid;

use crate::primitives::Decimal;

/// The members of an untyped object. Enumeration order is unspecified.
pub type JsonMap = HashMap<String, JsonValue>;

// -----------------------------------------------------------------------------
// Number

/// A number of an untyped tree, in the narrowest inferred representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I32(i32),
    I64(i64),
    F64(f64),
    Decimal(Decimal),
}

impl Number {
    /// The value as an `i64`, if it is an integer.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::I32(n) => Some(n.into()),
            Self::I64(n) => Some(n),
            Self::F64(_) => None,
            Self::Decimal(d) => {
                let d = d.normalize();
                if d.scale() == 0 {
                    i64::try_from(d.mantissa()).ok()
                } else {
                    None
                }
            }
        }
    }

    /// The value as an `f64`, possibly rounded.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::I32(n) => n.into(),
            Self::I64(n) => n as f64,
            Self::F64(x) => x,
            Self::Decimal(d) => d.to_f64(),
        }
    }
}

// -----------------------------------------------------------------------------
// JsonValue

/// An untyped JSON tree.
///
/// String leaves that look like dates or guids are read as such. See
/// [`infer`](crate::value::infer).
///
/// # Examples
///
/// ```
/// use fj_codec::value::{JsonValue, Number};
///
/// let value = fj_codec::deserialize_any(r#"{"id":7,"tags":["a",null]}"#).unwrap();
/// assert_eq!(value.get("id"), Some(&JsonValue::Number(Number::I32(7))));
///
/// let tags = value.get("tags").and_then(JsonValue::as_array).unwrap();
/// assert_eq!(tags[0].as_str(), Some("a"));
/// assert!(tags[1].is_null());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    DateTime(DateTime<FixedOffset>),
    Guid(Uuid),
    Array(Vec<JsonValue>),
    Object(JsonMap),
}

impl JsonValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonMap> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// The member `key` of an object.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object()?.get(key)
    }

    /// A short lowercase name of the variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::DateTime(_) => "date-time",
            Self::Guid(_) => "guid",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from {
    ($($ty:ty => |$v:ident| $expr:expr;)*) => {
        $(
            impl From<$ty> for JsonValue {
                #[inline]
                fn from($v: $ty) -> Self {
                    $expr
                }
            }
        )*
    };
}

impl_from! {
    bool => |v| Self::Bool(v);
    i32 => |v| Self::Number(Number::I32(v));
    i64 => |v| Self::Number(Number::I64(v));
    f64 => |v| Self::Number(Number::F64(v));
    Decimal => |v| Self::Number(Number::Decimal(v));
    Number => |v| Self::Number(v);
    String => |v| Self::String(v);
    &str => |v| Self::String(v.into());
    DateTime<FixedOffset> => |v| Self::DateTime(v);
    Uuid => |v| Self::Guid(v);
    Vec<JsonValue> => |v| Self::Array(v);
    JsonMap => |v| Self::Object(v);
}

impl<T: Into<JsonValue>> From<Option<T>> for JsonValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl FromIterator<JsonValue> for JsonValue {
    fn from_iter<I: IntoIterator<Item = JsonValue>>(iter: I) -> Self {
        Self::Array(iter.into_iter().collect())
    }
}

impl FromIterator<(String, JsonValue)> for JsonValue {
    fn from_iter<I: IntoIterator<Item = (String, JsonValue)>>(iter: I) -> Self {
        Self::Object(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonValue, Number};
    use crate::primitives::Decimal;

    #[test]
    fn number_views() {
        assert_eq!(Number::I32(-3).as_i64(), Some(-3));
        assert_eq!(Number::F64(1.5).as_i64(), None);
        let d: Decimal = "12.00".parse().unwrap();
        assert_eq!(Number::Decimal(d).as_i64(), Some(12));
        assert_eq!(Number::I64(1 << 40).as_f64(), (1_u64 << 40) as f64);
    }

    #[test]
    fn collect_into_values() {
        let array: JsonValue = [1, 2].into_iter().map(JsonValue::from).collect();
        assert_eq!(array.as_array().map(<[_]>::len), Some(2));

        let object: JsonValue = [("a".to_owned(), JsonValue::from("x"))]
            .into_iter()
            .collect();
        assert_eq!(object.get("a").and_then(JsonValue::as_str), Some("x"));
        assert_eq!(JsonValue::from(None::<i32>), JsonValue::Null);
    }
}
