use core::any::Any;
use core::fmt;

use crate::info::{BoxedValue, JsonType};
use crate::value::JsonValue;

/// A polymorphic member.
///
/// Written as whatever it holds. On read, an object whose `$type` names a
/// compiled type becomes [`Dynamic::Typed`]. Anything else becomes
/// [`Dynamic::Value`], or [`Dynamic::Null`] for `null`.
///
/// The types that may be held should be listed with
/// `#[json(known_types(...))]` on the member or its parent type, so that
/// they are compiled together with it.
///
/// # Examples
///
/// ```
/// use fj_codec::settings::Settings;
/// use fj_codec::value::Dynamic;
/// use fj_codec::Json;
///
/// #[derive(Json, Default, Debug, PartialEq)]
/// #[json(type_name = "circle")]
/// pub struct Circle {
///     pub radius: f64,
/// }
///
/// #[derive(Json, Default)]
/// #[json(type_name = "drawing")]
/// pub struct Drawing {
///     #[json(known_types(Circle))]
///     pub shape: Dynamic,
/// }
///
/// let settings = Settings::default().with_type_discriminator(true);
/// let drawing = Drawing { shape: Dynamic::typed(Circle { radius: 2.0 }) };
///
/// let text = fj_codec::serialize_with(&drawing, &settings).unwrap();
/// assert_eq!(text, r#"{"$type":"drawing","shape":{"$type":"circle","radius":2}}"#);
///
/// let back: Drawing = fj_codec::deserialize_with(&text, &settings).unwrap();
/// assert_eq!(back.shape.downcast_ref::<Circle>(), Some(&Circle { radius: 2.0 }));
/// ```
#[derive(Default)]
pub enum Dynamic {
    #[default]
    Null,
    Value(JsonValue),
    Typed(BoxedValue),
}

impl Dynamic {
    /// Wraps an instance of a compiled type.
    #[inline]
    pub fn typed<T: JsonType>(value: T) -> Self {
        Self::Typed(Box::new(value))
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The held instance, if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Typed(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            Self::Typed(value) => value.downcast_mut::<T>(),
            _ => None,
        }
    }

    /// The held tree, if any.
    pub fn as_value(&self) -> Option<&JsonValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl From<JsonValue> for Dynamic {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            value => Self::Value(value),
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Typed(_) => f.write_str("Typed(..)"),
        }
    }
}
