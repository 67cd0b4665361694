use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::info::{DescriptorCell, JsonType, TypeDescriptor};
use crate::primitives::{Decimal, PrimitiveKind};

macro_rules! impl_primitive {
    ($($ty:ty => $kind:ident,)*) => {$(
        impl JsonType for $ty {
            fn descriptor() -> &'static TypeDescriptor {
                static CELL: DescriptorCell = DescriptorCell::new();
                CELL.get_or_init(|| {
                    TypeDescriptor::of::<$ty>()
                        .with_default_eq::<$ty>()
                        .with_primitive(PrimitiveKind::$kind)
                })
            }
        }
    )*};
}

impl_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    char => Char,
    String => String,
    DateTime<Utc> => DateTime,
    NaiveDateTime => NaiveDateTime,
    DateTime<FixedOffset> => DateTimeOffset,
    TimeDelta => TimeSpan,
    Uuid => Guid,
    Bytes => Bytes,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use uuid::Uuid;

    use crate::info::{JsonType, TypeRef};
    use crate::registry::CodecRegistry;
    use crate::settings::Settings;

    #[test]
    fn defaults() {
        assert!(i32::descriptor().is_default(&0_i32));
        assert!(!i32::descriptor().is_default(&1_i32));
        assert!(String::descriptor().is_default(&String::new()));
        assert!(TimeDelta::descriptor().is_default(&TimeDelta::zero()));
        assert!(Uuid::descriptor().is_default(&Uuid::nil()));
        // A value of another type is never the default.
        assert!(!i32::descriptor().is_default(&0_i64));
    }

    #[test]
    fn round_trips() {
        let registry = CodecRegistry::new();
        let s = Settings::default();

        let date = Utc.with_ymd_and_hms(2024, 2, 29, 13, 5, 9).unwrap();
        let text = registry.serialize(&date, &s).unwrap();
        assert_eq!(registry.deserialize::<chrono::DateTime<Utc>>(&text, &s).unwrap(), date);

        let span = TimeDelta::seconds(-90_061);
        let text = registry.serialize(&span, &s).unwrap();
        assert_eq!(registry.deserialize::<TimeDelta>(&text, &s).unwrap(), span);

        let id = Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0);
        let text = registry.serialize(&id, &s).unwrap();
        assert_eq!(text, r#""12345678-9abc-def0-1234-56789abcdef0""#);
        assert_eq!(registry.deserialize::<Uuid>(&text, &s).unwrap(), id);

        assert_eq!(registry.serialize(&'é', &s).unwrap(), r#""é""#);
        assert_eq!(registry.deserialize::<char>(r#""é""#, &s).unwrap(), 'é');
        assert!(registry.contains(TypeRef::of::<char>()));
    }
}
