use fj_utils::tuple_invoke;

use crate::info::{FieldInfo, GenericDescriptorCell, JsonType, TupleInfo, TypeDescriptor};
use crate::info::{downcast_mut, downcast_ref};

macro_rules! impl_tuple {
    ($len:tt: [$($idx:tt : $ty:ident),*]) => {
        impl<$($ty: JsonType + Default),*> JsonType for ($($ty,)*) {
            fn descriptor() -> &'static TypeDescriptor {
                static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeDescriptor::of::<Self>().with_positional(TupleInfo::new(vec![$(
                        FieldInfo::new::<$ty>(
                            |v| Ok(&downcast_ref::<Self>(v)?.$idx),
                            |v| Ok(&mut downcast_mut::<Self>(v)?.$idx),
                        ),
                    )*]))
                })
            }
        }
    };
}

tuple_invoke!(
    impl_tuple,
    [
        0: T0, 1: T1, 2: T2, 3: T3, 4: T4, 5: T5,
        6: T6, 7: T7, 8: T8, 9: T9, 10: T10, 11: T11
    ]
);

#[cfg(test)]
mod tests {
    use crate::registry::CodecRegistry;
    use crate::settings::Settings;

    #[test]
    fn written_as_arrays() {
        let registry = CodecRegistry::new();
        let s = Settings::default();

        let value = (1_u8, "two".to_owned(), Some(3.5_f64));
        let text = registry.serialize(&value, &s).unwrap();
        assert_eq!(text, r#"[1,"two",3.5]"#);
        assert_eq!(registry.deserialize::<(u8, String, Option<f64>)>(&text, &s).unwrap(), value);

        assert_eq!(registry.serialize(&(), &s).unwrap(), "[]");
    }

    #[test]
    fn list_of_pairs() {
        let registry = CodecRegistry::new();
        let s = Settings::default();

        let pairs = vec![("a".to_owned(), 1_i32), ("b".to_owned(), 2)];
        let text = registry.serialize(&pairs, &s).unwrap();
        assert_eq!(text, r#"[["a",1],["b",2]]"#);
        assert_eq!(registry.deserialize::<Vec<(String, i32)>>(&text, &s).unwrap(), pairs);
    }
}
