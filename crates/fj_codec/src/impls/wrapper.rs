use core::any::Any;

use crate::info::{BoxedInfo, GenericDescriptorCell, JsonType, NullableInfo, TypeDescriptor};
use crate::info::{downcast_mut, downcast_ref};

impl<T: JsonType + Default> JsonType for Option<T> {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::of::<Self>()
                .with_is_default(|v| v.downcast_ref::<Self>().is_some_and(Option::is_none))
                .with_nullable(NullableInfo::new::<T>(
                    |v| Ok(downcast_ref::<Self>(v)?.as_ref().map(|x| x as &dyn Any)),
                    |v| Ok(downcast_mut::<Self>(v)?.get_or_insert_with(T::default)),
                    |v| {
                        *downcast_mut::<Self>(v)? = None;
                        Ok(())
                    },
                ))
        })
    }
}

impl<T: JsonType + Default> JsonType for Box<T> {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::of::<Self>().with_boxed(BoxedInfo::new::<T>(
                |v| Ok(&**downcast_ref::<Self>(v)?),
                |v| Ok(&mut **downcast_mut::<Self>(v)?),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::CodecRegistry;
    use crate::settings::Settings;

    #[test]
    fn null_root() {
        let registry = CodecRegistry::new();
        let s = Settings::default();

        let text = registry.serialize(&None::<Vec<i32>>, &s).unwrap();
        assert_eq!(text, "null");
        assert_eq!(registry.deserialize::<Option<Vec<i32>>>(&text, &s).unwrap(), None);
        assert_eq!(
            registry.deserialize::<Option<Vec<i32>>>(" [7] ", &s).unwrap(),
            Some(vec![7])
        );
    }

    #[test]
    fn boxes_are_transparent() {
        let registry = CodecRegistry::new();
        let s = Settings::default();

        let text = registry.serialize(&Box::new(vec![1_u8]), &s).unwrap();
        assert_eq!(text, "[1]");
        assert!(registry.deserialize::<Box<Vec<u8>>>("{}", &s).unwrap_err().is_invalid_json());
    }
}
