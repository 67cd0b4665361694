use alloc::collections::BTreeMap;
use core::any::Any;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use fj_utils::hash::hashbrown;

use crate::info::{GenericDescriptorCell, JsonType, MapInfo, TypeDescriptor};
use crate::info::{downcast_mut, downcast_ref, unbox};

macro_rules! impl_map {
    ($ty:ty, [$($bound:tt)*] $(, $hasher:ident)?) => {
        impl<K, V $(, $hasher)?> JsonType for $ty
        where
            K: JsonType + Default + $($bound)*,
            V: JsonType + Default,
            $($hasher: BuildHasher + Default + Send + Sync + 'static,)?
        {
            fn descriptor() -> &'static TypeDescriptor {
                static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeDescriptor::of::<Self>()
                        .with_is_default(|v| v.downcast_ref::<Self>().is_some_and(|m| m.is_empty()))
                        .with_associative(MapInfo::new::<K, V>(
                            |v| Ok(downcast_ref::<Self>(v)?.len()),
                            |v| {
                                let map = downcast_ref::<Self>(v)?;
                                Ok(Box::new(map.iter().map(|(k, v)| (k as &dyn Any, v as &dyn Any))))
                            },
                            |v| {
                                downcast_mut::<Self>(v)?.clear();
                                Ok(())
                            },
                            |v, key| {
                                let slot = downcast_mut::<Self>(v)?.entry(unbox::<K>(key)?).or_default();
                                // A repeated key starts over.
                                *slot = V::default();
                                Ok(slot)
                            },
                        ))
                })
            }
        }
    };
}

impl_map!(HashMap<K, V, S>, [Eq + Hash], S);
impl_map!(hashbrown::HashMap<K, V, S>, [Eq + Hash], S);
impl_map!(BTreeMap<K, V>, [Ord]);

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;

    use fj_utils::hash::HashMap;

    use crate::registry::CodecRegistry;
    use crate::settings::Settings;

    #[test]
    fn ordered_keys() {
        let registry = CodecRegistry::new();
        let s = Settings::default();

        let map = BTreeMap::from([(2_u8, "b".to_owned()), (1, "a".to_owned())]);
        let text = registry.serialize(&map, &s).unwrap();
        assert_eq!(text, r#"{"1":"a","2":"b"}"#);
        assert_eq!(registry.deserialize::<BTreeMap<u8, String>>(&text, &s).unwrap(), map);
    }

    #[test]
    fn later_duplicates_win() {
        let registry = CodecRegistry::new();
        let s = Settings::default();

        let map: HashMap<String, Vec<i32>> =
            registry.deserialize(r#"{"a":[1,2],"a":[3]}"#, &s).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], vec![3]);
    }

    #[test]
    fn dictionary_of_lists_round_trips() {
        let registry = CodecRegistry::new();
        let s = Settings::default().with_pretty_print(true);

        let map = BTreeMap::from([("x".to_owned(), vec![1.5_f64, -2.0]), ("y".to_owned(), vec![])]);
        let text = registry.serialize(&map, &s).unwrap();
        assert_eq!(text, "{\n  \"x\": [\n    1.5,\n    -2\n  ],\n  \"y\": []\n}");
        assert_eq!(registry.deserialize::<BTreeMap<String, Vec<f64>>>(&text, &s).unwrap(), map);
    }
}
