use crate::info::{DescriptorCell, DynamicKind, JsonType, TypeDescriptor};
use crate::value::{Dynamic, JsonValue};

impl JsonType for JsonValue {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: DescriptorCell = DescriptorCell::new();
        CELL.get_or_init(|| {
            TypeDescriptor::of::<JsonValue>()
                .with_type_name("JsonValue")
                .with_is_default(|v| v.downcast_ref::<JsonValue>().is_some_and(JsonValue::is_null))
                .with_dynamic(DynamicKind::Value)
        })
    }
}

impl JsonType for Dynamic {
    fn descriptor() -> &'static TypeDescriptor {
        static CELL: DescriptorCell = DescriptorCell::new();
        CELL.get_or_init(|| {
            TypeDescriptor::of::<Dynamic>()
                .with_type_name("Dynamic")
                .with_is_default(|v| v.downcast_ref::<Dynamic>().is_some_and(Dynamic::is_null))
                .with_dynamic(DynamicKind::Dynamic)
        })
    }
}
