use alloc::sync::Arc;
use core::any::Any;
use core::fmt;

use crate::error::JsonResult;
use crate::info::{BoxedValue, TypeRef};
use crate::read::{self, Cursor};
use crate::registry::{CodecId, CodecTable};
use crate::settings::Settings;
use crate::shape::TypeShape;
use crate::write::{self, Writer};

// -----------------------------------------------------------------------------
// CompiledCodec

/// The write and read procedures of one type.
///
/// Settings are passed per call, so one codec serves every configuration.
/// Values are handed over as `&dyn Any` and must be of the codec's type.
///
/// # Examples
///
/// ```
/// use fj_codec::registry::CodecRegistry;
/// use fj_codec::settings::Settings;
///
/// let registry = CodecRegistry::new();
/// let codec = registry.codec::<Vec<Option<i32>>>().unwrap();
/// let settings = Settings::default();
///
/// let text = codec.write(&vec![Some(1), None, Some(3)], &settings).unwrap();
/// assert_eq!(text, "[1,null,3]");
///
/// let value = codec.read(&text, &settings).unwrap();
/// let value = value.downcast_ref::<Vec<Option<i32>>>().unwrap();
/// assert_eq!(value, &[Some(1), None, Some(3)]);
/// ```
#[derive(Clone)]
pub struct CompiledCodec {
    table: Arc<CodecTable>,
    id: CodecId,
}

impl CompiledCodec {
    #[inline]
    pub(crate) fn new(table: Arc<CodecTable>, id: CodecId) -> Self {
        Self { table, id }
    }

    #[inline]
    pub fn id(&self) -> CodecId {
        self.id
    }

    #[inline]
    pub fn type_ref(&self) -> TypeRef {
        self.table.get(self.id).type_ref()
    }

    #[inline]
    pub fn shape(&self) -> &Arc<TypeShape> {
        &self.table.get(self.id).shape
    }

    /// Serializes `value` into a new string.
    pub fn write(&self, value: &dyn Any, settings: &Settings) -> JsonResult<String> {
        write::write_to_string(&self.table, self.id, value, settings)
    }

    /// Appends the serialized `value` to `out`.
    ///
    /// On error `out` may hold a partial document.
    pub fn write_into(&self, value: &dyn Any, out: &mut String, settings: &Settings) -> JsonResult<()> {
        Writer::new(out, &self.table, settings).write(self.id, value)
    }

    /// Deserializes a complete document into a new boxed value.
    pub fn read(&self, text: &str, settings: &Settings) -> JsonResult<BoxedValue> {
        let mut value = self.type_ref().descriptor().new_default();
        self.read_into(text, &mut *value, settings)?;
        Ok(value)
    }

    /// Deserializes a complete document into `target`.
    ///
    /// The outer envelope is checked first, and nothing but whitespace may
    /// follow the value.
    pub fn read_into(&self, text: &str, target: &mut dyn Any, settings: &Settings) -> JsonResult<()> {
        read::read_root(&self.table, self.id, text, target, settings)
    }

    /// Deserializes one value at the cursor and advances past it.
    ///
    /// No envelope check is made, and text after the value is left alone.
    pub fn read_from(
        &self,
        cursor: &mut Cursor<'_>,
        target: &mut dyn Any,
        settings: &Settings,
    ) -> JsonResult<()> {
        read::read_nested(&self.table, self.id, cursor, target, settings)
    }
}

impl fmt::Debug for CompiledCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCodec")
            .field("id", &self.id)
            .field("type", &self.type_ref())
            .finish()
    }
}
