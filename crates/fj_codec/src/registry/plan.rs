use alloc::sync::Arc;
use core::any::{Any, TypeId};

use fj_utils::TypeIdMap;
use fj_utils::hash::HashMap;

use crate::error::JsonResult;
use crate::info::{BoxedInfo, DynamicKind, EnumInfo, FieldInfo, MapInfo, MemberInfo};
use crate::info::{NullableInfo, SeqInfo, TypeDescriptor, TypeRef};
use crate::primitives::PrimitiveKind;
use crate::shape::TypeShape;

// -----------------------------------------------------------------------------
// CodecId

/// The index of a codec in its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodecId(u32);

impl CodecId {
    #[inline]
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

// -----------------------------------------------------------------------------
// Plans

/// A fieldless enum and the index of its zero-valued variant.
pub(crate) struct EnumPlan {
    pub(crate) info: &'static EnumInfo,
    pub(crate) zero_index: Option<usize>,
}

impl EnumPlan {
    pub(crate) fn new(info: &'static EnumInfo) -> Self {
        Self {
            info,
            zero_index: info.variants().iter().position(|v| v.value == 0),
        }
    }
}

pub(crate) struct MemberPlan {
    pub(crate) name: &'static str,
    pub(crate) camel_name: Box<str>,
    pub(crate) codec: CodecId,
    pub(crate) info: &'static MemberInfo,
}

impl MemberPlan {
    /// The wire name under the given casing.
    #[inline]
    pub(crate) fn wire_name(&self, camel_case: bool) -> &str {
        if camel_case { &self.camel_name } else { self.name }
    }
}

pub(crate) struct ObjectPlan {
    pub(crate) type_name: &'static str,
    pub(crate) members: Vec<MemberPlan>,
}

/// What a writer and reader do for one type.
pub(crate) enum Plan {
    Primitive(PrimitiveKind),
    Enum(EnumPlan),
    Nullable {
        inner: CodecId,
        info: &'static NullableInfo,
    },
    Boxed {
        inner: CodecId,
        info: &'static BoxedInfo,
    },
    Tuple {
        fields: Vec<(CodecId, &'static FieldInfo)>,
    },
    List {
        element: CodecId,
        info: &'static SeqInfo,
    },
    Dictionary {
        key: CodecId,
        value: CodecId,
        info: &'static MapInfo,
    },
    Object(ObjectPlan),
    Any(DynamicKind),
}

impl Plan {
    /// Rewrites every linked codec id.
    pub(crate) fn relink(&mut self, f: impl Fn(CodecId) -> CodecId) {
        match self {
            Self::Primitive(_) | Self::Enum(_) | Self::Any(_) => {}
            Self::Nullable { inner, .. } | Self::Boxed { inner, .. } => *inner = f(*inner),
            Self::Tuple { fields } => fields.iter_mut().for_each(|(id, _)| *id = f(*id)),
            Self::List { element, .. } => *element = f(*element),
            Self::Dictionary { key, value, .. } => {
                *key = f(*key);
                *value = f(*value);
            }
            Self::Object(object) => object
                .members
                .iter_mut()
                .for_each(|member| member.codec = f(member.codec)),
        }
    }
}

// -----------------------------------------------------------------------------
// Codec

pub(crate) struct Codec {
    pub(crate) shape: Arc<TypeShape>,
    pub(crate) plan: Plan,
}

impl Codec {
    #[inline]
    pub(crate) fn type_ref(&self) -> TypeRef {
        self.shape.type_ref()
    }

    #[inline]
    pub(crate) fn descriptor(&self) -> &'static TypeDescriptor {
        self.shape.type_ref().descriptor()
    }

    /// Whether `value` may be omitted when default members are skipped.
    ///
    /// Objects, tuples and boxes are never omitted.
    pub(crate) fn is_default(&self, value: &dyn Any) -> JsonResult<bool> {
        let descriptor = self.descriptor();
        match &self.plan {
            Plan::Nullable { info, .. } => Ok((info.get)(value)?.is_none()),
            Plan::Enum(plan) if !descriptor.has_default_test() => {
                Ok(plan.zero_index == Some((plan.info.index_of)(value)?))
            }
            Plan::Object(_) | Plan::Tuple { .. } | Plan::Boxed { .. } => Ok(false),
            _ => Ok(descriptor.is_default(value)),
        }
    }
}

// -----------------------------------------------------------------------------
// CodecTable

/// The append-only arena of published codecs.
#[derive(Clone, Default)]
pub(crate) struct CodecTable {
    codecs: Vec<Arc<Codec>>,
    by_type: TypeIdMap<CodecId>,
    by_name: HashMap<&'static str, CodecId>,
}

impl CodecTable {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.codecs.len()
    }

    /// # Panics
    ///
    /// Ids are only created by the table that resolves them.
    #[inline]
    pub(crate) fn get(&self, id: CodecId) -> &Codec {
        &self.codecs[id.index()]
    }

    #[inline]
    pub(crate) fn id_of(&self, type_id: TypeId) -> Option<CodecId> {
        self.by_type.get(&type_id).copied()
    }

    /// Looks up a compiled object type by its discriminator name.
    #[inline]
    pub(crate) fn id_by_name(&self, name: &str) -> Option<CodecId> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn push(&mut self, codec: Codec) -> CodecId {
        let id = CodecId::new(self.codecs.len());
        let ty = codec.type_ref();
        self.by_type.insert(ty.id(), id);
        if matches!(codec.plan, Plan::Object(_)) {
            self.by_name.entry(ty.type_name()).or_insert(id);
        }
        self.codecs.push(Arc::new(codec));
        id
    }
}
