use alloc::format;

use fj_utils::TypeIdMap;

use crate::error::{JsonError, JsonResult};
use crate::info::TypeRef;
use crate::registry::{Codec, CodecId, CodecTable, EnumPlan, MemberPlan, ObjectPlan, Plan};
use crate::shape::{Classifier, Member, ShapeKind};

// -----------------------------------------------------------------------------
// Session

/// One compilation pass over a type graph.
///
/// Ids below `base.len()` refer to published codecs. Ids above refer to the
/// session's own slots, in the order they were reserved.
pub(crate) struct Session<'a> {
    classifier: &'a Classifier,
    base: &'a CodecTable,
    slots: Vec<(TypeRef, Option<Codec>)>,
    reserved: TypeIdMap<CodecId>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(classifier: &'a Classifier, base: &'a CodecTable) -> Self {
        Self {
            classifier,
            base,
            slots: Vec::new(),
            reserved: TypeIdMap::new(),
        }
    }

    /// Returns the codec id of `ty`, compiling it if needed.
    ///
    /// A type under compilation resolves to its reserved slot.
    pub(crate) fn link(&mut self, ty: TypeRef) -> JsonResult<CodecId> {
        if let Some(id) = self.base.id_of(ty.id()) {
            return Ok(id);
        }
        if let Some(&id) = self.reserved.get(&ty.id()) {
            return Ok(id);
        }

        let slot = self.slots.len();
        let id = CodecId::new(self.base.len() + slot);
        self.reserved.insert(ty.id(), id);
        self.slots.push((ty, None));

        let codec = self.build(ty)?;
        self.slots[slot].1 = Some(codec);
        Ok(id)
    }

    /// The compiled codecs in slot order.
    pub(crate) fn finish(self) -> JsonResult<Vec<Codec>> {
        self.slots
            .into_iter()
            .map(|(ty, codec)| {
                codec.ok_or_else(|| {
                    JsonError::unsupported(ty.type_name(), "the codec was never compiled")
                })
            })
            .collect()
    }

    fn build(&mut self, ty: TypeRef) -> JsonResult<Codec> {
        let shape = self.classifier.classify(ty)?;
        let descriptor = ty.descriptor();

        for &known in descriptor.known_types() {
            self.link(known)?;
        }

        let plan = match *shape.kind() {
            ShapeKind::Primitive(kind) | ShapeKind::StringPrimitive(kind) => Plan::Primitive(kind),
            ShapeKind::Enum(info) => Plan::Enum(EnumPlan::new(info)),
            ShapeKind::Nullable(ref inner, info) => Plan::Nullable {
                inner: self.link(inner.type_ref())?,
                info,
            },
            ShapeKind::Boxed(info) => Plan::Boxed {
                inner: self.link(info.inner())?,
                info,
            },
            ShapeKind::Tuple(info) => {
                let mut fields = Vec::with_capacity(info.fields().len());
                for field in info.fields() {
                    fields.push((self.link(field.type_ref())?, field));
                }
                Plan::Tuple { fields }
            }
            ShapeKind::List(info) => Plan::List {
                element: self.link(info.element())?,
                info,
            },
            ShapeKind::Dictionary(info) => {
                let key_shape = self.classifier.classify(info.key())?;
                if !matches!(
                    key_shape.kind(),
                    ShapeKind::Primitive(_) | ShapeKind::StringPrimitive(_) | ShapeKind::Enum(_)
                ) {
                    return Err(JsonError::unsupported(
                        descriptor.type_name(),
                        format!(
                            "dictionary keys must be primitives or enums, found {} `{}`",
                            key_shape.kind().name(),
                            key_shape.type_name(),
                        ),
                    ));
                }
                Plan::Dictionary {
                    key: self.link(info.key())?,
                    value: self.link(info.value())?,
                    info,
                }
            }
            ShapeKind::Object(ref members) => {
                if !descriptor.is_public() {
                    return Err(JsonError::unsupported(
                        descriptor.type_name(),
                        "non-public object types cannot be compiled",
                    ));
                }
                Plan::Object(ObjectPlan {
                    type_name: descriptor.type_name(),
                    members: self.members(members)?,
                })
            }
            ShapeKind::Any(kind) => Plan::Any(kind),
        };

        Ok(Codec { shape, plan })
    }

    fn members(&mut self, members: &[Member]) -> JsonResult<Vec<MemberPlan>> {
        let mut plans = Vec::with_capacity(members.len());
        for member in members {
            for &known in member.known_types() {
                self.link(known)?;
            }
            plans.push(MemberPlan {
                name: member.name,
                camel_name: camel_case(member.name).into_boxed_str(),
                codec: self.link(member.type_ref())?,
                info: member.info,
            });
        }
        Ok(plans)
    }
}

/// Lower-cases the first character.
fn camel_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
