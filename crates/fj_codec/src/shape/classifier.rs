use alloc::sync::Arc;
use std::sync::{PoisonError, RwLock};

use fj_utils::TypeIdMap;
use log::trace;

use crate::error::{JsonError, JsonResult};
use crate::info::{StructInfo, TypeDescriptor, TypeRef};
use crate::shape::{Member, ShapeKind, TypeShape};

// -----------------------------------------------------------------------------
// RegistryOptions

/// Options fixed for the lifetime of a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegistryOptions {
    /// Also serialize non-`pub` fields.
    pub include_fields: bool,
}

impl RegistryOptions {
    pub const fn with_include_fields(mut self, include_fields: bool) -> Self {
        self.include_fields = include_fields;
        self
    }
}

// -----------------------------------------------------------------------------
// Classifier

/// Computes and memoizes [`TypeShape`]s.
///
/// # Examples
///
/// ```
/// use fj_codec::info::TypeRef;
/// use fj_codec::shape::{Classifier, RegistryOptions, ShapeKind};
///
/// let classifier = Classifier::new(RegistryOptions::default());
///
/// let shape = classifier.classify(TypeRef::of::<Option<Vec<u8>>>()).unwrap();
/// assert!(shape.is_null_capable());
/// assert!(matches!(shape.unwrapped().kind(), ShapeKind::List(_)));
///
/// let shape = classifier.classify(TypeRef::of::<String>()).unwrap();
/// assert!(matches!(shape.kind(), ShapeKind::StringPrimitive(_)));
/// ```
pub struct Classifier {
    options: RegistryOptions,
    shapes: RwLock<TypeIdMap<Arc<TypeShape>>>,
}

impl Classifier {
    pub const fn new(options: RegistryOptions) -> Self {
        Self {
            options,
            shapes: RwLock::new(TypeIdMap::new()),
        }
    }

    #[inline]
    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Returns the shape of `ty`, classifying it on first use.
    ///
    /// Classifying a type again yields the same shape instance.
    pub fn classify(&self, ty: TypeRef) -> JsonResult<Arc<TypeShape>> {
        let cached = self
            .shapes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ty.id())
            .cloned();
        if let Some(shape) = cached {
            return Ok(shape);
        }

        let shape = Arc::new(self.build(ty)?);
        trace!("classified `{}` as {}", ty.type_name(), shape.kind.name());

        Ok(self
            .shapes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(ty.id(), || shape)
            .clone())
    }

    fn build(&self, ty: TypeRef) -> JsonResult<TypeShape> {
        let descriptor = ty.descriptor();
        let mut null_capable = false;

        let kind = if let Some(info) = &descriptor.nullable {
            null_capable = true;
            ShapeKind::Nullable(self.classify(info.inner())?, info)
        } else if let Some(info) = &descriptor.boxed {
            ShapeKind::Boxed(info)
        } else if let Some(kind) = descriptor.primitive {
            if kind.is_string_based() {
                ShapeKind::StringPrimitive(kind)
            } else {
                ShapeKind::Primitive(kind)
            }
        } else if let Some(info) = &descriptor.enumeration {
            ShapeKind::Enum(info)
        } else if let Some(info) = &descriptor.associative {
            ShapeKind::Dictionary(info)
        } else if let Some(info) = &descriptor.ordered {
            ShapeKind::List(info)
        } else if let Some(info) = &descriptor.positional {
            ShapeKind::Tuple(info)
        } else if let Some(info) = &descriptor.members {
            ShapeKind::Object(self.members(descriptor, info)?)
        } else if let Some(kind) = descriptor.dynamic {
            null_capable = true;
            ShapeKind::Any(kind)
        } else {
            return Err(JsonError::unsupported(
                descriptor.type_name(),
                "the type exposes no serializable capability",
            ));
        };

        Ok(TypeShape {
            ty,
            kind,
            null_capable,
        })
    }

    fn members(
        &self,
        descriptor: &'static TypeDescriptor,
        info: &'static StructInfo,
    ) -> JsonResult<Vec<Member>> {
        let mut members = Vec::with_capacity(info.members().len());
        for (position, member) in info.members().iter().enumerate() {
            if !member.is_public() && !self.options.include_fields {
                continue;
            }
            let name = member.rename().unwrap_or(member.name());
            if let Err(reason) = check_member_name(name) {
                return Err(JsonError::InvalidPropertyConfiguration {
                    type_name: descriptor.type_name(),
                    member: member.name().into(),
                    reason,
                });
            }
            members.push(Member {
                name,
                position,
                info: member,
            });
        }
        Ok(members)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(RegistryOptions::default())
    }
}

fn check_member_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        Err("the name is blank")
    } else if name.chars().any(char::is_whitespace) {
        Err("the name contains whitespace")
    } else if name.contains(['"', '\'']) {
        Err("the name contains a quote")
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use std::collections::{BTreeMap, HashMap};

    use super::{Classifier, RegistryOptions};
    use crate::Json;
    use crate::JsonError;
    use crate::info::TypeRef;
    use crate::primitives::PrimitiveKind;
    use crate::shape::ShapeKind;
    use crate::value::{Dynamic, JsonValue};

    #[derive(Json, Default)]
    pub struct Account {
        pub id: i64,
        #[json(rename = "Name")]
        pub name: String,
        secret: u32,
    }

    #[derive(Json, Default)]
    pub struct Spaced {
        #[json(rename = "full name")]
        pub name: String,
    }

    #[derive(Json, Default)]
    pub struct Blank {
        #[json(rename = "  ")]
        pub name: String,
    }

    #[derive(Json, Default)]
    pub struct Quoted {
        #[json(rename = "a\"b")]
        pub name: String,
    }

    #[derive(Json, Default, Clone, Copy, PartialEq)]
    pub enum Level {
        #[default]
        Low,
        High,
    }

    #[derive(Json, Default)]
    pub struct Pair(pub u8, pub String);

    fn kind_name<T: crate::JsonType>(classifier: &Classifier) -> &'static str {
        classifier
            .classify(TypeRef::of::<T>())
            .unwrap()
            .kind()
            .name()
    }

    #[test]
    fn rule_order() {
        let c = Classifier::default();
        assert_eq!(kind_name::<i32>(&c), "primitive");
        assert_eq!(kind_name::<bool>(&c), "primitive");
        assert_eq!(kind_name::<String>(&c), "string primitive");
        assert_eq!(kind_name::<uuid::Uuid>(&c), "string primitive");
        assert_eq!(kind_name::<Level>(&c), "enum");
        assert_eq!(kind_name::<Vec<u8>>(&c), "list");
        assert_eq!(kind_name::<[i32; 3]>(&c), "list");
        assert_eq!(kind_name::<Vec<(String, i32)>>(&c), "list");
        assert_eq!(kind_name::<HashMap<String, i32>>(&c), "dictionary");
        assert_eq!(kind_name::<BTreeMap<i32, i32>>(&c), "dictionary");
        assert_eq!(kind_name::<(u8, String)>(&c), "tuple");
        assert_eq!(kind_name::<Pair>(&c), "tuple");
        assert_eq!(kind_name::<Account>(&c), "object");
        assert_eq!(kind_name::<Box<Account>>(&c), "boxed");
        assert_eq!(kind_name::<JsonValue>(&c), "any");
        assert_eq!(kind_name::<Dynamic>(&c), "any");
    }

    #[test]
    fn nullable_unwraps() {
        let c = Classifier::default();
        let shape = c.classify(TypeRef::of::<Option<i32>>()).unwrap();
        assert!(shape.is_null_capable());
        assert!(matches!(
            shape.unwrapped().kind(),
            ShapeKind::Primitive(PrimitiveKind::I32)
        ));
        assert!(!c.classify(TypeRef::of::<i32>()).unwrap().is_null_capable());
    }

    #[test]
    fn members_in_declaration_order() {
        let c = Classifier::default();
        let shape = c.classify(TypeRef::of::<Account>()).unwrap();
        let names: Vec<_> = shape.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["id", "Name"]);
        assert_eq!(shape.members()[1].field_name(), "name");

        let c = Classifier::new(RegistryOptions::default().with_include_fields(true));
        let shape = c.classify(TypeRef::of::<Account>()).unwrap();
        let names: Vec<_> = shape.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["id", "Name", "secret"]);
        assert_eq!(shape.members()[2].position(), 2);
    }

    #[test]
    fn classification_is_idempotent() {
        let c = Classifier::default();
        let a = c.classify(TypeRef::of::<Account>()).unwrap();
        let b = c.classify(TypeRef::of::<Account>()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let fresh = Classifier::default().classify(TypeRef::of::<Account>()).unwrap();
        let order = |s: &crate::shape::TypeShape| -> Vec<_> {
            s.members().iter().map(|m| (m.name(), m.position())).collect()
        };
        assert_eq!(order(&a), order(&fresh));
        assert_eq!(a.kind().name(), fresh.kind().name());
    }

    #[test]
    fn invalid_member_names() {
        let c = Classifier::default();
        for ty in [
            TypeRef::of::<Spaced>(),
            TypeRef::of::<Blank>(),
            TypeRef::of::<Quoted>(),
        ] {
            let err = c.classify(ty).unwrap_err();
            assert!(
                matches!(err, JsonError::InvalidPropertyConfiguration { ref member, .. } if member == "name"),
                "{err}"
            );
        }
    }
}
