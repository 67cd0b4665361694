use alloc::sync::Arc;
use core::fmt;

use crate::info::{BoxedInfo, DynamicKind, EnumInfo, MapInfo, MemberInfo};
use crate::info::{NullableInfo, SeqInfo, TupleInfo, TypeRef};
use crate::primitives::PrimitiveKind;

// -----------------------------------------------------------------------------
// Member

/// A named member of an object shape.
pub struct Member {
    pub(crate) name: &'static str,
    pub(crate) position: usize,
    pub(crate) info: &'static MemberInfo,
}

impl Member {
    /// The wire name, after renaming.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The name of the Rust field.
    #[inline]
    pub fn field_name(&self) -> &'static str {
        self.info.name()
    }

    /// Position among all declared members, including excluded ones.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn type_ref(&self) -> TypeRef {
        self.info.type_ref()
    }

    #[inline]
    pub fn known_types(&self) -> &'static [TypeRef] {
        self.info.known_types()
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("type", &self.type_ref())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ShapeKind

/// The wire shape of a type.
pub enum ShapeKind {
    /// A number or boolean, written bare.
    Primitive(PrimitiveKind),
    /// A primitive written between quotes.
    StringPrimitive(PrimitiveKind),
    Enum(&'static EnumInfo),
    /// The shape of the wrapped type. `null` stands for the absent value.
    Nullable(Arc<TypeShape>, &'static NullableInfo),
    /// Transparent heap indirection.
    Boxed(&'static BoxedInfo),
    Tuple(&'static TupleInfo),
    List(&'static SeqInfo),
    Dictionary(&'static MapInfo),
    /// Members in declaration order.
    Object(Vec<Member>),
    Any(DynamicKind),
}

impl ShapeKind {
    /// A short lowercase name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::StringPrimitive(_) => "string primitive",
            Self::Enum(_) => "enum",
            Self::Nullable(..) => "nullable",
            Self::Boxed(_) => "boxed",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::Dictionary(_) => "dictionary",
            Self::Object(_) => "object",
            Self::Any(_) => "any",
        }
    }
}

impl fmt::Debug for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => f.debug_tuple("Primitive").field(kind).finish(),
            Self::StringPrimitive(kind) => f.debug_tuple("StringPrimitive").field(kind).finish(),
            Self::Enum(info) => f.debug_tuple("Enum").field(&info.variants()).finish(),
            Self::Nullable(inner, _) => f.debug_tuple("Nullable").field(inner).finish(),
            Self::Boxed(info) => f.debug_tuple("Boxed").field(&info.inner()).finish(),
            Self::Tuple(info) => f
                .debug_list()
                .entries(info.fields().iter().map(|field| field.type_ref()))
                .finish(),
            Self::List(info) => f.debug_tuple("List").field(&info.element()).finish(),
            Self::Dictionary(info) => f
                .debug_tuple("Dictionary")
                .field(&info.key())
                .field(&info.value())
                .finish(),
            Self::Object(members) => f.debug_tuple("Object").field(members).finish(),
            Self::Any(kind) => f.debug_tuple("Any").field(kind).finish(),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeShape

/// The classification of one type.
#[derive(Debug)]
pub struct TypeShape {
    pub(crate) ty: TypeRef,
    pub(crate) kind: ShapeKind,
    pub(crate) null_capable: bool,
}

impl TypeShape {
    #[inline]
    pub fn type_ref(&self) -> TypeRef {
        self.ty
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.ty.type_name()
    }

    #[inline]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Whether `null` is a value of the type rather than "leave unchanged".
    #[inline]
    pub fn is_null_capable(&self) -> bool {
        self.null_capable
    }

    /// Object members, empty for other kinds.
    pub fn members(&self) -> &[Member] {
        match &self.kind {
            ShapeKind::Object(members) => members,
            _ => &[],
        }
    }

    /// The shape with nullable wrappers removed.
    pub fn unwrapped(&self) -> &TypeShape {
        match &self.kind {
            ShapeKind::Nullable(inner, _) => inner.unwrapped(),
            _ => self,
        }
    }
}
