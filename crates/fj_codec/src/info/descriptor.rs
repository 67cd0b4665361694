use core::any::{Any, TypeId, type_name};
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::info::{BoxedInfo, DynamicKind, EnumInfo, MapInfo, NullableInfo};
use crate::info::{SeqInfo, StructInfo, TupleInfo};
use crate::primitives::PrimitiveKind;

/// A type-erased owned value.
pub type BoxedValue = Box<dyn Any + Send + Sync>;

// -----------------------------------------------------------------------------
// JsonType

/// A type the codec registry can compile.
///
/// Implemented for primitives, standard collections, tuples, `Option`,
/// `Box`, [`JsonValue`](crate::value::JsonValue) and
/// [`Dynamic`](crate::value::Dynamic). User types derive it with
/// `#[derive(Json)]`.
pub trait JsonType: Any + Send + Sync {
    /// The capability description of `Self`.
    fn descriptor() -> &'static TypeDescriptor;
}

// -----------------------------------------------------------------------------
// TypeRef

/// A copyable handle to a [`JsonType`].
///
/// The descriptor is fetched lazily, so a descriptor may refer to its own
/// type, directly or through other types.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    descriptor: fn() -> &'static TypeDescriptor,
}

impl TypeRef {
    #[inline]
    pub fn of<T: JsonType>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            descriptor: T::descriptor,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        (self.descriptor)()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.descriptor().type_name()
    }
}

impl PartialEq for TypeRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.type_name()).finish()
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

fn boxed_default<T: Default + Send + Sync + 'static>() -> BoxedValue {
    Box::new(T::default())
}

fn is_default_eq<T: Default + PartialEq + 'static>(value: &dyn Any) -> bool {
    value.downcast_ref::<T>().is_some_and(|v| *v == T::default())
}

/// The capabilities of one type.
///
/// Built with [`TypeDescriptor::of`] and the `with_*` methods. A type may
/// expose several capabilities. The classifier decides which one wins.
pub struct TypeDescriptor {
    ty: TypeId,
    type_name: &'static str,
    public: bool,
    new_default: fn() -> BoxedValue,
    is_default: Option<fn(&dyn Any) -> bool>,
    pub(crate) primitive: Option<PrimitiveKind>,
    pub(crate) enumeration: Option<EnumInfo>,
    pub(crate) nullable: Option<NullableInfo>,
    pub(crate) boxed: Option<BoxedInfo>,
    pub(crate) associative: Option<MapInfo>,
    pub(crate) ordered: Option<SeqInfo>,
    pub(crate) positional: Option<TupleInfo>,
    pub(crate) members: Option<StructInfo>,
    pub(crate) dynamic: Option<DynamicKind>,
    pub(crate) known_types: Vec<TypeRef>,
}

impl TypeDescriptor {
    /// A public type without capabilities, named by [`type_name`].
    pub fn of<T: Default + Send + Sync + 'static>() -> Self {
        Self::with_constructor::<T>(boxed_default::<T>)
    }

    /// Like [`TypeDescriptor::of`], for types without a [`Default`] impl.
    pub fn with_constructor<T: Send + Sync + 'static>(new_default: fn() -> BoxedValue) -> Self {
        Self {
            ty: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            public: true,
            new_default,
            is_default: None,
            primitive: None,
            enumeration: None,
            nullable: None,
            boxed: None,
            associative: None,
            ordered: None,
            positional: None,
            members: None,
            dynamic: None,
            known_types: Vec::new(),
        }
    }

    /// Overrides the name used in type discriminators.
    pub fn with_type_name(mut self, type_name: &'static str) -> Self {
        self.type_name = type_name;
        self
    }

    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Sets the test used to omit default-valued members.
    pub fn with_is_default(mut self, is_default: fn(&dyn Any) -> bool) -> Self {
        self.is_default = Some(is_default);
        self
    }

    /// Compares against `T::default()` to omit default-valued members.
    pub fn with_default_eq<T: Default + PartialEq + 'static>(self) -> Self {
        self.with_is_default(is_default_eq::<T>)
    }

    pub fn with_primitive(mut self, kind: PrimitiveKind) -> Self {
        self.primitive = Some(kind);
        self
    }

    pub fn with_enum(mut self, info: EnumInfo) -> Self {
        self.enumeration = Some(info);
        self
    }

    pub fn with_nullable(mut self, info: NullableInfo) -> Self {
        self.nullable = Some(info);
        self
    }

    pub fn with_boxed(mut self, info: BoxedInfo) -> Self {
        self.boxed = Some(info);
        self
    }

    pub fn with_associative(mut self, info: MapInfo) -> Self {
        self.associative = Some(info);
        self
    }

    pub fn with_ordered(mut self, info: SeqInfo) -> Self {
        self.ordered = Some(info);
        self
    }

    pub fn with_positional(mut self, info: TupleInfo) -> Self {
        self.positional = Some(info);
        self
    }

    pub fn with_members(mut self, info: StructInfo) -> Self {
        self.members = Some(info);
        self
    }

    pub fn with_dynamic(mut self, kind: DynamicKind) -> Self {
        self.dynamic = Some(kind);
        self
    }

    /// Concrete types that may appear wherever this type holds a
    /// polymorphic value. They are compiled together with this type.
    pub fn with_known_types(mut self, known_types: Vec<TypeRef>) -> Self {
        self.known_types = known_types;
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.ty
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Creates a boxed default value of the type.
    #[inline]
    pub fn new_default(&self) -> BoxedValue {
        (self.new_default)()
    }

    /// Whether `value` equals the default of its type.
    ///
    /// Always `false` for types without a default test.
    #[inline]
    pub fn is_default(&self, value: &dyn Any) -> bool {
        self.is_default.is_some_and(|f| f(value))
    }

    #[inline]
    pub fn has_default_test(&self) -> bool {
        self.is_default.is_some()
    }

    #[inline]
    pub fn known_types(&self) -> &[TypeRef] {
        &self.known_types
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("public", &self.public)
            .field("primitive", &self.primitive)
            .field("enum", &self.enumeration.is_some())
            .field("nullable", &self.nullable.is_some())
            .field("boxed", &self.boxed.is_some())
            .field("associative", &self.associative.is_some())
            .field("ordered", &self.ordered.is_some())
            .field("positional", &self.positional.is_some())
            .field("members", &self.members.is_some())
            .field("dynamic", &self.dynamic)
            .finish()
    }
}
