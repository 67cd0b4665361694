use core::any::Any;

use crate::error::JsonResult;
use crate::info::{BoxedValue, JsonType, TypeRef};

// -----------------------------------------------------------------------------
// Accessor signatures

/// Borrows a part of a value.
pub type GetFn = for<'a> fn(&'a dyn Any) -> JsonResult<&'a dyn Any>;

/// Mutably borrows a part of a value.
pub type GetMutFn = for<'a> fn(&'a mut dyn Any) -> JsonResult<&'a mut dyn Any>;

/// Iterates the elements of an ordered collection.
pub type IterFn =
    for<'a> fn(&'a dyn Any) -> JsonResult<Box<dyn Iterator<Item = &'a dyn Any> + 'a>>;

/// Iterates the entries of an associative collection.
pub type PairIterFn = for<'a> fn(
    &'a dyn Any,
) -> JsonResult<Box<dyn Iterator<Item = (&'a dyn Any, &'a dyn Any)> + 'a>>;

// -----------------------------------------------------------------------------
// Wrappers

/// A value that may be absent, such as `Option<T>`.
pub struct NullableInfo {
    pub(crate) inner: TypeRef,
    pub(crate) get: for<'a> fn(&'a dyn Any) -> JsonResult<Option<&'a dyn Any>>,
    pub(crate) insert_default: GetMutFn,
    pub(crate) clear: fn(&mut dyn Any) -> JsonResult<()>,
}

impl NullableInfo {
    /// - `get` returns `None` when the value is absent.
    /// - `insert_default` replaces the value with a present default and
    ///   returns it.
    /// - `clear` makes the value absent.
    pub fn new<T: JsonType>(
        get: for<'a> fn(&'a dyn Any) -> JsonResult<Option<&'a dyn Any>>,
        insert_default: GetMutFn,
        clear: fn(&mut dyn Any) -> JsonResult<()>,
    ) -> Self {
        Self {
            inner: TypeRef::of::<T>(),
            get,
            insert_default,
            clear,
        }
    }

    #[inline]
    pub fn inner(&self) -> TypeRef {
        self.inner
    }
}

/// A heap indirection, such as `Box<T>`. Needed for recursive types.
pub struct BoxedInfo {
    pub(crate) inner: TypeRef,
    pub(crate) get: GetFn,
    pub(crate) get_mut: GetMutFn,
}

impl BoxedInfo {
    pub fn new<T: JsonType>(get: GetFn, get_mut: GetMutFn) -> Self {
        Self {
            inner: TypeRef::of::<T>(),
            get,
            get_mut,
        }
    }

    #[inline]
    pub fn inner(&self) -> TypeRef {
        self.inner
    }
}

// -----------------------------------------------------------------------------
// Collections

/// How a reader fills an ordered collection.
pub enum SeqFill {
    /// Elements are appended as defaults and decoded in place.
    InPlace {
        clear: fn(&mut dyn Any) -> JsonResult<()>,
        push_default: GetMutFn,
    },
    /// Elements are decoded into boxes first, then handed over at once.
    /// Used by sets and fixed-size arrays.
    ///
    /// `len` is the exact element count of fixed-size collections. Those are
    /// left unchanged by `null`.
    Collect {
        len: Option<usize>,
        assign: fn(&mut dyn Any, Vec<BoxedValue>) -> JsonResult<()>,
    },
}

/// Ordered iteration, such as `Vec<T>` or `[T; N]`.
pub struct SeqInfo {
    pub(crate) element: TypeRef,
    pub(crate) len: fn(&dyn Any) -> JsonResult<usize>,
    pub(crate) iter: IterFn,
    pub(crate) fill: SeqFill,
}

impl SeqInfo {
    pub fn new<T: JsonType>(
        len: fn(&dyn Any) -> JsonResult<usize>,
        iter: IterFn,
        fill: SeqFill,
    ) -> Self {
        Self {
            element: TypeRef::of::<T>(),
            len,
            iter,
            fill,
        }
    }

    #[inline]
    pub fn element(&self) -> TypeRef {
        self.element
    }
}

/// Associative iteration, such as `HashMap<K, V>`.
pub struct MapInfo {
    pub(crate) key: TypeRef,
    pub(crate) value: TypeRef,
    pub(crate) len: fn(&dyn Any) -> JsonResult<usize>,
    pub(crate) iter: PairIterFn,
    pub(crate) clear: fn(&mut dyn Any) -> JsonResult<()>,
    pub(crate) insert: for<'a> fn(&'a mut dyn Any, BoxedValue) -> JsonResult<&'a mut dyn Any>,
}

impl MapInfo {
    /// `insert` stores a default value under the boxed key, replacing any
    /// previous entry, and returns the value for in-place decoding.
    pub fn new<K: JsonType, V: JsonType>(
        len: fn(&dyn Any) -> JsonResult<usize>,
        iter: PairIterFn,
        clear: fn(&mut dyn Any) -> JsonResult<()>,
        insert: for<'a> fn(&'a mut dyn Any, BoxedValue) -> JsonResult<&'a mut dyn Any>,
    ) -> Self {
        Self {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
            len,
            iter,
            clear,
            insert,
        }
    }

    #[inline]
    pub fn key(&self) -> TypeRef {
        self.key
    }

    #[inline]
    pub fn value(&self) -> TypeRef {
        self.value
    }
}

// -----------------------------------------------------------------------------
// Positional and named members

/// One positional field.
pub struct FieldInfo {
    pub(crate) ty: TypeRef,
    pub(crate) get: GetFn,
    pub(crate) get_mut: GetMutFn,
}

impl FieldInfo {
    pub fn new<T: JsonType>(get: GetFn, get_mut: GetMutFn) -> Self {
        Self {
            ty: TypeRef::of::<T>(),
            get,
            get_mut,
        }
    }

    #[inline]
    pub fn type_ref(&self) -> TypeRef {
        self.ty
    }
}

/// Fixed-arity heterogeneous fields, such as `(A, B)` or `struct P(A, B);`.
pub struct TupleInfo {
    pub(crate) fields: Vec<FieldInfo>,
}

impl TupleInfo {
    pub fn new(fields: Vec<FieldInfo>) -> Self {
        Self { fields }
    }

    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }
}

/// One named member of a struct.
pub struct MemberInfo {
    pub(crate) name: &'static str,
    pub(crate) rename: Option<&'static str>,
    pub(crate) public: bool,
    pub(crate) ty: TypeRef,
    pub(crate) get: GetFn,
    pub(crate) get_mut: GetMutFn,
    pub(crate) known_types: Vec<TypeRef>,
}

impl MemberInfo {
    /// A public member of type `T`.
    pub fn new<T: JsonType>(name: &'static str, get: GetFn, get_mut: GetMutFn) -> Self {
        Self {
            name,
            rename: None,
            public: true,
            ty: TypeRef::of::<T>(),
            get,
            get_mut,
            known_types: Vec::new(),
        }
    }

    /// Overrides the wire name.
    pub fn with_rename(mut self, rename: &'static str) -> Self {
        self.rename = Some(rename);
        self
    }

    /// Marks the member as non-public. Such members are only serialized
    /// when the registry includes fields.
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Concrete types a polymorphic member may hold.
    pub fn with_known_types(mut self, known_types: Vec<TypeRef>) -> Self {
        self.known_types = known_types;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn rename(&self) -> Option<&'static str> {
        self.rename
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.public
    }

    #[inline]
    pub fn type_ref(&self) -> TypeRef {
        self.ty
    }

    #[inline]
    pub fn known_types(&self) -> &[TypeRef] {
        &self.known_types
    }
}

/// Named members in declaration order.
pub struct StructInfo {
    pub(crate) members: Vec<MemberInfo>,
}

impl StructInfo {
    pub fn new(members: Vec<MemberInfo>) -> Self {
        Self { members }
    }

    #[inline]
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }
}

// -----------------------------------------------------------------------------
// Enums and dynamic values

/// One variant of a fieldless enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: &'static str,
    pub value: i64,
}

/// A fieldless enum with a name and a numeric value per variant.
pub struct EnumInfo {
    pub(crate) variants: Vec<EnumVariant>,
    pub(crate) index_of: fn(&dyn Any) -> JsonResult<usize>,
    pub(crate) set_index: fn(&mut dyn Any, usize) -> JsonResult<()>,
}

impl EnumInfo {
    /// `index_of` and `set_index` translate between values and positions in
    /// `variants`.
    pub fn new(
        variants: Vec<EnumVariant>,
        index_of: fn(&dyn Any) -> JsonResult<usize>,
        set_index: fn(&mut dyn Any, usize) -> JsonResult<()>,
    ) -> Self {
        Self {
            variants,
            index_of,
            set_index,
        }
    }

    #[inline]
    pub fn variants(&self) -> &[EnumVariant] {
        &self.variants
    }
}

/// Types whose shape is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicKind {
    /// [`JsonValue`](crate::value::JsonValue): an untyped tree.
    Value,
    /// [`Dynamic`](crate::value::Dynamic): an untyped tree or a boxed
    /// instance of a compiled type.
    Dynamic,
}
