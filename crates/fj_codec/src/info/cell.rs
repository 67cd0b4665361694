//! Static storage for descriptors.
//!
//! ## DescriptorCell
//!
//! For non-generic types. A [`OnceLock`], almost free after the first call.
//!
//! ## GenericDescriptorCell
//!
//! A `static` inside a generic function is shared by every instantiation,
//! so the cell keys descriptors by [`TypeId`]. Descriptors are leaked and
//! live for the rest of the process.

use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use fj_utils::TypeIdMap;

use crate::info::TypeDescriptor;

/// Storage for the descriptor of a non-generic type.
///
/// See the [`info`](crate::info) module for an example.
pub struct DescriptorCell(OnceLock<TypeDescriptor>);

impl DescriptorCell {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored descriptor, building it with `f` on first use.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> TypeDescriptor) -> &TypeDescriptor {
        self.0.get_or_init(f)
    }
}

/// Storage for the descriptors of a generic type.
///
/// # Examples
///
/// ```
/// use fj_codec::info::{
///     downcast_mut, downcast_ref, FieldInfo, GenericDescriptorCell, JsonType, TupleInfo,
///     TypeDescriptor,
/// };
///
/// #[derive(Default)]
/// pub struct Wrapper<T>(pub T);
///
/// impl<T: JsonType + Default> JsonType for Wrapper<T> {
///     fn descriptor() -> &'static TypeDescriptor {
///         static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
///         CELL.get_or_insert::<Self>(|| {
///             TypeDescriptor::of::<Self>().with_positional(TupleInfo::new(vec![
///                 FieldInfo::new::<T>(
///                     |v| Ok(&downcast_ref::<Self>(v)?.0),
///                     |v| Ok(&mut downcast_mut::<Self>(v)?.0),
///                 ),
///             ]))
///         })
///     }
/// }
///
/// assert_ne!(
///     Wrapper::<u8>::descriptor().type_id(),
///     Wrapper::<u16>::descriptor().type_id(),
/// );
/// assert_eq!(fj_codec::serialize(&Wrapper(3_u8)).unwrap(), "[3]");
/// ```
pub struct GenericDescriptorCell(RwLock<TypeIdMap<&'static TypeDescriptor>>);

impl GenericDescriptorCell {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the descriptor stored for `G`, building it with `f` on first use.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(
        &self,
        f: impl FnOnce() -> TypeDescriptor,
    ) -> &'static TypeDescriptor {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    // Separate to reduce code compilation times
    #[inline(never)]
    fn get_or_insert_by_type_id(
        &self,
        type_id: TypeId,
        f: impl FnOnce() -> TypeDescriptor,
    ) -> &'static TypeDescriptor {
        let found = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied();
        match found {
            Some(descriptor) => descriptor,
            None => {
                // Built without holding the lock: `f` may need other cells.
                let descriptor = f();
                *self
                    .0
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get_or_insert(type_id, || &*Box::leak(Box::new(descriptor)))
            }
        }
    }
}
