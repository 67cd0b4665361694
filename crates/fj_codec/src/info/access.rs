use core::any::{Any, type_name};

use crate::error::{JsonError, JsonResult};
use crate::info::BoxedValue;

#[cold]
#[inline(never)]
fn mismatch<T>() -> JsonError {
    JsonError::unsupported(
        type_name::<T>(),
        "value does not match the codec it was passed to",
    )
}

/// Downcasts `value`, failing with [`JsonError::UnsupportedType`].
///
/// # Examples
///
/// ```
/// use fj_codec::info::downcast_ref;
///
/// let value: &dyn core::any::Any = &5_u8;
/// assert_eq!(*downcast_ref::<u8>(value).unwrap(), 5);
/// assert!(downcast_ref::<i8>(value).is_err());
/// ```
#[inline]
pub fn downcast_ref<T: Any>(value: &dyn Any) -> JsonResult<&T> {
    value.downcast_ref::<T>().ok_or_else(mismatch::<T>)
}

/// Mutable version of [`downcast_ref`].
#[inline]
pub fn downcast_mut<T: Any>(value: &mut dyn Any) -> JsonResult<&mut T> {
    value.downcast_mut::<T>().ok_or_else(mismatch::<T>)
}

/// Takes a `T` out of a type-erased box.
#[inline]
pub(crate) fn unbox<T: Any>(value: BoxedValue) -> JsonResult<T> {
    value.downcast::<T>().map(|value| *value).map_err(|_| mismatch::<T>())
}
