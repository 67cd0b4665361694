//! Raw capability descriptions of Rust types.
//!
//! A [`TypeDescriptor`] states what a type *can do*: iterate associatively
//! or in order, expose positional fields or named members, wrap a nullable
//! or boxed value, or be one of the primitive leaves. It does not decide the
//! wire shape. That is the job of the [`Classifier`](crate::shape::Classifier).
//!
//! ## Menu
//!
//! - [`JsonType`]: implemented by every supported type, usually through
//!   `#[derive(Json)]`.
//! - [`TypeRef`]: a lazy, copyable handle to a type and its descriptor.
//! - [`TypeDescriptor`]: the capability bag.
//! - Capabilities: [`NullableInfo`], [`BoxedInfo`], [`SeqInfo`], [`MapInfo`],
//!   [`TupleInfo`], [`StructInfo`], [`EnumInfo`], [`DynamicKind`].
//! - [`DescriptorCell`], [`GenericDescriptorCell`]: static storage for
//!   descriptors.
//! - [`downcast_ref`], [`downcast_mut`]: checked access used by accessors.
//!
//! # Examples
//!
//! A hand-written descriptor, equivalent to what the derive generates:
//!
//! ```
//! use fj_codec::info::{
//!     downcast_mut, downcast_ref, DescriptorCell, JsonType, MemberInfo, StructInfo,
//!     TypeDescriptor,
//! };
//!
//! #[derive(Default)]
//! pub struct Point {
//!     pub x: i32,
//!     pub y: i32,
//! }
//!
//! impl JsonType for Point {
//!     fn descriptor() -> &'static TypeDescriptor {
//!         static CELL: DescriptorCell = DescriptorCell::new();
//!         CELL.get_or_init(|| {
//!             TypeDescriptor::of::<Point>().with_members(StructInfo::new(vec![
//!                 MemberInfo::new::<i32>(
//!                     "x",
//!                     |v| Ok(&downcast_ref::<Point>(v)?.x),
//!                     |v| Ok(&mut downcast_mut::<Point>(v)?.x),
//!                 ),
//!                 MemberInfo::new::<i32>(
//!                     "y",
//!                     |v| Ok(&downcast_ref::<Point>(v)?.y),
//!                     |v| Ok(&mut downcast_mut::<Point>(v)?.y),
//!                 ),
//!             ]))
//!         })
//!     }
//! }
//!
//! let text = fj_codec::serialize(&Point { x: 1, y: -2 }).unwrap();
//! assert_eq!(text, r#"{"x":1,"y":-2}"#);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod access;
mod capability;
mod cell;
mod descriptor;

// -----------------------------------------------------------------------------
// Exports

pub use access::{downcast_mut, downcast_ref};
pub(crate) use access::unbox;
pub use capability::{BoxedInfo, NullableInfo};
pub use capability::{DynamicKind, EnumInfo, EnumVariant};
pub use capability::{FieldInfo, TupleInfo};
pub use capability::{GetFn, GetMutFn, IterFn, PairIterFn};
pub use capability::{MapInfo, SeqFill, SeqInfo};
pub use capability::{MemberInfo, StructInfo};
pub use cell::{DescriptorCell, GenericDescriptorCell};
pub use descriptor::{BoxedValue, JsonType, TypeDescriptor, TypeRef};
