//! Wire shapes of types.
//!
//! The [`Classifier`] turns a [`TypeDescriptor`](crate::info::TypeDescriptor)
//! into a [`TypeShape`]: the single kind that decides how values of the type
//! are written and read. Shapes are computed once per type and never change.
//!
//! ## Rule order
//!
//! When a type exposes several capabilities the first matching rule wins:
//!
//! 1. nullable wrapper: the inner type's shape, flagged as null-capable
//! 2. heap indirection
//! 3. primitive leaf, string based or not
//! 4. fieldless enum
//! 5. associative iteration: dictionary
//! 6. ordered iteration: list
//! 7. positional fields: tuple
//! 8. named members: object
//! 9. runtime-typed value
//!
//! Anything else is an [`UnsupportedType`](crate::JsonError::UnsupportedType).

// -----------------------------------------------------------------------------
// Modules

mod classifier;
mod kind;

// -----------------------------------------------------------------------------
// Exports

pub use classifier::{Classifier, RegistryOptions};
pub use kind::{Member, ShapeKind, TypeShape};
