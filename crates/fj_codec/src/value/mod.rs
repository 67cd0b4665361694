//! Untyped values.
//!
//! ## Menu
//!
//! - [`JsonValue`]: a parsed tree whose scalars carry an inferred type.
//! - [`Number`]: the numeric leaves of a [`JsonValue`].
//! - [`Dynamic`]: a member that holds either a tree or an instance of a
//!   compiled type, chosen at runtime by the `$type` discriminator.
//! - [`infer`]: the scalar type inference used when reading untyped values.

// -----------------------------------------------------------------------------
// Modules

mod dynamic;
mod json_value;

pub mod infer;

#[cfg(feature = "serde")]
mod serde;

// -----------------------------------------------------------------------------
// Exports

pub use dynamic::Dynamic;
pub use json_value::{JsonMap, JsonValue, Number};
