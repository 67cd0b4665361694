//! Items used by `#[derive(Json)]` expansions. Not a public API.

#[cfg(feature = "auto_register")]
pub use inventory;

/// One `#[json(auto_register)]` type, submitted at link time.
#[cfg(feature = "auto_register")]
pub struct AutoRegistration(pub fn() -> crate::info::TypeRef);

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegistration);

/// The error returned when an enum is set from a position it does not have.
pub fn variant_out_of_range(type_name: &'static str, index: usize) -> crate::JsonError {
    crate::JsonError::unsupported(type_name, format!("no variant at position {index}"))
}
