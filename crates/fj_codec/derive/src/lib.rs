//! Derive macro for `fj_codec`.
//!
//! See [`Json`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod expand;

// -----------------------------------------------------------------------------
// Macros

/// # JSON Type Derivation
///
/// `#[derive(Json)]` implements `JsonType` and builds the type's descriptor:
///
/// - `struct T { ... }`: an object with one member per named field.
/// - `struct T(...);`: an array with one element per field.
/// - `struct T;`: an empty object.
/// - `enum T { A, B = 10 }`: a number, or the variant name when enabled
///   in the settings.
///
/// The type must implement `Default`, since reading starts from a default
/// value and fills it in. Enums with data, empty enums and unions are
/// rejected.
///
/// ## Type Attributes
///
/// ```rust, ignore
/// #[derive(Json, Default)]
/// #[json(type_name = "shop.Order", auto_register, known_types(Line, Refund))]
/// pub struct Order { /* ... */ }
/// ```
///
/// - `type_name`: the name written as the `$type` discriminator. Defaults
///   to `module_path!()::Ident`. Generic types use `type_name::<T>()`.
/// - `auto_register`: submit the type at link time, so a discriminator naming
///   it resolves before it was ever serialized. Needs the `auto_register`
///   feature and concrete types.
/// - `known_types`: types compiled together with this one.
///
/// ## Field Attributes
///
/// ```rust, ignore
/// #[derive(Json, Default)]
/// pub struct User {
///     #[json(rename = "Name")]
///     pub name: String,
///     #[json(skip)]
///     pub cache: Vec<u8>,
///     #[json(known_types(Admin))]
///     pub payload: Dynamic,
/// }
/// ```
///
/// - `rename`: the member name on the wire. Not available on tuple fields.
///   On enum variants it renames the variant.
/// - `skip`: never written or read.
/// - `known_types`: types compiled together with this member.
///
/// Fields that are not `pub` are only serialized by registries built with
/// `RegistryOptions::include_fields`.
#[proc_macro_derive(Json, attributes(json))]
pub fn derive_json(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    expand::derive_json(ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
