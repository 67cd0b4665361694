//! Parsing of `#[json(...)]` attributes.

use proc_macro2::Span;
use syn::punctuated::Punctuated;
use syn::{Attribute, LitStr, Token, Type, parenthesized};

const ATTRIBUTE_NAME: &str = "json";

fn parse_types(meta: &syn::meta::ParseNestedMeta) -> syn::Result<Vec<Type>> {
    let content;
    parenthesized!(content in meta.input);
    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
    Ok(types.into_iter().collect())
}

// -----------------------------------------------------------------------------
// Type level

/// `#[json(type_name = "...", auto_register, known_types(A, B))]` on a type.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub type_name: Option<LitStr>,
    pub auto_register: Option<Span>,
    pub known_types: Vec<Type>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident(ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("type_name") {
                    this.type_name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("auto_register") {
                    this.auto_register = Some(meta.path.require_ident()?.span());
                } else if meta.path.is_ident("known_types") {
                    this.known_types.extend(parse_types(&meta)?);
                } else {
                    return Err(meta.error(
                        "expected `type_name = \"...\"`, `auto_register` or `known_types(...)`",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// Field level

/// `#[json(rename = "...", skip, known_types(A, B))]` on a field or variant.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub skip: bool,
    pub known_types: Vec<Type>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident(ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    this.rename = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("skip") {
                    this.skip = true;
                } else if meta.path.is_ident("known_types") {
                    this.known_types.extend(parse_types(&meta)?);
                } else {
                    return Err(meta.error(
                        "expected `rename = \"...\"`, `skip` or `known_types(...)`",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(this)
    }
}
