//! Code generation for `#[derive(Json)]`.

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Index, Member, Type, Visibility, parse_quote};

use crate::attributes::{FieldAttributes, TypeAttributes};

/// The path of `fj_codec` as seen from the invoking crate.
fn fj_codec() -> syn::Path {
    fj_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("fj_codec"))
}

fn type_refs(fj: &syn::Path, types: &[Type]) -> TokenStream {
    quote! {
        ::std::vec![#( #fj::info::TypeRef::of::<#types>() ),*]
    }
}

// -----------------------------------------------------------------------------
// Entry

pub(crate) fn derive_json(ast: DeriveInput) -> syn::Result<TokenStream> {
    let fj = fj_codec();
    let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
    let is_generic = ast.generics.type_params().next().is_some();

    if let Some(lifetime) = ast.generics.lifetimes().next() {
        return Err(syn::Error::new(
            lifetime.span(),
            "`Json` types must be 'static and cannot have lifetime parameters",
        ));
    }

    let capability = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(_) => struct_members(&fj, &data.fields)?,
            Fields::Unnamed(_) => tuple_fields(&fj, &data.fields)?,
            Fields::Unit => quote! {
                .with_members(#fj::info::StructInfo::new(::std::vec::Vec::new()))
            },
        },
        Data::Enum(data) => enum_variants(&fj, &ast, data)?,
        Data::Union(_) => {
            return Err(syn::Error::new(
                ast.ident.span(),
                "`Json` cannot be derived for unions",
            ));
        }
    };

    let ident = &ast.ident;
    let is_public = matches!(ast.vis, Visibility::Public(_));
    let type_name = match &attrs.type_name {
        Some(name) => quote! { .with_type_name(#name) },
        // Generic types keep `type_name::<Self>()`, which includes their arguments.
        None if is_generic => TokenStream::new(),
        None => quote! {
            .with_type_name(::core::concat!(::core::module_path!(), "::", ::core::stringify!(#ident)))
        },
    };
    let known_types = if attrs.known_types.is_empty() {
        TokenStream::new()
    } else {
        let refs = type_refs(&fj, &attrs.known_types);
        quote! { .with_known_types(#refs) }
    };

    let body = quote! {
        #fj::info::TypeDescriptor::of::<Self>()
            #type_name
            .with_public(#is_public)
            #capability
            #known_types
    };

    let cell = if is_generic {
        quote! {
            static CELL: #fj::info::GenericDescriptorCell = #fj::info::GenericDescriptorCell::new();
            CELL.get_or_insert::<Self>(|| #body)
        }
    } else {
        quote! {
            static CELL: #fj::info::DescriptorCell = #fj::info::DescriptorCell::new();
            CELL.get_or_init(|| #body)
        }
    };

    let mut generics = ast.generics.clone();
    if is_generic {
        let where_clause = generics.make_where_clause();
        for param in ast.generics.type_params() {
            let param = &param.ident;
            where_clause
                .predicates
                .push(parse_quote! { #param: 'static + ::core::marker::Send + ::core::marker::Sync });
        }
        for ty in field_types(&ast.data) {
            where_clause.predicates.push(parse_quote! { #ty: #fj::JsonType });
        }
        where_clause
            .predicates
            .push(parse_quote! { Self: ::core::default::Default });
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let auto_register = auto_register(&fj, &attrs, ident, is_generic)?;

    Ok(quote! {
        const _: () = {
            impl #impl_generics #fj::JsonType for #ident #ty_generics #where_clause {
                fn descriptor() -> &'static #fj::info::TypeDescriptor {
                    #cell
                }
            }

            #auto_register
        };
    })
}

fn field_types(data: &Data) -> Vec<&Type> {
    match data {
        Data::Struct(data) => data.fields.iter().map(|field| &field.ty).collect(),
        _ => Vec::new(),
    }
}

#[cfg(feature = "auto_register")]
fn auto_register(
    fj: &syn::Path,
    attrs: &TypeAttributes,
    ident: &syn::Ident,
    is_generic: bool,
) -> syn::Result<TokenStream> {
    match attrs.auto_register {
        Some(span) if is_generic => Err(syn::Error::new(
            span,
            "`auto_register` needs concrete types, it is not available for generic types",
        )),
        Some(span) => Ok(quote_spanned! { span =>
            #fj::__macro_exports::inventory::submit! {
                #fj::__macro_exports::AutoRegistration(#fj::info::TypeRef::of::<#ident>)
            }
        }),
        None => Ok(TokenStream::new()),
    }
}

#[cfg(not(feature = "auto_register"))]
fn auto_register(
    _: &syn::Path,
    _: &TypeAttributes,
    _: &syn::Ident,
    _: bool,
) -> syn::Result<TokenStream> {
    Ok(TokenStream::new())
}

// -----------------------------------------------------------------------------
// Structs

/// Accessors for `self.<member>` as a pair of closures.
fn accessors(fj: &syn::Path, member: &Member) -> TokenStream {
    quote! {
        |v| ::core::result::Result::Ok(&#fj::info::downcast_ref::<Self>(v)?.#member),
        |v| ::core::result::Result::Ok(&mut #fj::info::downcast_mut::<Self>(v)?.#member),
    }
}

fn struct_members(fj: &syn::Path, fields: &Fields) -> syn::Result<TokenStream> {
    let mut members = Vec::new();
    for field in fields {
        let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };

        let ty = &field.ty;
        let name = ident.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name);
        let access = accessors(fj, &Member::Named(ident.clone()));
        let rename = attrs.rename.map(|rename| quote! { .with_rename(#rename) });
        let public = (!matches!(field.vis, Visibility::Public(_)))
            .then(|| quote! { .with_public(false) });
        let known_types = (!attrs.known_types.is_empty()).then(|| {
            let refs = type_refs(fj, &attrs.known_types);
            quote! { .with_known_types(#refs) }
        });

        members.push(quote! {
            #fj::info::MemberInfo::new::<#ty>(#name, #access)
                #rename
                #public
                #known_types
        });
    }

    Ok(quote! {
        .with_members(#fj::info::StructInfo::new(::std::vec![#(#members),*]))
    })
}

fn tuple_fields(fj: &syn::Path, fields: &Fields) -> syn::Result<TokenStream> {
    let mut infos = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        if let Some(rename) = &attrs.rename {
            return Err(syn::Error::new(
                rename.span(),
                "tuple fields are written by position and cannot be renamed",
            ));
        }

        let ty = &field.ty;
        let access = accessors(fj, &Member::Unnamed(Index::from(index)));
        infos.push(quote! {
            #fj::info::FieldInfo::new::<#ty>(#access)
        });
    }

    Ok(quote! {
        .with_positional(#fj::info::TupleInfo::new(::std::vec![#(#infos),*]))
    })
}

// -----------------------------------------------------------------------------
// Enums

fn enum_variants(
    fj: &syn::Path,
    ast: &DeriveInput,
    data: &syn::DataEnum,
) -> syn::Result<TokenStream> {
    if data.variants.is_empty() {
        return Err(syn::Error::new(
            ast.ident.span(),
            "`Json` needs at least one variant",
        ));
    }

    let mut idents = Vec::new();
    let mut names = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "`Json` supports fieldless enums only",
            ));
        }
        let attrs = FieldAttributes::parse_attrs(&variant.attrs)?;
        if attrs.skip {
            return Err(syn::Error::new(
                variant.span(),
                "enum variants cannot be skipped",
            ));
        }
        let name = match attrs.rename {
            Some(rename) => rename.value(),
            None => variant.ident.to_string(),
        };
        idents.push(&variant.ident);
        names.push(name);
    }

    let indices = 0..idents.len();
    let indices_again = indices.clone();
    let type_name = ast.ident.to_string();

    Ok(quote! {
        .with_enum(#fj::info::EnumInfo::new(
            ::std::vec![#(
                #fj::info::EnumVariant { name: #names, value: Self::#idents as i64 }
            ),*],
            |v| ::core::result::Result::Ok(match #fj::info::downcast_ref::<Self>(v)? {
                #( Self::#idents => #indices, )*
            }),
            |v, index| {
                let value = #fj::info::downcast_mut::<Self>(v)?;
                *value = match index {
                    #( #indices_again => Self::#idents, )*
                    _ => return ::core::result::Result::Err(
                        #fj::__macro_exports::variant_out_of_range(#type_name, index),
                    ),
                };
                ::core::result::Result::Ok(())
            },
        ))
    })
}
