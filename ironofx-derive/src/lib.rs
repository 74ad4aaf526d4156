/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! # IronOfx Derive
//!
//! Procedural macros for the IronOfx aggregate engine.
//!
//! ## Macros
//!
//! - `#[derive(Aggregate)]` - Implements `ironofx_meta::Aggregate` and adds the
//!   type to the process-wide registry
//!
//! The generated code refers to `::ironofx_meta`, so crates using the derive
//! depend on `ironofx-meta` directly.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Field, Fields, GenericArgument, Ident, LitInt, LitStr, PathArguments, Type,
    parse_macro_input,
};

/// Derives the `Aggregate` trait for a struct with named fields.
///
/// # Attributes
///
/// On the struct:
/// - `#[ofx(name = "X")]` - Registers the type under wire name `X`. Abstract
///   bases omit it.
///
/// On fields:
/// - `#[ofx(element = "X", order = N, required)]` - Leaf element, field type `Option<V>`
/// - `#[ofx(child = "X", order = N, required)]` - Child aggregate, field type `Option<C>`;
///   a bare `child` takes the wire name of `C`
/// - `#[ofx(collection, order = N)]` - Collection, field type `Vec<C>`
/// - `#[ofx(collection, entry = E, order = N)]` - Collection of mixed types
///   sharing the base `E`, field type `Vec<Box<dyn Aggregate>>`
/// - `#[ofx(header = "X")]` - Document header, field type `Option<V>`
/// - `#[ofx(base)]` - Embedded base aggregate whose wire shape is inherited
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, Default, PartialEq, Aggregate)]
/// #[ofx(name = "SECID")]
/// pub struct SecurityId {
///     #[ofx(element = "UNIQUEID", order = 10, required)]
///     pub unique_id: Option<String>,
///     #[ofx(element = "UNIQUEIDTYPE", order = 20, required)]
///     pub unique_id_type: Option<String>,
/// }
/// ```
#[proc_macro_derive(Aggregate, attributes(ofx))]
pub fn derive_aggregate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

enum Role {
    Element { name: LitStr },
    Child { name: Option<LitStr> },
    Collection { entry: Option<Type> },
    Header { name: LitStr },
    Base,
}

struct FieldSpec<'a> {
    field: &'a Field,
    ident: &'a Ident,
    role: Role,
    order: i32,
    required: bool,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Aggregate cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Aggregate can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Aggregate can only be derived for structs",
            ));
        }
    };

    let wire_name = extract_wire_name(&input.attrs)?;

    let mut specs = Vec::new();
    for field in fields {
        if let Some(spec) = parse_field(field)? {
            specs.push(spec);
        }
    }

    let bases: Vec<_> = specs
        .iter()
        .filter(|spec| matches!(spec.role, Role::Base))
        .collect();
    if bases.len() > 1 {
        return Err(syn::Error::new_spanned(
            bases[1].field,
            "an aggregate can have at most one base",
        ));
    }
    let base = bases.first().map(|spec| (spec.ident, &spec.field.ty));

    let inherit = base.map(|(_, ty)| {
        quote! { registry.inherit::<Self, #ty>()?; }
    });
    let register = wire_name.as_ref().map(|wire_name| {
        quote! { registry.register::<Self>(#wire_name); }
    });

    let mut statements = Vec::new();
    for spec in &specs {
        if let Some(statement) = describe_field(name, spec)? {
            statements.push(statement);
        }
    }

    let upcast = base.map(|(field, _)| {
        quote! {
            fn upcast(
                &self,
                target: ::core::any::TypeId,
            ) -> ::core::option::Option<&dyn ::core::any::Any> {
                if target == ::core::any::TypeId::of::<Self>() {
                    ::core::option::Option::Some(self)
                } else {
                    ::ironofx_meta::Aggregate::upcast(&self.#field, target)
                }
            }

            fn upcast_mut(
                &mut self,
                target: ::core::any::TypeId,
            ) -> ::core::option::Option<&mut dyn ::core::any::Any> {
                if target == ::core::any::TypeId::of::<Self>() {
                    ::core::option::Option::Some(self)
                } else {
                    ::ironofx_meta::Aggregate::upcast_mut(&mut self.#field, target)
                }
            }
        }
    });

    let slot = format_ident!("__IRONOFX_DESCRIBE_{}", name.to_string().to_uppercase());

    Ok(quote! {
        impl ::ironofx_meta::Aggregate for #name {
            fn describe(
                registry: &mut ::ironofx_meta::Registry,
            ) -> ::core::result::Result<(), ::ironofx_meta::MetadataError> {
                #inherit
                #register
                #(#statements)*
                ::core::result::Result::Ok(())
            }

            #upcast
        }

        #[::ironofx_meta::linkme::distributed_slice(::ironofx_meta::AGGREGATES)]
        #[linkme(crate = ::ironofx_meta::linkme)]
        #[allow(non_upper_case_globals)]
        static #slot: ::ironofx_meta::DescribeFn = ::ironofx_meta::Registry::describe::<#name>;
    })
}

/// Generates the registration block of one field.
fn describe_field(owner: &Ident, spec: &FieldSpec<'_>) -> syn::Result<Option<TokenStream2>> {
    let field = spec.ident;
    let order = spec.order;
    let required = spec.required.then(|| quote! { .required() });
    let ty = &spec.field.ty;

    let block = match &spec.role {
        Role::Base => return Ok(None),
        Role::Element { name } => {
            let inner = wrapped(ty, "Option").ok_or_else(|| {
                syn::Error::new_spanned(ty, "element fields must be of type Option<T>")
            })?;
            quote! {
                {
                    fn get(a: &#owner) -> ::core::option::Option<#inner> {
                        ::core::clone::Clone::clone(&a.#field)
                    }
                    fn set(a: &mut #owner, v: ::core::option::Option<#inner>) {
                        a.#field = v;
                    }
                    registry.add_element::<Self>(
                        ::ironofx_meta::AttributeDescriptor::element(#name, #order, get, set) #required,
                    )?;
                }
            }
        }
        Role::Header { name } => {
            let inner = wrapped(ty, "Option").ok_or_else(|| {
                syn::Error::new_spanned(ty, "header fields must be of type Option<T>")
            })?;
            quote! {
                {
                    fn get(a: &#owner) -> ::core::option::Option<#inner> {
                        ::core::clone::Clone::clone(&a.#field)
                    }
                    fn set(a: &mut #owner, v: ::core::option::Option<#inner>) {
                        a.#field = v;
                    }
                    registry.add_header::<Self>(::ironofx_meta::HeaderDescriptor::new(#name, get, set));
                }
            }
        }
        Role::Child { name } => {
            let inner = wrapped(ty, "Option").ok_or_else(|| {
                syn::Error::new_spanned(ty, "child aggregate fields must be of type Option<T>")
            })?;
            let name = match name {
                Some(name) => quote! { ::core::option::Option::Some(#name) },
                None => quote! { ::core::option::Option::None },
            };
            quote! {
                {
                    fn get(a: &#owner) -> ::core::option::Option<&#inner> {
                        a.#field.as_ref()
                    }
                    fn set(a: &mut #owner, v: #inner) {
                        a.#field = ::core::option::Option::Some(v);
                    }
                    registry.describe::<#inner>()?;
                    registry.add_child_aggregate::<Self>(
                        ::ironofx_meta::AttributeDescriptor::child::<#owner, #inner>(#name, #order, get, set) #required,
                    )?;
                }
            }
        }
        Role::Collection { entry: None } => {
            let inner = wrapped(ty, "Vec").ok_or_else(|| {
                syn::Error::new_spanned(ty, "collection fields must be of type Vec<T>")
            })?;
            quote! {
                {
                    fn get(a: &#owner) -> &[#inner] {
                        &a.#field
                    }
                    fn push(a: &mut #owner, v: #inner) {
                        a.#field.push(v);
                    }
                    registry.describe::<#inner>()?;
                    registry.add_child_aggregate::<Self>(
                        ::ironofx_meta::AttributeDescriptor::collection::<#owner, #inner>(#order, get, push) #required,
                    )?;
                }
            }
        }
        Role::Collection { entry: Some(entry) } => {
            if wrapped(ty, "Vec").is_none() {
                return Err(syn::Error::new_spanned(
                    ty,
                    "collection fields with an entry type must be of type Vec<Box<dyn Aggregate>>",
                ));
            }
            quote! {
                {
                    fn get(a: &#owner) -> &[::std::boxed::Box<dyn ::ironofx_meta::Aggregate>] {
                        &a.#field
                    }
                    fn push(a: &mut #owner, v: ::std::boxed::Box<dyn ::ironofx_meta::Aggregate>) {
                        a.#field.push(v);
                    }
                    registry.describe::<#entry>()?;
                    registry.add_child_aggregate::<Self>(
                        ::ironofx_meta::AttributeDescriptor::polymorphic::<#owner, #entry>(#order, get, push) #required,
                    )?;
                }
            }
        }
    };

    Ok(Some(block))
}

/// Extracts the wire name from `#[ofx(name = "X")]`.
fn extract_wire_name(attrs: &[syn::Attribute]) -> syn::Result<Option<LitStr>> {
    let mut wire_name = None;
    for attr in attrs {
        if !attr.path().is_ident("ofx") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                wire_name = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported aggregate attribute, expected `name`"))
            }
        })?;
    }
    Ok(wire_name)
}

/// Parses the `#[ofx(...)]` attribute of a field. Fields without one are not
/// part of the wire shape.
fn parse_field(field: &Field) -> syn::Result<Option<FieldSpec<'_>>> {
    let Some(ident) = field.ident.as_ref() else {
        return Ok(None);
    };

    let mut role = None;
    let mut order = 0i32;
    let mut required = false;
    let mut entry = None;
    let mut found = false;

    for attr in &field.attrs {
        if !attr.path().is_ident("ofx") {
            continue;
        }
        found = true;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("element") {
                role = Some(Role::Element {
                    name: meta.value()?.parse()?,
                });
            } else if meta.path.is_ident("header") {
                role = Some(Role::Header {
                    name: meta.value()?.parse()?,
                });
            } else if meta.path.is_ident("child") {
                let name = if meta.input.peek(syn::Token![=]) {
                    Some(meta.value()?.parse()?)
                } else {
                    None
                };
                role = Some(Role::Child { name });
            } else if meta.path.is_ident("collection") {
                role = Some(Role::Collection { entry: None });
            } else if meta.path.is_ident("base") {
                role = Some(Role::Base);
            } else if meta.path.is_ident("entry") {
                entry = Some(meta.value()?.parse::<Type>()?);
            } else if meta.path.is_ident("order") {
                order = meta.value()?.parse::<LitInt>()?.base10_parse()?;
            } else if meta.path.is_ident("required") {
                required = true;
            } else {
                return Err(meta.error("unsupported field attribute"));
            }
            Ok(())
        })?;
    }

    if !found {
        return Ok(None);
    }

    let role = match (role, entry) {
        (Some(Role::Collection { .. }), entry) => Role::Collection { entry },
        (Some(_), Some(entry)) => {
            return Err(syn::Error::new_spanned(
                entry,
                "`entry` only applies to collections",
            ));
        }
        (Some(role), None) => role,
        (None, _) => {
            return Err(syn::Error::new(
                Span::call_site(),
                format!(
                    "field `{}` needs one of `element`, `child`, `collection`, `header` or `base`",
                    ident
                ),
            ));
        }
    };

    Ok(Some(FieldSpec {
        field,
        ident,
        role,
        order,
        required,
    }))
}

/// Returns `T` if `ty` is `wrapper<T>`.
fn wrapped<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    if let Type::Path(path) = ty
        && path.qself.is_none()
        && let Some(segment) = path.path.segments.last()
        && segment.ident == wrapper
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(inner)) = args.args.first()
    {
        return Some(inner);
    }
    None
}
