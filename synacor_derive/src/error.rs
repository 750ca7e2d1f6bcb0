//! `#[derive(Error)]` expansion.
//!
//! ```ignore
//! use synacor_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum Fault {
//!     #[error("illegal opcode {opcode}")]
//!     IllegalOpcode { opcode: u16 },
//!
//!     #[error("i/o failure: {0}")]
//!     Io(String),
//!
//!     #[error("stack underflow")]
//!     StackUnderflow,
//! }
//! ```
//!
//! Named fields are interpolated by name, tuple fields by position (`{0}`),
//! and format specs such as `{target:#06x}` are passed through untouched.
//! Every field must appear in the message.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Enum(data) => {
            let arms = data
                .variants
                .iter()
                .map(|variant| {
                    let message = message(&variant.attrs, &variant.ident)?;
                    Ok(variant_arm(&variant.ident, &variant.fields, &message))
                })
                .collect::<syn::Result<Vec<_>>>()?;
            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Struct(data) => {
            let message = message(&input.attrs, &input.ident)?;
            struct_body(&data.fields, &message)
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "#[derive(Error)] is only supported on enums and structs",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #body
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Builds the `match` arm that formats one enum variant.
fn variant_arm(variant: &syn::Ident, fields: &Fields, message: &LitStr) -> TokenStream2 {
    match fields {
        Fields::Unit => quote! {
            Self::#variant => write!(f, #message),
        },
        Fields::Named(named) => {
            let idents: Vec<_> = named.named.iter().map(|field| &field.ident).collect();
            quote! {
                Self::#variant { #(#idents),* } => write!(f, #message, #(#idents = #idents),*),
            }
        }
        Fields::Unnamed(unnamed) => {
            let count = unnamed.unnamed.len();
            let idents: Vec<_> = (0..count).map(|i| format_ident!("_{}", i)).collect();
            let message = positional_to_named(message, count);
            quote! {
                Self::#variant(#(#idents),*) => write!(f, #message, #(#idents = #idents),*),
            }
        }
    }
}

fn struct_body(fields: &Fields, message: &LitStr) -> TokenStream2 {
    match fields {
        Fields::Unit => quote! { write!(f, #message) },
        Fields::Named(named) => {
            let idents: Vec<_> = named.named.iter().map(|field| &field.ident).collect();
            quote! { write!(f, #message, #(#idents = self.#idents),*) }
        }
        Fields::Unnamed(unnamed) => {
            let count = unnamed.unnamed.len();
            let idents: Vec<_> = (0..count).map(|i| format_ident!("_{}", i)).collect();
            let indices: Vec<_> = (0..count).map(syn::Index::from).collect();
            let message = positional_to_named(message, count);
            quote! { write!(f, #message, #(#idents = self.#indices),*) }
        }
    }
}

/// Reads the `#[error("...")]` literal attached to `target`.
fn message<T: ToTokens>(attrs: &[Attribute], target: &T) -> syn::Result<LitStr> {
    let attr = attrs
        .iter()
        .find(|attr| attr.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                target,
                "missing #[error(\"...\")] attribute; every fault needs a display message",
            )
        })?;

    attr.parse_args::<LitStr>().map_err(|_| {
        syn::Error::new_spanned(
            attr,
            "expected a string literal, e.g. #[error(\"illegal opcode {opcode}\")]",
        )
    })
}

/// Rewrites `{0}`, `{1:?}`... into `{_0}`, `{_1:?}` so tuple fields can be
/// passed as named format arguments.
fn positional_to_named(message: &LitStr, count: usize) -> LitStr {
    LitStr::new(&rename_positional(&message.value(), count), message.span())
}

fn rename_positional(message: &str, count: usize) -> String {
    let mut out = message.to_string();
    for i in (0..count).rev() {
        out = out
            .replace(&format!("{{{}}}", i), &format!("{{_{}}}", i))
            .replace(&format!("{{{}:", i), &format!("{{_{}:", i));
    }
    out
}
