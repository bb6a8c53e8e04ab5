use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Item};
use wiregen_schema::{Builtin, Descriptor, Field, ProtocolConfig, Type, TypeKind};

use crate::{
    emitter::doc_attrs,
    naming::{field_ident, module_ident, type_ident, variant_ident},
};

/// Host type of a field. `types_prefix` is the path to the `types` module as
/// seen from the declaring module, empty inside `types` itself.
pub(crate) fn rust_type(type_: &Type, types_prefix: &TokenStream) -> TokenStream {
    let element = match &type_.kind {
        TypeKind::Builtin(Builtin::String) => quote!(String),
        TypeKind::Builtin(Builtin::Int)    => quote!(i32),
        TypeKind::Builtin(Builtin::Bool)   => quote!(bool),
        TypeKind::Custom(name) => {
            let ident = type_ident(name);
            quote!(#types_prefix #ident)
        }
    };
    if type_.is_array {
        quote!(Vec<#element>)
    } else {
        element
    }
}

fn record(name: TokenStream, fields: &[Field], types_prefix: &TokenStream) -> TokenStream {
    let members: Vec<TokenStream> = fields
        .iter()
        .map(|field| {
            let docs = doc_attrs(field.description.as_deref());
            let ident = field_ident(&field.name);
            let ty = rust_type(&field.type_, types_prefix);
            quote! {
                #(#docs)*
                pub #ident: #ty
            }
        })
        .collect();
    quote! {
        #[derive(Debug, Clone, PartialEq, Eq, Default)]
        pub struct #name {
            #(#members),*
        }
    }
}

pub(crate) fn types_module(config: &ProtocolConfig) -> Item {
    let no_prefix = TokenStream::new();
    let records = config.types.iter().map(|custom_type| {
        let ident = type_ident(&custom_type.name);
        record(quote!(#ident), &custom_type.fields, &no_prefix)
    });
    parse_quote! {
        pub mod types {
            #(#records)*
        }
    }
}

/// The closed ordinal enumeration: the `None` sentinel, then every method in
/// declaration order.
fn ordinal_enum<D: Descriptor>(descriptors: &[D]) -> TokenStream {
    let variants = descriptors.iter().map(|descriptor| {
        let docs = doc_attrs(descriptor.description());
        let ident = variant_ident(descriptor.method());
        quote! {
            #(#docs)*
            #ident
        }
    });
    quote! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum Type {
            #[default]
            None,
            #(#variants),*
        }
    }
}

pub(crate) fn commands_module(config: &ProtocolConfig) -> Item {
    let types_prefix = quote!(super::super::types::);
    let ordinals = ordinal_enum(&config.commands);
    let modules = config.commands.iter().map(|command| {
        let docs = doc_attrs(command.description.as_deref());
        let module = module_ident(&command.method);
        let params = record(quote!(Params), command.params(), &types_prefix);
        let result = record(quote!(Result), command.result_fields(), &types_prefix);
        quote! {
            #(#docs)*
            pub mod #module {
                #params
                #result
                pub type Handle = fn(Params) -> Result;
            }
        }
    });
    parse_quote! {
        pub mod commands {
            #ordinals
            #(#modules)*
        }
    }
}

pub(crate) fn events_module(config: &ProtocolConfig) -> Item {
    let types_prefix = quote!(super::super::types::);
    let ordinals = ordinal_enum(&config.events);
    let modules = config.events.iter().map(|event| {
        let docs = doc_attrs(event.description.as_deref());
        let module = module_ident(&event.method);
        let params = record(quote!(Params), event.params(), &types_prefix);
        quote! {
            #(#docs)*
            pub mod #module {
                #params
                pub type Emit = fn(Params);
            }
        }
    });
    parse_quote! {
        pub mod events {
            #ordinals
            #(#modules)*
        }
    }
}

pub(crate) fn declaration_items(config: &ProtocolConfig) -> Vec<Item> {
    vec![
        types_module(config),
        commands_module(config),
        events_module(config),
    ]
}
