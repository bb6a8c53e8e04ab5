use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, Item, Path};
use wiregen_schema::{Command, Descriptor, Event, ProtocolConfig};

use crate::{
    emitter::doc_attrs,
    gen_marshal::{read_expr, write_object},
    naming::{dispatch_name, emit_name, field_ident, handler_name, module_ident, plain_ident, variant_ident},
};

/// `parse_<kind>` and `<kind>_to_string`, both total: unknown names map to
/// the `None` sentinel and the sentinel maps back to `"unknown"`.
fn ordinal_mappings<D: Descriptor>(kind: &str, module: &TokenStream, descriptors: &[D]) -> Vec<Item> {
    let parse_fn = plain_ident(&format!("parse_{}", kind));
    let to_string_fn = plain_ident(&format!("{}_to_string", kind));
    let argument = plain_ident(kind);

    let mut parse_arms = Vec::new();
    let mut to_string_arms = Vec::new();
    for descriptor in descriptors {
        let method = descriptor.method();
        let variant = variant_ident(method);
        parse_arms.push(quote!(#method => #module::Type::#variant,));
        to_string_arms.push(quote!(#module::Type::#variant => #method,));
    }

    vec![
        parse_quote! {
            pub fn #parse_fn(#argument: &str) -> #module::Type {
                match #argument {
                    #(#parse_arms)*
                    _ => #module::Type::None,
                }
            }
        },
        parse_quote! {
            pub fn #to_string_fn(#argument: #module::Type) -> &'static str {
                match #argument {
                    #(#to_string_arms)*
                    #module::Type::None => "unknown",
                }
            }
        },
    ]
}

pub(crate) fn mapping_items(config: &ProtocolConfig, declarations: &Path) -> Vec<Item> {
    let commands = quote!(#declarations::commands);
    let events = quote!(#declarations::events);
    let mut items = ordinal_mappings("command", &commands, &config.commands);
    items.extend(ordinal_mappings("event", &events, &config.events));
    items
}

/// Decodes the params of one command, runs its handler through the declared
/// `Handle` signature and encodes the result.
fn dispatch_fn(command: &Command, declarations: &Path, handlers: &Path) -> Item {
    let function = plain_ident(&dispatch_name(&command.method));
    let module = module_ident(&command.method);
    let handler = plain_ident(&handler_name(&command.method));
    let command_path = quote!(#declarations::commands::#module);

    let params = command.params();
    let params_json = if params.is_empty() {
        plain_ident("_params_json")
    } else {
        plain_ident("params_json")
    };
    let members = params.iter().map(|field| {
        let member = field_ident(&field.name);
        let read = read_expr(&params_json, field);
        quote!(#member: #read)
    });

    let invoke = if command.result_fields().is_empty() {
        quote! {
            handle(params);
            Ok(Value::Object(Map::new()))
        }
    } else {
        let result_json = plain_ident("result_json");
        let write = write_object(&result_json, quote!(result), command.result_fields(), true);
        quote! {
            let result = handle(params);
            #write
            Ok(Value::Object(#result_json))
        }
    };

    parse_quote! {
        fn #function(#params_json: &Value) -> Result<Value, String> {
            let params = #command_path::Params {
                #(#members),*
            };
            let handle: #command_path::Handle = #handlers::#handler;
            #invoke
        }
    }
}

pub(crate) fn dispatch_items(config: &ProtocolConfig, declarations: &Path, handlers: &Path) -> Vec<Item> {
    let commands = quote!(#declarations::commands);
    let arms = config.commands.iter().map(|command| {
        let variant = variant_ident(&command.method);
        let function = plain_ident(&dispatch_name(&command.method));
        quote!(#commands::Type::#variant => #function(params_json),)
    });

    let mut items: Vec<Item> = vec![
        parse_quote! {
            fn error_result(error: String) -> Value {
                let mut object = Map::new();
                object.insert("error".to_string(), Value::String(error));
                Value::Object(object)
            }
        },
        parse_quote! {
            /// Runs the command `kind` with wire params and returns its wire
            /// result, or an object holding only `error` when decoding fails
            /// or the command is unknown.
            pub fn handle_command(kind: #commands::Type, params_json: &Value) -> Value {
                let outcome = match kind {
                    #(#arms)*
                    #commands::Type::None => Err("unknown command".to_string()),
                };
                outcome.unwrap_or_else(error_result)
            }
        },
        parse_quote! {
            pub fn handle_request(command: &str, params_json: &Value) -> Value {
                handle_command(parse_command(command), params_json)
            }
        },
    ];
    items.extend(config.commands.iter().map(|command| dispatch_fn(command, declarations, handlers)));
    items
}

fn emit_fn(event: &Event, declarations: &Path, broadcast: &Path) -> Item {
    let docs = doc_attrs(event.description.as_deref());
    let function = plain_ident(&emit_name(&event.method));
    let module = module_ident(&event.method);
    let variant = variant_ident(&event.method);
    let params = if event.params().is_empty() {
        plain_ident("_params")
    } else {
        plain_ident("params")
    };
    let params_json = plain_ident("params_json");
    let write = write_object(&params_json, quote!(#params), event.params(), true);

    parse_quote! {
        #(#docs)*
        pub fn #function(#params: #declarations::events::#module::Params) {
            #write
            #broadcast(#declarations::events::Type::#variant, Value::Object(#params_json));
        }
    }
}

pub(crate) fn emit_items(config: &ProtocolConfig, declarations: &Path, broadcast: &Path) -> Vec<Item> {
    config
        .events
        .iter()
        .map(|event| emit_fn(event, declarations, broadcast))
        .collect()
}
