use proc_macro2::{Ident, Literal, TokenStream};
use quote::quote;
use syn::{parse_quote, Item, Path};
use wiregen_schema::{Builtin, CustomType, DefaultValue, Field, ProtocolConfig, TypeKind};

use crate::naming::{field_ident, plain_ident, type_ident};

fn host_type(builtin: Builtin) -> TokenStream {
    match builtin {
        Builtin::String => quote!(String),
        Builtin::Int    => quote!(i32),
        Builtin::Bool   => quote!(bool),
    }
}

fn reader_ident(builtin: Builtin) -> Ident {
    plain_ident(&format!("read_{}", builtin.name()))
}

fn default_expr(default_value: Option<&DefaultValue>) -> TokenStream {
    match default_value {
        None => quote!(None),
        Some(DefaultValue::Bool(flag)) => quote!(Some(#flag)),
        Some(DefaultValue::String(text)) => quote!(Some(#text.to_string())),
        Some(DefaultValue::Int(number)) => {
            let magnitude = Literal::i64_unsuffixed(i64::from(number.unsigned_abs()));
            if *number < 0 {
                quote!(Some(-#magnitude))
            } else {
                quote!(Some(#magnitude))
            }
        }
    }
}

/// Expression reading `field` out of the wire object `object`, propagating
/// the first error with `?`.
pub(crate) fn read_expr(object: &Ident, field: &Field) -> TokenStream {
    let key = &field.name;
    let type_ = &field.type_;
    if type_.is_array {
        return quote!(read_array(#object, #key)?);
    }
    match &type_.kind {
        TypeKind::Custom(_) => quote!(read_object(#object, #key)?),
        TypeKind::Builtin(builtin) => {
            let reader = reader_ident(*builtin);
            let default = default_expr(type_.default_value.as_ref());
            match &type_.enumerated_values {
                Some(allowed) => quote! {
                    #reader(#object, #key, #default)
                        .and_then(|value| check_enumerated(value, &[#(#allowed),*]))?
                },
                None => quote!(#reader(#object, #key, #default)?),
            }
        }
    }
}

/// Statement inserting `access` (e.g. `self.id`) under the field's wire key
/// into the map `target`. Composite values recurse through `WriteJson`;
/// scalars are converted in place. `owned` means `access` may be moved from.
pub(crate) fn write_stmt(target: &Ident, access: TokenStream, field: &Field, owned: bool) -> TokenStream {
    let key = &field.name;
    let value = if field.type_.is_composite() {
        quote!(#access.write_json())
    } else if field.type_.as_builtin() == Some(Builtin::String) && !owned {
        quote!(Value::from(#access.as_str()))
    } else {
        quote!(Value::from(#access))
    };
    quote!(#target.insert(#key.to_string(), #value);)
}

/// `let mut <target> = Map::new();` followed by one insert per field.
pub(crate) fn write_object(
    target: &Ident,
    source: TokenStream,
    fields: &[Field],
    owned: bool,
) -> TokenStream {
    let inserts = fields.iter().map(|field| {
        let ident = field_ident(&field.name);
        write_stmt(target, quote!(#source.#ident), field, owned)
    });
    if fields.is_empty() {
        quote!(let #target = Map::new();)
    } else {
        quote! {
            let mut #target = Map::new();
            #(#inserts)*
        }
    }
}

fn builtin_read_impl(builtin: Builtin) -> Item {
    let ty = host_type(builtin);
    let name = builtin.name();
    let conversion = match builtin {
        Builtin::String => quote!(value.as_str().map(str::to_string)),
        Builtin::Int    => quote!(value.as_i64().and_then(|number| i32::try_from(number).ok())),
        Builtin::Bool   => quote!(value.as_bool()),
    };
    parse_quote! {
        impl ReadJson for #ty {
            fn read_json(value: &Value, param: &str) -> Result<Self, String> {
                #conversion.ok_or_else(|| type_mismatch(param, #name))
            }
        }
    }
}

fn builtin_reader_fn(builtin: Builtin) -> Item {
    let ty = host_type(builtin);
    let reader = reader_ident(builtin);
    let doc = format!(" Reads the {} field `param` of `object`.", builtin.name());
    parse_quote! {
        #[doc = #doc]
        pub fn #reader(object: &Value, param: &str, default_value: Option<#ty>) -> Result<#ty, String> {
            read_field(object, param, default_value)
        }
    }
}

fn custom_read_impl(custom_type: &CustomType, declarations: &Path) -> Item {
    let ident = type_ident(&custom_type.name);
    let name = &custom_type.name;
    let object = plain_ident("value");
    let members = custom_type.fields.iter().map(|field| {
        let member = field_ident(&field.name);
        let read = read_expr(&object, field);
        quote!(#member: #read)
    });
    parse_quote! {
        impl ReadJson for #declarations::types::#ident {
            fn read_json(value: &Value, param: &str) -> Result<Self, String> {
                if !value.is_object() {
                    return Err(type_mismatch(param, #name));
                }
                Ok(Self {
                    #(#members),*
                })
            }
        }
    }
}

fn custom_write_impl(custom_type: &CustomType, declarations: &Path) -> Item {
    let ident = type_ident(&custom_type.name);
    let object = plain_ident("object");
    let body = write_object(&object, quote!(self), &custom_type.fields, false);
    parse_quote! {
        impl WriteJson for #declarations::types::#ident {
            fn write_json(&self) -> Value {
                #body
                Value::Object(#object)
            }
        }
    }
}

/// Wire → typed conversions: the `ReadJson` trait, one reader per builtin
/// scalar, array and object readers, enumeration checks, and one `ReadJson`
/// impl per custom type.
pub(crate) fn reader_items(config: &ProtocolConfig, declarations: &Path) -> Vec<Item> {
    let mut items: Vec<Item> = Vec::new();

    items.push(parse_quote! {
        /// Conversion of one present wire value into a typed value.
        pub trait ReadJson: Sized {
            fn read_json(value: &Value, param: &str) -> Result<Self, String>;
        }
    });
    items.push(parse_quote! {
        fn type_mismatch(param: &str, expected: &str) -> String {
            format!("Value found for param {}, but not of expected type {}", param, expected)
        }
    });
    items.extend(Builtin::ALL.iter().map(|builtin| builtin_read_impl(*builtin)));
    items.push(parse_quote! {
        impl<T: ReadJson> ReadJson for Vec<T> {
            fn read_json(value: &Value, param: &str) -> Result<Self, String> {
                let elements = value.as_array().ok_or_else(|| type_mismatch(param, "array"))?;
                elements
                    .iter()
                    .enumerate()
                    .map(|(index, element)| T::read_json(element, &format!("{}[{}]", param, index)))
                    .collect()
            }
        }
    });
    items.push(parse_quote! {
        /// Reads the field `param` of `object`. An absent or null field falls
        /// back to `default_value` and is an error when there is none.
        pub fn read_field<T: ReadJson>(object: &Value, param: &str, default_value: Option<T>) -> Result<T, String> {
            match object.get(param) {
                None | Some(Value::Null) => {
                    default_value.ok_or_else(|| format!("Value missing for required param {}", param))
                }
                Some(value) => T::read_json(value, param),
            }
        }
    });
    items.extend(Builtin::ALL.iter().map(|builtin| builtin_reader_fn(*builtin)));
    items.push(parse_quote! {
        pub fn read_array<T: ReadJson>(object: &Value, param: &str) -> Result<Vec<T>, String> {
            read_field(object, param, None)
        }
    });
    items.push(parse_quote! {
        pub fn read_object<T: ReadJson>(object: &Value, param: &str) -> Result<T, String> {
            read_field(object, param, None)
        }
    });
    items.push(parse_quote! {
        pub fn check_enumerated(value: String, allowed: &[&str]) -> Result<String, String> {
            if allowed.contains(&value.as_str()) {
                Ok(value)
            } else {
                Err(format!("invalid value for enumeration: {}", value))
            }
        }
    });
    items.extend(config.types.iter().map(|custom_type| custom_read_impl(custom_type, declarations)));
    items
}

/// Typed → wire conversions: the `WriteJson` trait with impls for every
/// builtin, for sequences, and for every custom type.
pub(crate) fn writer_items(config: &ProtocolConfig, declarations: &Path) -> Vec<Item> {
    let mut items: Vec<Item> = Vec::new();

    items.push(parse_quote! {
        /// Conversion of a typed value into its wire form.
        pub trait WriteJson {
            fn write_json(&self) -> Value;
        }
    });
    for builtin in Builtin::ALL {
        let ty = host_type(builtin);
        let conversion = match builtin {
            Builtin::String => quote!(Value::from(self.as_str())),
            Builtin::Int | Builtin::Bool => quote!(Value::from(*self)),
        };
        items.push(parse_quote! {
            impl WriteJson for #ty {
                fn write_json(&self) -> Value {
                    #conversion
                }
            }
        });
    }
    items.push(parse_quote! {
        impl<T: WriteJson> WriteJson for Vec<T> {
            fn write_json(&self) -> Value {
                let mut elements = Vec::with_capacity(self.len());
                for element in self {
                    elements.push(element.write_json());
                }
                Value::Array(elements)
            }
        }
    });
    items.extend(config.types.iter().map(|custom_type| custom_write_impl(custom_type, declarations)));
    items
}
