use check_keyword::CheckKeyword;
use heck::{ToPascalCase, ToSnakeCase};
use proc_macro2::{Ident, Span};

/// Rust type name of a custom type, e.g. `item_info` → `ItemInfo`.
pub fn type_name(name: &str) -> String {
    name.to_pascal_case()
}

/// Rust field and module name, e.g. `errorCode` → `error_code`.
pub fn field_name(name: &str) -> String {
    name.to_snake_case()
}

/// Enumeration variant of a command or event ordinal.
pub fn variant_name(method: &str) -> String {
    method.to_pascal_case()
}

/// The handler function the hand-maintained handler module must define.
pub fn handler_name(method: &str) -> String {
    format!("handle_{}", method.to_snake_case())
}

pub fn emit_name(method: &str) -> String {
    format!("emit_{}", method.to_snake_case())
}

pub fn dispatch_name(method: &str) -> String {
    format!("dispatch_{}", method.to_snake_case())
}

pub fn name_to_ident(name: &str) -> Ident {
    if ["crate", "self", "super", "Self"].contains(&name) {
        // Keywords that cannot be raw identifiers
        Ident::new(&format!("{}_", name), Span::call_site())
    } else if name.is_keyword() {
        Ident::new_raw(name, Span::call_site())
    } else {
        Ident::new(name, Span::call_site())
    }
}

pub fn type_ident(name: &str) -> Ident {
    name_to_ident(&type_name(name))
}

pub fn field_ident(name: &str) -> Ident {
    name_to_ident(&field_name(name))
}

pub fn module_ident(method: &str) -> Ident {
    name_to_ident(&field_name(method))
}

pub fn variant_ident(method: &str) -> Ident {
    name_to_ident(&variant_name(method))
}

pub fn plain_ident(name: &str) -> Ident {
    Ident::new(name, Span::call_site())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        assert_eq!(type_name("item_info"), "ItemInfo");
        assert_eq!(field_name("errorCode"), "error_code");
        assert_eq!(field_name("sessionID"), "session_id");
        assert_eq!(variant_name("get_item_names"), "GetItemNames");
        assert_eq!(handler_name("showMessage"), "handle_show_message");
    }

    #[test]
    fn test_keywords_are_escaped() {
        assert_eq!(field_ident("type").to_string(), "r#type");
        assert_eq!(field_ident("self").to_string(), "self_");
        assert_eq!(type_ident("self").to_string(), "Self_");
        assert_eq!(field_ident("title").to_string(), "title");
    }
}
