use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use wiregen_schema::{Descriptor, Field, ProtocolConfig};

use crate::{
    error::ProtocolError,
    naming::{field_name, type_name, variant_name},
    utils::quote,
};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Variant reserved for the "no such method" ordinal.
pub const SENTINEL_VARIANT: &str = "None";

/// Prelude names a generated `types` module must not shadow.
pub const RESERVED_TYPE_NAMES: [&str; 5] = ["String", "Vec", "Option", "Result", "Box"];

/// Returns `Ok(())` if every schema name maps onto a distinct, usable Rust
/// name, or `Err(ProtocolError::VerifierError(_))` otherwise.
pub fn verify_protocol(config: &ProtocolConfig) -> Result<(), ProtocolError> {
    // 1) Custom type names
    let mut type_names = HashSet::new();
    for custom_type in &config.types {
        check_identifier(&custom_type.name, "type")?;
        let rust_name = converted(&custom_type.name, type_name(&custom_type.name))?;
        if RESERVED_TYPE_NAMES.contains(&rust_name.as_str()) {
            return Err(ProtocolError::VerifierError(format!(
                "The type name {} is reserved",
                quote(&custom_type.name)
            )));
        }
        if !type_names.insert(rust_name.clone()) {
            return Err(ProtocolError::VerifierError(format!(
                "The type {} collides with another type named {}",
                quote(&custom_type.name),
                quote(&rust_name)
            )));
        }
        check_fields(&format!("types.{}", custom_type.name), &custom_type.fields)?;
    }

    // 2) Commands, then events
    check_descriptors("commands", &config.commands)?;
    for command in &config.commands {
        check_fields(&format!("commands.{}.result", command.method), command.result_fields())?;
    }
    check_descriptors("events", &config.events)?;

    Ok(())
}

fn check_descriptors<D: Descriptor>(section: &str, descriptors: &[D]) -> Result<(), ProtocolError> {
    let mut variants = HashSet::new();
    let mut modules = HashSet::new();
    for descriptor in descriptors {
        let method = descriptor.method();
        check_identifier(method, "method")?;

        let variant = converted(method, variant_name(method))?;
        if variant == SENTINEL_VARIANT {
            return Err(ProtocolError::VerifierError(format!(
                "The method {} is reserved",
                quote(method)
            )));
        }
        let module = converted(method, field_name(method))?;
        if !variants.insert(variant) || !modules.insert(module) {
            return Err(ProtocolError::VerifierError(format!(
                "The method {} in {} collides with another method",
                quote(method),
                section
            )));
        }
        check_fields(&format!("{}.{}.params", section, method), descriptor.params())?;
    }
    Ok(())
}

fn check_fields(owner: &str, fields: &[Field]) -> Result<(), ProtocolError> {
    let mut names = HashSet::new();
    for field in fields {
        check_identifier(&field.name, "field")?;
        let rust_name = converted(&field.name, field_name(&field.name))?;
        if !names.insert(rust_name.clone()) {
            return Err(ProtocolError::VerifierError(format!(
                "The field {} in {} collides with another field named {}",
                quote(&field.name),
                owner,
                quote(&rust_name)
            )));
        }
    }
    Ok(())
}

fn check_identifier(name: &str, what: &str) -> Result<(), ProtocolError> {
    if !IDENTIFIER.is_match(name) {
        return Err(ProtocolError::VerifierError(format!(
            "The {} name {} is not an identifier",
            what,
            quote(name)
        )));
    }
    Ok(())
}

/// Case conversion can strip a name down to nothing usable, e.g. `_` or `_1`.
fn converted(original: &str, rust_name: String) -> Result<String, ProtocolError> {
    let usable = rust_name != "_"
        && IDENTIFIER.is_match(&rust_name)
        && !rust_name.starts_with(|c: char| c.is_ascii_digit());
    if !usable {
        return Err(ProtocolError::VerifierError(format!(
            "The name {} does not convert to a Rust identifier",
            quote(original)
        )));
    }
    Ok(rust_name)
}
