use serde_json::{Map, Value};
use tracing::debug;
use wiregen_schema::{
    Builtin, Command, CustomType, DefaultValue, Event, Field, ProtocolConfig, Type, TypeKind,
};

use crate::{
    error::ProtocolError,
    registry::TypeRegistry,
    utils::{malformed, owner_path, quote},
};

const SECTIONS: [&str; 3] = ["types", "commands", "events"];
const COMMAND_KEYS: [&str; 3] = ["params", "result", "description"];
const EVENT_KEYS: [&str; 2] = ["params", "description"];
const TYPE_ENTRY_KEYS: [&str; 3] = ["type", "default", "description"];

/// Resolves a loaded schema document into a [`ProtocolConfig`].
///
/// Types are resolved in a single pass in declaration order, so a custom type
/// must be declared before anything refers to it.
pub fn parse_protocol(document: &Value) -> Result<ProtocolConfig, ProtocolError> {
    let root = document.as_object().ok_or_else(|| {
        ProtocolError::SchemaError("the schema document must be a mapping".to_string())
    })?;
    for key in root.keys() {
        if !SECTIONS.contains(&key.as_str()) {
            return Err(ProtocolError::SchemaError(format!(
                "Unexpected top-level section {}",
                quote(key)
            )));
        }
    }

    let mut registry = TypeRegistry::new();
    if let Some(types) = section(root, "types")? {
        for (name, type_value) in types {
            let owner = owner_path("types", name);
            let fields = match type_value {
                Value::Null => Vec::new(),
                Value::Object(fields) => parse_fields(&registry, &owner, fields)?,
                _ => {
                    return Err(ProtocolError::SchemaError(format!(
                        "{} must be a mapping of field names to types",
                        owner
                    )))
                }
            };
            debug!(name = %name, fields = fields.len(), "resolved custom type");
            // Registered only after its own fields resolved, so a type can
            // never refer to itself.
            registry.register(CustomType { name: name.clone(), fields })?;
        }
    }

    let mut commands = Vec::new();
    if let Some(section) = section(root, "commands")? {
        for (method, command_value) in section {
            let owner = owner_path("commands", method);
            let entry = descriptor_entry(&owner, command_value, &COMMAND_KEYS)?;
            let command = Command {
                method:      method.clone(),
                params:      parse_field_map(&registry, &owner, entry.and_then(|e| e.get("params")), "params")?,
                result:      parse_field_map(&registry, &owner, entry.and_then(|e| e.get("result")), "result")?,
                description: parse_description(&owner, entry.and_then(|e| e.get("description")))?,
            };
            debug!(method = %method, "resolved command");
            commands.push(command);
        }
    }

    let mut events = Vec::new();
    if let Some(section) = section(root, "events")? {
        for (method, event_value) in section {
            let owner = owner_path("events", method);
            let entry = descriptor_entry(&owner, event_value, &EVENT_KEYS)?;
            let event = Event {
                method:      method.clone(),
                params:      parse_field_map(&registry, &owner, entry.and_then(|e| e.get("params")), "params")?,
                description: parse_description(&owner, entry.and_then(|e| e.get("description")))?,
            };
            debug!(method = %method, "resolved event");
            events.push(event);
        }
    }

    Ok(ProtocolConfig {
        types: registry.into_types(),
        commands,
        events,
    })
}

/// A missing or null section is empty.
fn section<'a>(root: &'a Map<String, Value>, name: &str) -> Result<Option<&'a Map<String, Value>>, ProtocolError> {
    match root.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(ProtocolError::SchemaError(format!(
            "The section {} must be a mapping",
            quote(name)
        ))),
    }
}

/// A command or event body: null, or a mapping restricted to `allowed` keys.
fn descriptor_entry<'a>(
    owner: &str,
    value: &'a Value,
    allowed: &[&str],
) -> Result<Option<&'a Map<String, Value>>, ProtocolError> {
    let entry = match value {
        Value::Null => return Ok(None),
        Value::Object(entry) => entry,
        _ => return Err(ProtocolError::SchemaError(format!("{} must be a mapping", owner))),
    };
    for key in entry.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ProtocolError::SchemaError(format!(
                "Unexpected key {} in {}",
                quote(key),
                owner
            )));
        }
    }
    Ok(Some(entry))
}

/// `params` or `result`. Absent, null and empty mappings all mean "not declared".
fn parse_field_map(
    registry: &TypeRegistry,
    owner: &str,
    value: Option<&Value>,
    key: &str,
) -> Result<Option<Vec<Field>>, ProtocolError> {
    let owner = owner_path(owner, key);
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(fields)) if fields.is_empty() => Ok(None),
        Some(Value::Object(fields)) => Ok(Some(parse_fields(registry, &owner, fields)?)),
        Some(_) => Err(ProtocolError::SchemaError(format!(
            "{} must be a mapping of names to types",
            owner
        ))),
    }
}

fn parse_fields(
    registry: &TypeRegistry,
    owner: &str,
    fields: &Map<String, Value>,
) -> Result<Vec<Field>, ProtocolError> {
    fields
        .iter()
        .map(|(name, type_value)| parse_field(registry, &owner_path(owner, name), name, type_value))
        .collect()
}

fn parse_field(
    registry: &TypeRegistry,
    owner: &str,
    name: &str,
    value: &Value,
) -> Result<Field, ProtocolError> {
    let (type_, description) = match value {
        Value::String(type_name) => (parse_type_name(registry, owner, type_name)?, None),
        Value::Array(values) => (parse_enumerated(owner, values)?, None),
        Value::Object(entry) => parse_type_entry(registry, owner, entry)?,
        _ => {
            return Err(malformed(
                owner,
                "expected a type name, a list of strings or a mapping with a `type`",
            ))
        }
    };
    Ok(Field {
        name: name.to_string(),
        type_,
        description,
    })
}

/// `int`, `item`, `string[]`, ...
fn parse_type_name(registry: &TypeRegistry, owner: &str, type_name: &str) -> Result<Type, ProtocolError> {
    let (element, is_array) = match type_name.strip_suffix("[]") {
        Some(element) => (element, true),
        None => (type_name, false),
    };
    if element.contains("[]") {
        return Err(malformed(owner, "nested arrays are not supported"));
    }
    let kind = registry.resolve(element, owner)?;
    Ok(Type {
        kind,
        is_array,
        default_value: None,
        enumerated_values: None,
    })
}

fn parse_enumerated(owner: &str, values: &[Value]) -> Result<Type, ProtocolError> {
    if values.is_empty() {
        return Err(malformed(owner, "an enumeration needs at least one value"));
    }
    let mut enumerated = Vec::with_capacity(values.len());
    for value in values {
        let literal = value
            .as_str()
            .ok_or_else(|| malformed(owner, &format!("enumerated value {} is not a string", value)))?;
        if enumerated.iter().any(|v: &String| v == literal) {
            return Err(malformed(
                owner,
                &format!("enumerated value {} is listed twice", quote(literal)),
            ));
        }
        enumerated.push(literal.to_string());
    }
    let mut type_ = Type::builtin(Builtin::String);
    type_.enumerated_values = Some(enumerated);
    Ok(type_)
}

/// `{ type: ..., default: ..., description: ... }`
fn parse_type_entry(
    registry: &TypeRegistry,
    owner: &str,
    entry: &Map<String, Value>,
) -> Result<(Type, Option<String>), ProtocolError> {
    for key in entry.keys() {
        if !TYPE_ENTRY_KEYS.contains(&key.as_str()) {
            return Err(malformed(owner, &format!("unexpected key {}", quote(key))));
        }
    }

    let mut type_ = match entry.get("type") {
        Some(Value::String(type_name)) => parse_type_name(registry, owner, type_name)?,
        Some(Value::Array(values)) => parse_enumerated(owner, values)?,
        Some(_) => return Err(malformed(owner, "`type` must be a type name or a list of strings")),
        None => return Err(malformed(owner, "missing `type`")),
    };

    type_.default_value = match entry.get("default") {
        None | Some(Value::Null) => None,
        Some(default) => Some(parse_default(owner, &type_, default)?),
    };

    let description = parse_description(owner, entry.get("description"))?;
    Ok((type_, description))
}

fn parse_default(owner: &str, type_: &Type, default: &Value) -> Result<DefaultValue, ProtocolError> {
    let builtin = match (&type_.kind, type_.is_array) {
        (TypeKind::Builtin(builtin), false) => *builtin,
        _ => {
            let shape = if type_.is_array { "[]" } else { "" };
            return Err(malformed(
                owner,
                &format!("defaults are only allowed on scalar types, not on {}{}", type_.kind_name(), shape),
            ));
        }
    };

    let value = match (builtin, default) {
        (Builtin::Bool, Value::Bool(flag)) => DefaultValue::Bool(*flag),
        (Builtin::String, Value::String(text)) => DefaultValue::String(text.clone()),
        (Builtin::Int, Value::Number(number)) => number
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(DefaultValue::Int)
            .ok_or_else(|| malformed(owner, &format!("default {} does not fit an int", number)))?,
        _ => {
            return Err(malformed(
                owner,
                &format!("default {} is not a {}", default, builtin.name()),
            ))
        }
    };

    if let (Some(allowed), DefaultValue::String(text)) = (&type_.enumerated_values, &value) {
        if !allowed.contains(text) {
            return Err(malformed(
                owner,
                &format!("default {} is not one of the enumerated values", quote(text)),
            ));
        }
    }
    Ok(value)
}

fn parse_description(owner: &str, value: Option<&Value>) -> Result<Option<String>, ProtocolError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(ProtocolError::SchemaError(format!(
            "The description of {} must be a string",
            owner
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(document: Value) -> Result<ProtocolConfig, ProtocolError> {
        parse_protocol(&document)
    }

    #[test]
    fn test_scalar_array_and_custom_references() {
        let config = parse(json!({
            "types": { "item": { "id": "int", "name": "string" } },
            "commands": {
                "get_items": { "result": { "items": "item[]", "count": "int" } }
            },
            "events": {}
        }))
        .unwrap();

        let result = config.commands[0].result.as_ref().unwrap();
        assert_eq!(result[0].type_, Type::custom("item").array_of());
        assert_eq!(result[1].type_, Type::builtin(Builtin::Int));
        assert!(config.commands[0].params.is_none());
    }

    #[test]
    fn test_enumerated_list_keeps_order() {
        let config = parse(json!({
            "commands": { "set_difficulty": { "params": { "level": ["easy", "normal", "hard"] } } }
        }))
        .unwrap();
        let level = &config.commands[0].params.as_ref().unwrap()[0].type_;
        assert_eq!(level.kind, TypeKind::Builtin(Builtin::String));
        assert_eq!(
            level.enumerated_values.as_deref(),
            Some(&["easy".to_string(), "normal".to_string(), "hard".to_string()][..])
        );
    }

    #[test]
    fn test_false_default_is_not_absent() {
        let config = parse(json!({
            "commands": { "load": { "params": {
                "show_progress": { "type": "bool", "default": false },
                "quiet": { "type": "bool" },
                "retries": { "type": "int", "default": 3 },
                "path": { "type": "string", "default": "quest.qst" }
            } } }
        }))
        .unwrap();
        let params = config.commands[0].params.as_ref().unwrap();
        assert_eq!(params[0].type_.default_value, Some(DefaultValue::Bool(false)));
        assert_eq!(params[1].type_.default_value, None);
        assert_eq!(params[2].type_.default_value, Some(DefaultValue::Int(3)));
        assert_eq!(params[3].type_.default_value, Some(DefaultValue::String("quest.qst".into())));
    }

    #[test]
    fn test_unresolved_type_names_field() {
        let err = parse(json!({
            "commands": { "open": { "params": { "target": "widget" } } }
        }))
        .unwrap_err();
        match err {
            ProtocolError::UnresolvedType { type_name, owner } => {
                assert_eq!(type_name, "widget");
                assert_eq!(owner, "commands.open.params.target");
            }
            other => panic!("expected UnresolvedType, got {:?}", other),
        }
    }

    #[test]
    fn test_forward_and_self_references_fail() {
        let forward = parse(json!({
            "types": { "outer": { "inner": "inner" }, "inner": { "x": "int" } }
        }));
        assert!(matches!(forward, Err(ProtocolError::UnresolvedType { .. })));

        let cyclic = parse(json!({ "types": { "node": { "next": "node[]" } } }));
        assert!(matches!(cyclic, Err(ProtocolError::UnresolvedType { .. })));
    }

    #[test]
    fn test_malformed_entries() {
        let cases = [
            json!({ "types": { "t": { "x": 5 } } }),
            json!({ "types": { "t": { "x": "int[][]" } } }),
            json!({ "types": { "t": { "x": [] } } }),
            json!({ "types": { "t": { "x": ["a", 1] } } }),
            json!({ "types": { "t": { "x": { "default": 1 } } } }),
            json!({ "types": { "t": { "x": { "type": "int", "default": "one" } } } }),
            json!({ "types": { "t": { "x": { "type": "int", "default": 1.5 } } } }),
            json!({ "types": { "t": { "x": { "type": "int[]", "default": 1 } } } }),
            json!({ "types": { "t": { "x": { "type": ["a", "b"], "default": "c" } } } }),
            json!({ "types": { "t": { "x": { "type": "int", "min": 0 } } } }),
        ];
        for case in cases {
            let err = parse(case.clone()).unwrap_err();
            assert!(
                matches!(err, ProtocolError::MalformedType { .. }),
                "expected MalformedType for {} but got {:?}",
                case,
                err
            );
        }
    }

    #[test]
    fn test_default_on_composite_names_the_type() {
        let err = parse(json!({
            "types": {
                "item": { "id": "int" },
                "t": { "x": { "type": "item", "default": 1 }, "y": "int" },
            }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("not on item"), "{}", err);

        let err = parse(json!({ "types": { "t": { "x": { "type": "bool[]", "default": true } } } })).unwrap_err();
        assert!(err.to_string().contains("not on bool[]"), "{}", err);
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(parse(json!([])), Err(ProtocolError::SchemaError(_))));
        assert!(matches!(parse(json!({ "typse": {} })), Err(ProtocolError::SchemaError(_))));
        assert!(matches!(
            parse(json!({ "commands": { "quit": { "reply": {} } } })),
            Err(ProtocolError::SchemaError(_))
        ));
        assert!(matches!(
            parse(json!({ "events": { "saved": { "result": { "x": "int" } } } })),
            Err(ProtocolError::SchemaError(_))
        ));
    }

    #[test]
    fn test_null_bodies_and_descriptions() {
        let config = parse(json!({
            "types": { "empty": null },
            "commands": { "quit": null, "ping": { "description": "Round trip check.", "params": {} } },
            "events": { "saved": null }
        }))
        .unwrap();
        assert!(config.types[0].fields.is_empty());
        assert!(config.commands[0].params.is_none() && config.commands[0].result.is_none());
        assert!(config.commands[1].params.is_none());
        assert_eq!(config.commands[1].description.as_deref(), Some("Round trip check."));
        assert_eq!(config.events[0].method, "saved");
    }
}
