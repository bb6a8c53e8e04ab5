use serde::Serialize;

/// The scalar kinds every schema can use without declaring them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Builtin {
    String,
    Int,
    Bool,
}

impl Builtin {
    pub const ALL: [Builtin; 3] = [Builtin::Int, Builtin::String, Builtin::Bool];

    /// Looks up a builtin by the name used in schema documents.
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            "string" => Some(Builtin::String),
            "int"    => Some(Builtin::Int),
            "bool"   => Some(Builtin::Bool),
            _        => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::String => "string",
            Builtin::Int    => "int",
            Builtin::Bool   => "bool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum TypeKind {
    Builtin(Builtin),
    Custom(String),
}

/// A declared default. `Bool(false)` is a present default, not an absent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    String(String),
    Int(i32),
    Bool(bool),
}

/// A resolved type reference.
///
/// `default_value` is only ever set on non-array builtins, and
/// `enumerated_values` only on non-array strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Type {
    pub kind:              TypeKind,
    pub is_array:          bool,
    pub default_value:     Option<DefaultValue>,
    pub enumerated_values: Option<Vec<String>>,
}

impl Type {
    pub fn builtin(builtin: Builtin) -> Type {
        Type {
            kind:              TypeKind::Builtin(builtin),
            is_array:          false,
            default_value:     None,
            enumerated_values: None,
        }
    }

    pub fn custom(name: &str) -> Type {
        Type {
            kind:              TypeKind::Custom(name.to_string()),
            is_array:          false,
            default_value:     None,
            enumerated_values: None,
        }
    }

    pub fn array_of(mut self) -> Type {
        self.is_array = true;
        self
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, TypeKind::Custom(_))
    }

    /// Custom and array values are written through their own writer instead
    /// of being converted in place.
    pub fn is_composite(&self) -> bool {
        self.is_array || self.is_custom()
    }

    pub fn as_builtin(&self) -> Option<Builtin> {
        match self.kind {
            TypeKind::Builtin(builtin) => Some(builtin),
            TypeKind::Custom(_)        => None,
        }
    }

    /// The element name as it appears in a schema, e.g. `int` or `item`.
    pub fn kind_name(&self) -> &str {
        match &self.kind {
            TypeKind::Builtin(builtin) => builtin.name(),
            TypeKind::Custom(name)     => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// The wire key, exactly as written in the schema.
    pub name:        String,
    #[serde(rename = "type")]
    pub type_:       Type,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomType {
    pub name:   String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub method:      String,
    pub params:      Option<Vec<Field>>,
    pub result:      Option<Vec<Field>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub method:      String,
    pub params:      Option<Vec<Field>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Shared view of commands and events, which both carry a method and a
/// parameter list.
pub trait Descriptor {
    fn method(&self) -> &str;
    fn params(&self) -> &[Field];
    fn description(&self) -> Option<&str>;
}

impl Descriptor for Command {
    fn method(&self) -> &str {
        &self.method
    }

    fn params(&self) -> &[Field] {
        self.params.as_deref().unwrap_or(&[])
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Descriptor for Event {
    fn method(&self) -> &str {
        &self.method
    }

    fn params(&self) -> &[Field] {
        self.params.as_deref().unwrap_or(&[])
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Command {
    pub fn result_fields(&self) -> &[Field] {
        self.result.as_deref().unwrap_or(&[])
    }
}

/// The root of a resolved schema. Order of every list is significant.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProtocolConfig {
    pub types:    Vec<CustomType>,
    pub commands: Vec<Command>,
    pub events:   Vec<Event>,
}

impl ProtocolConfig {
    pub fn custom_type(&self, name: &str) -> Option<&CustomType> {
        self.types.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_round_trip() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("float"), None);
    }

    #[test]
    fn test_composite_types() {
        assert!(!Type::builtin(Builtin::Int).is_composite());
        assert!(Type::builtin(Builtin::Int).array_of().is_composite());
        assert!(Type::custom("item").is_composite());
        assert_eq!(Type::custom("item").kind_name(), "item");
    }

    #[test]
    fn test_missing_params_read_as_empty() {
        let command = Command {
            method:      "quit".to_string(),
            params:      None,
            result:      None,
            description: None,
        };
        assert!(command.params().is_empty());
        assert!(command.result_fields().is_empty());
    }
}
