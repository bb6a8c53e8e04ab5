use std::collections::HashMap;

use wiregen_schema::{Builtin, CustomType, TypeKind};

use crate::{error::ProtocolError, utils::quote};

/// Custom types known to one compilation run, in declaration order.
///
/// A type is only resolvable once it has been registered, which makes every
/// reference a backward reference.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    index: HashMap<String, usize>,
    types: Vec<CustomType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a bare element name (no array marker) for the field `owner`.
    pub fn resolve(&self, type_name: &str, owner: &str) -> Result<TypeKind, ProtocolError> {
        if let Some(builtin) = Builtin::from_name(type_name) {
            return Ok(TypeKind::Builtin(builtin));
        }
        if self.index.contains_key(type_name) {
            return Ok(TypeKind::Custom(type_name.to_string()));
        }
        Err(ProtocolError::UnresolvedType {
            type_name: type_name.to_string(),
            owner:     owner.to_string(),
        })
    }

    pub fn register(&mut self, custom_type: CustomType) -> Result<(), ProtocolError> {
        if Builtin::from_name(&custom_type.name).is_some() {
            return Err(ProtocolError::SchemaError(format!(
                "The type name {} is reserved",
                quote(&custom_type.name)
            )));
        }
        if self.index.contains_key(&custom_type.name) {
            return Err(ProtocolError::SchemaError(format!(
                "The type {} is defined twice",
                quote(&custom_type.name)
            )));
        }
        self.index.insert(custom_type.name.clone(), self.types.len());
        self.types.push(custom_type);
        Ok(())
    }

    pub fn into_types(self) -> Vec<CustomType> {
        self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty(name: &str) -> CustomType {
        CustomType { name: name.to_string(), fields: vec![] }
    }

    #[test]
    fn test_resolves_builtins_and_registered_types() {
        let mut registry = TypeRegistry::new();
        assert_eq!(registry.resolve("int", "x").unwrap(), TypeKind::Builtin(Builtin::Int));
        assert!(registry.resolve("item", "x").is_err());

        registry.register(empty("item")).unwrap();
        assert_eq!(registry.resolve("item", "x").unwrap(), TypeKind::Custom("item".to_string()));
        assert_eq!(registry.into_types(), [empty("item")]);
    }

    #[test]
    fn test_unresolved_names_owner() {
        let registry = TypeRegistry::new();
        match registry.resolve("widget", "commands.open.params.target") {
            Err(ProtocolError::UnresolvedType { type_name, owner }) => {
                assert_eq!(type_name, "widget");
                assert_eq!(owner, "commands.open.params.target");
            }
            other => panic!("expected UnresolvedType, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_duplicates_and_builtin_names() {
        let mut registry = TypeRegistry::new();
        registry.register(empty("item")).unwrap();
        assert!(registry.register(empty("item")).is_err());
        assert!(registry.register(empty("string")).is_err());
        assert_eq!(registry.into_types().len(), 1);
    }
}
