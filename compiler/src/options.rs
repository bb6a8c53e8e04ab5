use syn::Path;

use crate::error::ProtocolError;

/// Where the generated code finds its collaborators, plus the schema name
/// used in the generation banner.
///
/// Paths are written as Rust paths relative to the module the marshaling
/// artifact is included into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub schema_name:       String,
    /// Module holding the `types`, `commands` and `events` declarations.
    pub declarations_path: String,
    /// Module defining one `handle_<method>` function per command.
    pub handlers_path:     String,
    /// `fn(events::Type, serde_json::Value)` receiving every emitted event.
    pub broadcast_path:    String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            schema_name:       "protocol.yml".to_string(),
            declarations_path: "super".to_string(),
            handlers_path:     "super::handlers".to_string(),
            broadcast_path:    "super::broadcast_event".to_string(),
        }
    }
}

impl GenerateOptions {
    pub fn new(schema_name: &str) -> Self {
        GenerateOptions {
            schema_name: schema_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_declarations_path(mut self, path: &str) -> Self {
        self.declarations_path = path.to_string();
        self
    }

    pub fn with_handlers_path(mut self, path: &str) -> Self {
        self.handlers_path = path.to_string();
        self
    }

    pub fn with_broadcast_path(mut self, path: &str) -> Self {
        self.broadcast_path = path.to_string();
        self
    }

    pub(crate) fn paths(&self) -> Result<Paths, ProtocolError> {
        Ok(Paths {
            declarations: parse_path("declarations_path", &self.declarations_path)?,
            handlers:     parse_path("handlers_path", &self.handlers_path)?,
            broadcast:    parse_path("broadcast_path", &self.broadcast_path)?,
        })
    }
}

pub(crate) struct Paths {
    pub declarations: Path,
    pub handlers:     Path,
    pub broadcast:    Path,
}

fn parse_path(name: &str, text: &str) -> Result<Path, ProtocolError> {
    syn::parse_str::<Path>(text).map_err(|e| ProtocolError::InvalidOption {
        name: name.to_string(),
        msg:  format!("{} is not a Rust path: {}", text, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_parse() {
        assert!(GenerateOptions::default().paths().is_ok());
        let options = GenerateOptions::new("api.yml").with_handlers_path("crate::api::handlers");
        assert_eq!(options.schema_name, "api.yml");
        assert!(options.paths().is_ok());
    }

    #[test]
    fn test_rejects_invalid_path() {
        let options = GenerateOptions::default().with_broadcast_path("not a path");
        match options.paths() {
            Err(ProtocolError::InvalidOption { name, .. }) => assert_eq!(name, "broadcast_path"),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("expected an InvalidOption error"),
        }
    }
}
