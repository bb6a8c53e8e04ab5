use std::path::Path;

use serde_json::Value;

use crate::error::ProtocolError;

/// The text formats a schema document may be written in. Both load into the
/// same order-preserving `serde_json::Value` tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaFormat {
    #[default]
    Yaml,
    Json,
}

impl SchemaFormat {
    /// `.json` files are JSON, everything else is treated as YAML.
    pub fn from_path(path: &Path) -> SchemaFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SchemaFormat::Json,
            _ => SchemaFormat::Yaml,
        }
    }
}

pub fn load_document(text: &str, format: SchemaFormat) -> Result<Value, ProtocolError> {
    let document = match format {
        SchemaFormat::Yaml => serde_yaml::from_str::<Value>(text)?,
        SchemaFormat::Json => serde_json::from_str::<Value>(text)?,
    };
    Ok(document)
}
