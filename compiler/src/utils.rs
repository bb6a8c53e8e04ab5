use serde_json::Value;

use crate::error::ProtocolError;

/// Quotes `text` the way it would appear in a JSON document.
pub fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

pub fn malformed(owner: &str, msg: &str) -> ProtocolError {
    ProtocolError::MalformedType {
        owner: owner.to_string(),
        msg:   msg.to_string(),
    }
}

/// Joins a dotted owner path, e.g. `commands.load_quest.params`.
pub fn owner_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}
