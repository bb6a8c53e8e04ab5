//! wiregen
//!
//! This crate is the entry point for projects using the protocol compiler:
//!
//! - the schema model (re-exported from `wiregen-schema`),
//! - the compiler API and `ProtocolError` (re-exported from `wiregen-compiler`),
//! - `generate_protocol`, a helper for build scripts that compiles a schema
//!   file and writes both artifacts into a directory.
//!
//! ```no_run
//! // build.rs
//! use std::{env, path::PathBuf};
//!
//! fn main() -> Result<(), wiregen::ProtocolError> {
//!     let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
//!     println!("cargo:rerun-if-changed=protocol.yml");
//!     wiregen::generate_protocol("protocol.yml", &out_dir, &wiregen::GenerateOptions::default())?;
//!     Ok(())
//! }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

pub use wiregen_compiler::{
    compile_protocol, generate, generate_declarations, generate_marshaling, load_document, parse_protocol,
    sync_stubs, verify_protocol, Artifacts, GenerateOptions, ProtocolError, SchemaFormat, StubSync,
    HANDLERS_PREAMBLE,
};
pub use wiregen_schema::{
    Builtin, Command, CustomType, DefaultValue, Descriptor, Event, Field, ProtocolConfig, Type, TypeKind,
};

/// File name of the declaration artifact written by [`generate_protocol`].
pub const DECLARATIONS_FILE: &str = "protocol_decl.rs";
/// File name of the marshaling artifact written by [`generate_protocol`].
pub const MARSHALING_FILE: &str = "protocol_marshal.rs";

/// Paths of the artifacts written by [`generate_protocol`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub declarations: PathBuf,
    pub marshaling:   PathBuf,
}

/// Reads and compiles a schema file.
pub fn load_protocol(schema: impl AsRef<Path>) -> Result<ProtocolConfig, ProtocolError> {
    let schema = schema.as_ref();
    let text = fs::read_to_string(schema)?;
    compile_protocol(&text, SchemaFormat::from_path(schema))
}

/// Writes `contents` to `path` unless the file already holds exactly that.
/// Returns whether the file was written.
pub fn write_if_changed(path: impl AsRef<Path>, contents: &str) -> Result<bool, ProtocolError> {
    let path = path.as_ref();
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == contents {
            debug!(path = %path.display(), "unchanged");
            return Ok(false);
        }
    }
    fs::write(path, contents)?;
    info!(path = %path.display(), "wrote");
    Ok(true)
}

/// Compiles `schema` and writes [`DECLARATIONS_FILE`] and [`MARSHALING_FILE`]
/// into `out_dir`. When `options` still names the default schema, the file
/// name of `schema` is used in the generated banner.
pub fn generate_protocol(
    schema: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    options: &GenerateOptions,
) -> Result<GeneratedFiles, ProtocolError> {
    let schema = schema.as_ref();
    let out_dir = out_dir.as_ref();
    let config = load_protocol(schema)?;

    let mut options = options.clone();
    if options.schema_name == GenerateOptions::default().schema_name {
        if let Some(name) = schema.file_name().and_then(|name| name.to_str()) {
            options.schema_name = name.to_string();
        }
    }
    let artifacts = generate(&config, &options)?;

    fs::create_dir_all(out_dir)?;
    let files = GeneratedFiles {
        declarations: out_dir.join(DECLARATIONS_FILE),
        marshaling:   out_dir.join(MARSHALING_FILE),
    };
    write_if_changed(&files.declarations, &artifacts.declarations)?;
    write_if_changed(&files.marshaling, &artifacts.marshaling)?;
    Ok(files)
}

/// Adds missing handler stubs to the handler file at `path`, creating it with
/// [`HANDLERS_PREAMBLE`] when it does not exist. Returns the methods that
/// received a stub.
pub fn sync_handler_file(config: &ProtocolConfig, path: impl AsRef<Path>) -> Result<Vec<String>, ProtocolError> {
    let path = path.as_ref();
    let text = if path.exists() {
        fs::read_to_string(path)?
    } else {
        info!(path = %path.display(), "creating handler file");
        HANDLERS_PREAMBLE.to_string()
    };
    let sync = sync_stubs(&config.commands, &text);
    if sync.is_changed() || !path.exists() {
        fs::write(path, &sync.text)?;
    }
    Ok(sync.inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "commands:\n  quit:\n  load_quest:\n    params:\n      path: string\nevents:\n  quest_saved:\n";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wiregen-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_generate_protocol_writes_both_artifacts() {
        let dir = scratch_dir("generate");
        let schema = dir.join("game.yml");
        fs::write(&schema, SCHEMA).unwrap();

        let files = generate_protocol(&schema, dir.join("out"), &GenerateOptions::default()).unwrap();
        let declarations = fs::read_to_string(&files.declarations).unwrap();
        let marshaling = fs::read_to_string(&files.marshaling).unwrap();
        assert!(declarations.contains("from game.yml"));
        assert!(declarations.contains("pub mod commands"));
        assert!(marshaling.contains("pub fn handle_command"));

        assert!(!write_if_changed(&files.marshaling, &marshaling).unwrap());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_sync_handler_file_creates_and_is_idempotent() {
        let dir = scratch_dir("handlers");
        let path = dir.join("handlers.rs");
        let config = compile_protocol(SCHEMA, SchemaFormat::Yaml).unwrap();

        let inserted = sync_handler_file(&config, &path).unwrap();
        assert_eq!(inserted, ["quit", "load_quest"]);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(HANDLERS_PREAMBLE));

        assert!(sync_handler_file(&config, &path).unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_schema_is_io_error() {
        let err = load_protocol("/nonexistent/protocol.yml").unwrap_err();
        assert!(matches!(err, ProtocolError::Io(_)));
    }
}
