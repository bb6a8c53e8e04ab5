//! wiregen-compiler
//!
//! This crate implements:
//!  1) Loading of YAML/JSON protocol schemas into an order-preserving tree,
//!  2) A single-pass parser resolving every type reference against a
//!     per-run `TypeRegistry`,
//!  3) A verifier checking that schema names map onto distinct Rust names,
//!  4) Code generation of the declaration artifact (`generate_declarations`)
//!     and the marshaling artifact (`generate_marshaling`),
//!  5) Idempotent handler stub synchronization (`sync_stubs`),
//!  6) The error type (`ProtocolError`).

pub mod error;
pub mod utils;
pub mod document;
pub mod registry;
pub mod parser;
pub mod verifier;
pub mod naming;
pub mod options;
pub mod emitter;
pub mod gen_decl;
pub mod gen_marshal;
pub mod gen_dispatch;
pub mod stubs;

use syn::parse_quote;
use tracing::info;
use wiregen_schema::ProtocolConfig;

pub use document::{load_document, SchemaFormat};
pub use error::ProtocolError;
pub use options::GenerateOptions;
pub use parser::parse_protocol;
pub use stubs::{sync_stubs, StubSync, HANDLERS_PREAMBLE};
pub use verifier::verify_protocol;

use crate::emitter::RustFile;

/// Load, resolve and verify a schema document.
/// Returns `Err(ProtocolError)` if loading, resolution or verification fails.
pub fn compile_protocol(text: &str, format: SchemaFormat) -> Result<ProtocolConfig, ProtocolError> {
    let document = load_document(text, format)?;
    let config = parse_protocol(&document)?;
    verify_protocol(&config)?;
    info!(
        types = config.types.len(),
        commands = config.commands.len(),
        events = config.events.len(),
        "resolved protocol schema"
    );
    Ok(config)
}

/// The `types`, `commands` and `events` modules.
pub fn generate_declarations(config: &ProtocolConfig, options: &GenerateOptions) -> Result<String, ProtocolError> {
    verify_protocol(config)?;
    let mut file = RustFile::new();
    file.extend(gen_decl::declaration_items(config));
    let text = file.render(&options.schema_name);
    info!(bytes = text.len(), "generated declarations");
    Ok(text)
}

/// Readers, writers, ordinal mappings, the dispatch routine and one emitter
/// per event.
pub fn generate_marshaling(config: &ProtocolConfig, options: &GenerateOptions) -> Result<String, ProtocolError> {
    verify_protocol(config)?;
    let paths = options.paths()?;
    let mut file = RustFile::new();
    file.push(parse_quote! { use serde_json::{Map, Value}; });
    file.extend(gen_dispatch::mapping_items(config, &paths.declarations));
    file.extend(gen_marshal::reader_items(config, &paths.declarations));
    file.extend(gen_marshal::writer_items(config, &paths.declarations));
    file.extend(gen_dispatch::dispatch_items(config, &paths.declarations, &paths.handlers));
    file.extend(gen_dispatch::emit_items(config, &paths.declarations, &paths.broadcast));
    let text = file.render(&options.schema_name);
    info!(bytes = text.len(), "generated marshaling");
    Ok(text)
}

/// Both generated artifacts of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub declarations: String,
    pub marshaling:   String,
}

pub fn generate(config: &ProtocolConfig, options: &GenerateOptions) -> Result<Artifacts, ProtocolError> {
    Ok(Artifacts {
        declarations: generate_declarations(config, options)?,
        marshaling:   generate_marshaling(config, options)?,
    })
}
