//! The resolved model of a wiregen protocol schema.
//!
//! A schema declares custom record types, commands (request/response) and
//! events (one-way notifications). The compiler resolves every type
//! reference and hands out a read-only [`ProtocolConfig`]:
//!
//! ```
//! use wiregen_schema::*;
//!
//! let config = ProtocolConfig {
//!     types: vec![CustomType {
//!         name: "item".to_owned(),
//!         fields: vec![
//!             Field { name: "id".to_owned(), type_: Type::builtin(Builtin::Int), description: None },
//!             Field { name: "name".to_owned(), type_: Type::builtin(Builtin::String), description: None },
//!         ],
//!     }],
//!     commands: vec![],
//!     events: vec![],
//! };
//!
//! assert_eq!(config.custom_type("item").unwrap().fields.len(), 2);
//! ```

pub mod types;

pub use types::*;
