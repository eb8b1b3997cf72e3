//! API Schema Document Model
//!
//! In-memory representation of a declarative API schema: named type
//! definitions (objects and enumerations) with properties, single
//! inheritance and vendor extensions, plus the operations exposed by the API
//! grouped by path and method.
//!
//! The model is built once by [`parser::parse_document`] from a Swagger 2.0
//! or OpenAPI 3 JSON document and is immutable afterwards. Besides plain data
//! it only answers structural questions: walking the inheritance chain and
//! looking up vendor extensions along it.
//!
//! # Example
//!
//! ```rust
//! use schemata_model::SchemaDocument;
//!
//! let document = SchemaDocument::from_json_str(r#"{
//!     "swagger": "2.0",
//!     "definitions": {
//!         "Customer": {
//!             "type": "object",
//!             "x-id": "id",
//!             "properties": { "id": { "type": "integer" } }
//!         }
//!     },
//!     "paths": {}
//! }"#).unwrap();
//!
//! let customer = document.definition("Customer").unwrap();
//! let (key, owner) = document.primary_key(customer).unwrap();
//! assert_eq!(key.name, "id");
//! assert_eq!(owner.name, "Customer");
//! ```

pub mod document;
pub mod error;
pub mod extensions;
pub mod parser;

pub use document::{
    DefinitionKind, EnumValue, HttpMethod, NamedProperty, OperationDescriptor, Parameter,
    ParameterLocation, PropertySchema, PropertyType, SchemaDefinition, SchemaDocument,
};
pub use error::{Error, Result};
pub use extensions::Extensions;
pub use parser::parse_document;
