//! Error types for code synthesis

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Reference collection '{definition}.{property}': {reason}")]
    ReferenceKey {
        definition: String,
        property: String,
        reason: String,
    },

    #[error("Duplicate accessor '{accessor}' in {definition} (properties '{first}' and '{second}')")]
    DuplicateAccessor {
        definition: String,
        accessor: String,
        first: String,
        second: String,
    },

    #[error("Default value '{value}' of '{definition}.{property}' is not a member of {enumeration}")]
    UnknownEnumDefault {
        definition: String,
        property: String,
        enumeration: String,
        value: String,
    },

    #[error("Cannot derive an identifier from '{0}'")]
    InvalidIdentifier(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Schema error: {0}")]
    Model(#[from] schemata_model::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while inspecting externally visible candidate types
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Type '{name}' could not be inspected: {reason}")]
    Unloadable { name: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
