//! Error types for schema document loading

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid schema document: {0}")]
    InvalidDocument(String),

    #[error("Invalid schema '{name}': {reason}")]
    InvalidSchema { name: String, reason: String },

    #[error("Invalid operation {method} {path}: {reason}")]
    InvalidOperation {
        method: String,
        path: String,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
