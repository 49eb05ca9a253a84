// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application

/// Invalid rule or engine configuration. Raised at registration/load time, never mid-extraction.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Rule identifier must not be empty")]
    EmptyIdentifier,

    #[error("Invalid pattern for rule '{id}': {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid stop boundary for rule '{id}': {source}")]
    InvalidBoundary {
        id: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule '{id}' captures group {capture} but its pattern only has {available} group(s)")]
    CaptureOutOfRange {
        id: String,
        capture: usize,
        available: usize,
    },

    #[error("Invalid delimiters for block kind '{kind}': {source}")]
    InvalidBlock {
        kind: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid transform step '{step}': {reason}")]
    InvalidTransform { step: &'static str, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Problems with the document handed to the extractor.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Document is {len} bytes, exceeding the {limit} byte input limit")]
    TooLarge { len: usize, limit: usize },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
