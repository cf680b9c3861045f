//! Error types for the control surface, worker startup, and configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::control::Attribute;

/// Rejections returned by the control surface. No state is mutated when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Input text was not a base-10 integer that fits in an `i32`.
    #[error("Invalid input: {input:?}")]
    InvalidInput { input: String },
    /// No attribute with this name exists.
    #[error("Unknown attribute: {name}")]
    UnknownAttribute { name: String },
    /// The attribute is write-only.
    #[error("Attribute {attribute} is not readable")]
    NotReadable { attribute: Attribute },
    /// The attribute is read-only.
    #[error("Attribute {attribute} is not writable")]
    NotWritable { attribute: Attribute },
}

#[derive(Debug, Error)]
pub enum StartError {
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {reason}")]
    Invalid { reason: String },
}
