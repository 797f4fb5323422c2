use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn configuration into a component.
///
/// The message is part of the observable contract; callers and tooling may
/// match on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DeclarativeConfigError {
    message: String,
}

impl DeclarativeConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors encountered while reading or parsing a configuration document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read configuration at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration as JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("failed to parse configuration as YAML: {0}")]
    Yaml(#[source] serde_yaml::Error),
    #[error("failed to parse configuration as TOML: {0}")]
    Toml(#[source] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Failure to release a resource registered during component construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to close {resource}: {reason}")]
pub struct CloseError {
    pub resource: String,
    pub reason: String,
}

impl CloseError {
    pub fn new(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}
