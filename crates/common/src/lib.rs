//! Common types and utilities for the AsyncAPI to OpenAPI bridge
//!
//! This crate contains shared data structures, error types, and configuration
//! used across the transform, generator, and CLI components.

pub mod config;

pub use config::{ClientMessagesSource, RenameMode, TransformConfig};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while transforming a spec
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for transform operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Schema name to schema body, in insertion order.
///
/// Inserting an existing key replaces its value; later writers win.
pub type SchemaCatalog = serde_yaml::Mapping;

/// Message names split by the side that sends them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageClassification {
    /// Client-originated messages, in source order
    pub publish: Vec<String>,

    /// Server-originated messages, in source order
    pub subscribe: Vec<String>,
}

impl MessageClassification {
    /// Total number of classified messages
    pub fn len(&self) -> usize {
        self.publish.len() + self.subscribe.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publish.is_empty() && self.subscribe.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.publish.iter().any(|n| n == name) || self.subscribe.iter().any(|n| n == name)
    }
}

/// A lenient-policy event observed during a run
///
/// None of these abort the transformation. They are collected into the run
/// output and logged at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformWarning {
    /// A configured publish name has no matching message
    UnmatchedPublishName(String),

    /// A configured rename target does not occur in the spec
    UnmatchedRenameTarget(String),

    /// A message has no `payload` and was staged as an empty schema
    MissingPayload(String),

    /// A section that should be a mapping was something else and was read as empty
    NotAMapping(String),
}

impl fmt::Display for TransformWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformWarning::UnmatchedPublishName(name) => {
                write!(f, "publish message '{}' not found in spec", name)
            }
            TransformWarning::UnmatchedRenameTarget(name) => {
                write!(f, "rename target '{}' not found in spec", name)
            }
            TransformWarning::MissingPayload(name) => {
                write!(f, "message '{}' has no payload, using empty schema", name)
            }
            TransformWarning::NotAMapping(path) => {
                write!(f, "'{}' is not a mapping, treating it as empty", path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_contains() {
        let classification = MessageClassification {
            publish: vec!["AddAudio".to_string()],
            subscribe: vec!["AudioAdded".to_string()],
        };

        assert_eq!(classification.len(), 2);
        assert!(classification.contains("AddAudio"));
        assert!(classification.contains("AudioAdded"));
        assert!(!classification.contains("EndOfStream"));
    }

    #[test]
    fn test_warning_display() {
        let warning = TransformWarning::UnmatchedPublishName("SetRecognitionConfig".to_string());
        assert_eq!(
            warning.to_string(),
            "publish message 'SetRecognitionConfig' not found in spec"
        );
    }
}
