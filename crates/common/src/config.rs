//! Transform configuration
//!
//! Everything that used to be a hardcoded constant of the conversion script
//! lives here: file locations, the publish-message list, and the rename rules.
//! A config can be loaded from a YAML file; any key left out falls back to the
//! defaults below.

use crate::{Result, TransformError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Messages sent by the client in the realtime protocol
pub const DEFAULT_PUBLISH_MESSAGES: &[&str] = &[
    "StartRecognition",
    "AddAudio",
    "EndOfStream",
    "SetRecognitionConfig",
];

/// Type names shared with the batch spec that need disambiguation
pub const DEFAULT_RENAME_TARGETS: &[&str] = &["TranscriptionConfig", "DiarizationConfig"];

pub const DEFAULT_RENAME_PREFIX: &str = "Realtime";

/// How rename targets are located in the spec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameMode {
    /// Rename schema keys and `$ref` targets in the parsed document
    #[default]
    Tree,

    /// Rewrite left-bounded occurrences in the raw text before parsing
    Text,
}

/// Which message list populates the `ClientMessages` enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientMessagesSource {
    /// Server-originated names, matching the output of earlier releases
    #[default]
    Subscribe,

    /// Client-originated names
    Publish,
}

/// Configuration for one transformation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// AsyncAPI spec to read
    pub input_path: PathBuf,

    /// OpenAPI skeleton the schemas are merged into
    pub template_path: PathBuf,

    /// Where the generated OpenAPI document is written
    pub output_path: PathBuf,

    /// Message names classified as client-originated
    pub publish_messages: Vec<String>,

    /// Type names that receive `rename_prefix`
    pub rename_targets: Vec<String>,

    pub rename_prefix: String,

    pub rename_mode: RenameMode,

    pub client_messages_source: ClientMessagesSource,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("../schemas/realtime.yml"),
            template_path: PathBuf::from("template-openapi.yaml"),
            output_path: PathBuf::from("openapi-transformed.yaml"),
            publish_messages: DEFAULT_PUBLISH_MESSAGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rename_targets: DEFAULT_RENAME_TARGETS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rename_prefix: DEFAULT_RENAME_PREFIX.to_string(),
            rename_mode: RenameMode::default(),
            client_messages_source: ClientMessagesSource::default(),
        }
    }
}

impl TransformConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TransformError::Configuration(format!(
                "Failed to read config file {:?}: {}",
                path, e
            ))
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            TransformError::Configuration(msg) => {
                TransformError::Configuration(format!("{:?}: {}", path, msg))
            }
            other => other,
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| {
            TransformError::Configuration(format!("Failed to parse config YAML: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that would otherwise produce a broken document
    pub fn validate(&self) -> Result<()> {
        if self.rename_prefix.is_empty() && !self.rename_targets.is_empty() {
            return Err(TransformError::Configuration(
                "rename_prefix must not be empty when rename_targets are set".to_string(),
            ));
        }

        if let Some(bad) = self
            .rename_prefix
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(TransformError::Configuration(format!(
                "rename_prefix '{}' contains non-identifier character '{}'",
                self.rename_prefix, bad
            )));
        }

        if self.rename_targets.iter().any(|t| t.is_empty()) {
            return Err(TransformError::Configuration(format!(
                "empty rename target in {:?}",
                self.rename_targets
            )));
        }

        Ok(())
    }
}
