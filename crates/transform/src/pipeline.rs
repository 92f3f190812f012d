//! End-to-end transformation
//!
//! rename → classify → extract payloads → synthesize → assemble

use crate::assembler::{parse_template, DocumentAssembler};
use crate::classifier::MessageClassifier;
use crate::document::AsyncSpec;
use crate::extractor::extract_payloads;
use crate::renamer::Renamer;
use crate::synthetic::build_synthetic_schemas;
use asyncapi_openapi_common::{
    MessageClassification, RenameMode, Result, TransformConfig, TransformError, TransformWarning,
};
use serde_yaml::Value;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Everything one transformation run produces
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// The template with `components.schemas` populated
    pub document: Value,

    pub classification: MessageClassification,

    /// Lenient-policy events, in the order they occurred
    pub warnings: Vec<TransformWarning>,
}

impl TransformOutput {
    /// Serialize the output document
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.document)?)
    }

    /// Names in `components.schemas`, in document order
    pub fn schema_names(&self) -> Vec<String> {
        self.document
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(Value::as_mapping)
            .map(|schemas| {
                schemas
                    .keys()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Transform AsyncAPI YAML into an OpenAPI document built on `template`
///
/// Both documents are parsed before any other work, so a malformed input
/// fails without side effects. Every later irregularity is recorded in
/// [`TransformOutput::warnings`] instead of failing the run.
pub fn transform(spec: &str, template: &str, config: &TransformConfig) -> Result<TransformOutput> {
    let mut warnings = Vec::new();
    let renamer = Renamer::from_config(config);

    let mut spec = match config.rename_mode {
        RenameMode::Text => AsyncSpec::parse(&renamer.rename_text(spec, &mut warnings))?,
        RenameMode::Tree => AsyncSpec::parse(spec)?,
    };
    let template = parse_template(template)?;

    if config.rename_mode == RenameMode::Tree {
        renamer.rename_tree(spec.root_mut(), &mut warnings);
    }

    let messages = spec.messages(&mut warnings);
    let classification = MessageClassifier::from_config(config).classify(
        messages.iter().map(|m| m.name.as_str()),
        &mut warnings,
    );

    let payloads = extract_payloads(&messages, &mut warnings);
    let synthetic = build_synthetic_schemas(&classification, config.client_messages_source);
    let raw = spec.schemas(&mut warnings);

    let mut assembler = DocumentAssembler::new();
    assembler.stage(payloads).stage(synthetic).stage(raw);
    let document = assembler.assemble(template)?;

    for warning in &warnings {
        warn!("{}", warning);
    }

    info!(
        "Transformed {} messages ({} publish, {} subscribe) with {} warning(s)",
        classification.len(),
        classification.publish.len(),
        classification.subscribe.len(),
        warnings.len()
    );

    Ok(TransformOutput {
        document,
        classification,
        warnings,
    })
}

/// Run [`transform`] on the files named in `config`
///
/// The output file is only written once the whole document has been built
/// and serialized.
pub fn transform_files(config: &TransformConfig) -> Result<TransformOutput> {
    let spec = read_document(&config.input_path, "AsyncAPI spec")?;
    let template = read_document(&config.template_path, "OpenAPI template")?;

    let output = transform(&spec, &template, config)?;
    let yaml = output.to_yaml()?;

    if let Some(parent) = config.output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&config.output_path, yaml)?;

    info!("Wrote {}", config.output_path.display());
    Ok(output)
}

fn read_document(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        TransformError::Io(io::Error::new(
            e.kind(),
            format!("Failed to read {} {}: {}", what, path.display(), e),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r##"
asyncapi: 2.0.0
components:
  messages:
    StartRecognition:
      payload:
        type: object
        properties:
          transcription_config:
            $ref: "#/components/schemas/TranscriptionConfig"
    AddAudio:
      payload:
        type: string
        format: binary
    RecognitionStarted:
      payload:
        type: object
  schemas:
    TranscriptionConfig:
      type: object
    AddAudio:
      type: object
"##;

    const TEMPLATE: &str = "openapi: 3.0.0\ninfo:\n  title: OpenAPI Template\n  version: 1.0.0\npaths: {}\n";

    fn config() -> TransformConfig {
        TransformConfig {
            publish_messages: vec!["StartRecognition".to_string(), "AddAudio".to_string()],
            rename_targets: vec!["TranscriptionConfig".to_string()],
            ..TransformConfig::default()
        }
    }

    #[test]
    fn test_transform_orders_schemas() {
        let output = transform(SPEC, TEMPLATE, &config()).unwrap();

        assert_eq!(
            output.schema_names(),
            vec![
                "StartRecognition",
                "AddAudio",
                "RecognitionStarted",
                "RealtimeMessage",
                "ServerMessages",
                "ClientMessages",
                "Messages",
                "RealtimeTranscriptionConfig",
            ]
        );
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_raw_schema_wins_over_payload() {
        let output = transform(SPEC, TEMPLATE, &config()).unwrap();
        let schemas = &output.document["components"]["schemas"];
        assert_eq!(schemas["AddAudio"]["type"].as_str(), Some("object"));
        assert!(schemas["AddAudio"].get("format").is_none());
    }

    #[test]
    fn test_text_mode_matches_tree_mode_here() {
        let tree = transform(SPEC, TEMPLATE, &config()).unwrap();
        let text = transform(
            SPEC,
            TEMPLATE,
            &TransformConfig {
                rename_mode: RenameMode::Text,
                ..config()
            },
        )
        .unwrap();

        assert_eq!(tree.document, text.document);
    }

    #[test]
    fn test_unmatched_configuration_is_not_fatal() {
        let config = TransformConfig {
            publish_messages: vec!["SetRecognitionConfig".to_string()],
            rename_targets: vec!["DiarizationConfig".to_string()],
            ..TransformConfig::default()
        };

        let output = transform(SPEC, TEMPLATE, &config).unwrap();
        assert!(output.classification.publish.is_empty());
        assert_eq!(output.classification.subscribe.len(), 3);
        assert_eq!(
            output.warnings,
            vec![
                TransformWarning::UnmatchedRenameTarget("DiarizationConfig".to_string()),
                TransformWarning::UnmatchedPublishName("SetRecognitionConfig".to_string()),
            ]
        );
    }

    #[test]
    fn test_numeric_names_collide() {
        let spec = "components:\n  messages:\n    200:\n      payload: {type: string}\n  schemas:\n    200: {type: object}\n";
        let output = transform(spec, TEMPLATE, &TransformConfig::default()).unwrap();

        let schemas = output.document["components"]["schemas"].as_mapping().unwrap();
        assert_eq!(output.schema_names().iter().filter(|n| *n == "200").count(), 1);
        assert!(schemas.keys().all(Value::is_string));
        assert_eq!(
            schemas.get("200").and_then(|s| s.get("type")).and_then(Value::as_str),
            Some("object")
        );
    }

    #[test]
    fn test_parse_errors_are_fatal() {
        let result = transform("components: [", TEMPLATE, &config());
        assert!(matches!(result, Err(TransformError::Parse(_))));

        let result = transform(SPEC, "openapi: {", &config());
        assert!(matches!(result, Err(TransformError::Parse(_))));
    }
}
