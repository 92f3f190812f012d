//! Identifier disambiguation
//!
//! The realtime and batch specs define types with the same names (for example
//! `TranscriptionConfig`). Code generated from both would clash, so the
//! realtime copies get a prefix.
//!
//! Two strategies are available:
//! - **Tree** renames schema keys and `$ref` targets of the parsed document by
//!   exact comparison. A longer identifier that merely contains a target is
//!   never touched.
//! - **Text** rewrites the raw YAML before parsing. A target only matches when
//!   the character in front of it is not part of an identifier, and targets are
//!   applied longest first so a shorter name never rewrites a fragment of an
//!   occurrence already handled.
//!
//! Both are idempotent: `RealtimeDiarizationConfig` is never turned into
//! `RealtimeRealtimeDiarizationConfig`.

use crate::document::key_name;
use asyncapi_openapi_common::{TransformConfig, TransformWarning};
use regex::{Captures, Regex};
use serde_yaml::{Mapping, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Component sections whose keys are type definitions
const DEFINITION_SECTIONS: &[&str] = &["schemas", "messages"];

/// A target identifier and the prefix it receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    pub target: String,
    pub prefix: String,
}

impl RenameRule {
    pub fn new(target: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            prefix: prefix.into(),
        }
    }

    /// The identifier every occurrence of `target` becomes
    pub fn replacement(&self) -> String {
        format!("{}{}", self.prefix, self.target)
    }
}

/// Applies a set of rename rules to a spec
#[derive(Debug, Clone, Default)]
pub struct Renamer {
    /// Longest target first
    rules: Vec<RenameRule>,
}

impl Renamer {
    /// Create a renamer giving every target the same prefix
    ///
    /// Duplicate and empty targets are dropped.
    pub fn new<I, S>(prefix: &str, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut rules: Vec<RenameRule> = targets
            .into_iter()
            .filter_map(|t| {
                let t = t.as_ref();
                (!t.is_empty() && seen.insert(t.to_string())).then(|| RenameRule::new(t, prefix))
            })
            .collect();

        // Stable sort keeps configuration order among equal lengths
        rules.sort_by(|a, b| b.target.len().cmp(&a.target.len()));

        Self { rules }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(&config.rename_prefix, &config.rename_targets)
    }

    /// Rules in the order they are applied
    pub fn rules(&self) -> &[RenameRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite left-bounded occurrences of each target in raw text
    pub fn rename_text(&self, text: &str, warnings: &mut Vec<TransformWarning>) -> String {
        let mut output = text.to_string();

        for rule in &self.rules {
            let pattern = format!(r"(^|[^A-Za-z0-9_]){}", regex::escape(&rule.target));
            let re = match Regex::new(&pattern) {
                Ok(re) => re,
                Err(e) => {
                    warn!("Skipping rename target '{}': {}", rule.target, e);
                    continue;
                }
            };

            let count = re.find_iter(&output).count();
            if count == 0 {
                unmatched(rule, warnings);
                continue;
            }

            let replacement = rule.replacement();
            output = re
                .replace_all(&output, |caps: &Captures| format!("{}{}", &caps[1], replacement))
                .into_owned();
            debug!(
                "Renamed {} occurrence(s) of {} to {}",
                count, rule.target, replacement
            );
        }

        output
    }

    /// Rename definition keys and `$ref` targets in a parsed document
    pub fn rename_tree(&self, root: &mut Value, warnings: &mut Vec<TransformWarning>) {
        if self.rules.is_empty() {
            return;
        }

        let lookup: HashMap<&str, String> = self
            .rules
            .iter()
            .map(|r| (r.target.as_str(), r.replacement()))
            .collect();
        let mut matched: HashSet<String> = HashSet::new();

        if let Some(components) = root.get_mut("components").and_then(Value::as_mapping_mut) {
            for section in DEFINITION_SECTIONS {
                if let Some(Value::Mapping(defs)) = components.get_mut(*section) {
                    let renamed = rename_keys(std::mem::take(defs), &lookup, &mut matched);
                    *defs = renamed;
                }
            }
        }

        rename_refs(root, &lookup, &mut matched);

        for rule in &self.rules {
            if matched.contains(&rule.target) {
                debug!("Renamed {} to {}", rule.target, rule.replacement());
            } else {
                unmatched(rule, warnings);
            }
        }
    }
}

fn unmatched(rule: &RenameRule, warnings: &mut Vec<TransformWarning>) {
    warnings.push(TransformWarning::UnmatchedRenameTarget(rule.target.clone()));
}

/// Rebuild a definition mapping with renamed keys, keeping entry order
fn rename_keys(
    defs: Mapping,
    lookup: &HashMap<&str, String>,
    matched: &mut HashSet<String>,
) -> Mapping {
    let mut renamed = Mapping::with_capacity(defs.len());

    for (key, body) in defs {
        let replacement = key_name(&key)
            .and_then(|name| lookup.get(name.as_str()).map(|r| (name, r.clone())));

        let new_key = match replacement {
            Some((name, replacement)) => {
                matched.insert(name);
                Value::String(replacement)
            }
            None => key,
        };

        if renamed.insert(new_key.clone(), body).is_some() {
            warn!(
                "Renamed definition {:?} collides with an existing one; keeping the renamed body",
                new_key
            );
        }
    }

    renamed
}

/// Rewrite every `$ref` that names a target definition by exact match
fn rename_refs(value: &mut Value, lookup: &HashMap<&str, String>, matched: &mut HashSet<String>) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map.iter_mut() {
                if key.as_str() == Some("$ref") {
                    if let Value::String(reference) = child {
                        if let Some(updated) = rename_reference(reference, lookup, matched) {
                            *reference = updated;
                        }
                        continue;
                    }
                }
                rename_refs(child, lookup, matched);
            }
        }
        Value::Sequence(items) => {
            for item in items {
                rename_refs(item, lookup, matched);
            }
        }
        Value::Tagged(tagged) => rename_refs(&mut tagged.value, lookup, matched),
        _ => {}
    }
}

fn rename_reference(
    reference: &str,
    lookup: &HashMap<&str, String>,
    matched: &mut HashSet<String>,
) -> Option<String> {
    let (base, name) = match reference.rsplit_once('/') {
        Some((base, name)) => (Some(base), name),
        None => (None, reference),
    };

    // Only references naming a definition; deeper paths point at properties
    if let Some(base) = base {
        let names_definition = DEFINITION_SECTIONS
            .iter()
            .any(|section| base.ends_with(&format!("#/components/{}", section)));
        if !names_definition {
            return None;
        }
    }

    let replacement = lookup.get(name)?;
    matched.insert(name.to_string());

    Some(match base {
        Some(base) => format!("{}/{}", base, replacement),
        None => replacement.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renamer() -> Renamer {
        Renamer::new("Realtime", ["DiarizationConfig", "TranscriptionConfig"])
    }

    #[test]
    fn test_rules_longest_first() {
        let renamer = Renamer::new("Realtime", ["Config", "DiarizationConfig", "Config", ""]);
        let targets: Vec<&str> = renamer.rules().iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["DiarizationConfig", "Config"]);
    }

    #[test]
    fn test_text_rename_is_left_bounded() {
        let text = "a: {$ref: '#/components/schemas/DiarizationConfig'}\nb: SpeakerDiarizationConfig\n";
        let mut warnings = Vec::new();
        let renamed = renamer().rename_text(text, &mut warnings);

        assert!(renamed.contains("#/components/schemas/RealtimeDiarizationConfig"));
        assert!(renamed.contains("b: SpeakerDiarizationConfig"));
        assert_eq!(
            warnings,
            vec![TransformWarning::UnmatchedRenameTarget(
                "TranscriptionConfig".to_string()
            )]
        );
    }

    #[test]
    fn test_text_rename_idempotent() {
        let text = "DiarizationConfig:\n  type: object\n";
        let once = renamer().rename_text(text, &mut Vec::new());
        let twice = renamer().rename_text(&once, &mut Vec::new());

        assert_eq!(once, "RealtimeDiarizationConfig:\n  type: object\n");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_text_rename_shorter_target_skips_handled_occurrence() {
        let renamer = Renamer::new("Realtime", ["Config", "ConfigSet"]);
        let renamed = renamer.rename_text("x: ConfigSet\ny: Config\n", &mut Vec::new());
        assert_eq!(renamed, "x: RealtimeConfigSet\ny: RealtimeConfig\n");
    }

    #[test]
    fn test_tree_rename_keys_and_refs() {
        let mut doc: Value = serde_yaml::from_str(
            r##"
components:
  messages:
    StartRecognition:
      payload:
        properties:
          transcription_config:
            $ref: "#/components/schemas/TranscriptionConfig"
          speaker:
            $ref: "#/components/schemas/SpeakerDiarizationConfig"
  schemas:
    TranscriptionConfig:
      type: object
    SpeakerDiarizationConfig:
      type: object
    DiarizationConfig:
      type: string
"##,
        )
        .unwrap();

        let mut warnings = Vec::new();
        renamer().rename_tree(&mut doc, &mut warnings);

        let schemas = doc["components"]["schemas"].as_mapping().unwrap();
        let keys: Vec<&str> = schemas.keys().filter_map(Value::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "RealtimeTranscriptionConfig",
                "SpeakerDiarizationConfig",
                "RealtimeDiarizationConfig"
            ]
        );

        let props = &doc["components"]["messages"]["StartRecognition"]["payload"]["properties"];
        assert_eq!(
            props["transcription_config"]["$ref"].as_str(),
            Some("#/components/schemas/RealtimeTranscriptionConfig")
        );
        assert_eq!(
            props["speaker"]["$ref"].as_str(),
            Some("#/components/schemas/SpeakerDiarizationConfig")
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_tree_rename_idempotent() {
        let mut doc: Value = serde_yaml::from_str(
            "components:\n  schemas:\n    DiarizationConfig: {type: string}\n",
        )
        .unwrap();

        renamer().rename_tree(&mut doc, &mut Vec::new());
        let once = doc.clone();

        let mut warnings = Vec::new();
        renamer().rename_tree(&mut doc, &mut warnings);

        assert_eq!(once, doc);
        assert!(doc["components"]["schemas"]
            .as_mapping()
            .unwrap()
            .contains_key("RealtimeDiarizationConfig"));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_tree_rename_sequences() {
        let mut doc: Value = serde_yaml::from_str(
            "oneOf:\n  - $ref: '#/components/schemas/DiarizationConfig'\n  - $ref: DiarizationConfig\n",
        )
        .unwrap();

        renamer().rename_tree(&mut doc, &mut Vec::new());

        assert_eq!(
            doc["oneOf"][0]["$ref"].as_str(),
            Some("#/components/schemas/RealtimeDiarizationConfig")
        );
        assert_eq!(doc["oneOf"][1]["$ref"].as_str(), Some("RealtimeDiarizationConfig"));
    }

    #[test]
    fn test_tree_rename_skips_property_paths() {
        let mut doc: Value = serde_yaml::from_str(
            r##"
components:
  schemas:
    Outer:
      properties:
        DiarizationConfig: {type: string}
    Holder:
      properties:
        inner:
          $ref: "#/components/schemas/Outer/properties/DiarizationConfig"
        external:
          $ref: "common.yml#/components/schemas/DiarizationConfig"
"##,
        )
        .unwrap();

        renamer().rename_tree(&mut doc, &mut Vec::new());

        let outer = doc["components"]["schemas"]["Outer"]["properties"]
            .as_mapping()
            .unwrap();
        assert!(outer.contains_key("DiarizationConfig"));

        let props = &doc["components"]["schemas"]["Holder"]["properties"];
        assert_eq!(
            props["inner"]["$ref"].as_str(),
            Some("#/components/schemas/Outer/properties/DiarizationConfig")
        );
        assert_eq!(
            props["external"]["$ref"].as_str(),
            Some("common.yml#/components/schemas/RealtimeDiarizationConfig")
        );
    }

    #[test]
    fn test_empty_renamer_is_noop() {
        let mut doc: Value = serde_yaml::from_str("a: DiarizationConfig\n").unwrap();
        let before = doc.clone();
        let mut warnings = Vec::new();

        Renamer::default().rename_tree(&mut doc, &mut warnings);

        assert_eq!(doc, before);
        assert!(warnings.is_empty());
    }
}
