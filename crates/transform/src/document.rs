//! AsyncAPI document access
//!
//! The input is kept as a raw `serde_yaml::Value` tree. Only the two sections
//! the pipeline reads are given structure here; everything else is carried
//! through untouched.

use asyncapi_openapi_common::{Result, SchemaCatalog, TransformError, TransformWarning};
use serde_yaml::{Mapping, Value};

/// Parsed AsyncAPI document
#[derive(Debug, Clone)]
pub struct AsyncSpec {
    root: Value,
}

/// One entry of `components.messages`
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDef<'a> {
    /// Message name (the mapping key)
    pub name: String,

    /// Embedded schema body, `None` when the message has no `payload` key
    pub payload: Option<&'a Value>,
}

impl AsyncSpec {
    /// Parse an AsyncAPI document from YAML text
    pub fn parse(yaml: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(yaml)
            .map_err(|e| TransformError::Parse(format!("Failed to parse AsyncAPI YAML: {}", e)))?;
        Ok(Self::from_value(root))
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Value {
        &mut self.root
    }

    /// Messages in source order
    ///
    /// A missing `components.messages` section yields no messages. A section
    /// that is present but not a mapping is reported and treated as empty.
    pub fn messages(&self, warnings: &mut Vec<TransformWarning>) -> Vec<MessageDef<'_>> {
        let Some(messages) = self.section("messages", warnings) else {
            return Vec::new();
        };

        messages
            .iter()
            .filter_map(|(key, body)| {
                let name = key_name(key)?;
                Some(MessageDef {
                    name,
                    payload: body.get("payload"),
                })
            })
            .collect()
    }

    /// Names of all messages in source order
    pub fn message_names(&self) -> Vec<String> {
        self.messages(&mut Vec::new())
            .into_iter()
            .map(|m| m.name)
            .collect()
    }

    /// The raw `components.schemas` section, or an empty catalog
    ///
    /// Keys are spelled as strings, the same way message names are, so a
    /// schema and a payload with the same name collide.
    pub fn schemas(&self, warnings: &mut Vec<TransformWarning>) -> SchemaCatalog {
        let Some(schemas) = self.section("schemas", warnings) else {
            return SchemaCatalog::new();
        };

        schemas
            .iter()
            .map(|(key, body)| {
                let key = key_name(key).map(Value::String).unwrap_or_else(|| key.clone());
                (key, body.clone())
            })
            .collect()
    }

    fn section(&self, name: &str, warnings: &mut Vec<TransformWarning>) -> Option<&Mapping> {
        let components = match self.root.get("components") {
            None | Some(Value::Null) => return None,
            Some(Value::Mapping(components)) => components,
            Some(_) => {
                warnings.push(TransformWarning::NotAMapping("components".to_string()));
                return None;
            }
        };

        match components.get(name) {
            None | Some(Value::Null) => None,
            Some(Value::Mapping(section)) => Some(section),
            Some(_) => {
                warnings.push(TransformWarning::NotAMapping(format!("components.{}", name)));
                None
            }
        }
    }
}

/// Render a mapping key as a name
///
/// YAML allows numbers and booleans as keys; they are spelled the way they
/// appear in the document. Composite keys have no name.
pub(crate) fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
