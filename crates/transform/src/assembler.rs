//! Output document assembly
//!
//! Schemas are staged in the order they should take precedence (payloads,
//! synthetic schemas, raw spec schemas). A later stage replaces an earlier
//! entry with the same name. The result replaces the template's `components`.

use asyncapi_openapi_common::{Result, SchemaCatalog, TransformError};
use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Merges schema catalogs into an OpenAPI template
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    catalog: SchemaCatalog,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a catalog; its entries win over anything staged before
    pub fn stage(&mut self, schemas: SchemaCatalog) -> &mut Self {
        for (name, body) in schemas {
            if self.catalog.insert(name.clone(), body).is_some() {
                debug!("Schema {:?} replaced by a later definition", name);
            }
        }
        self
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Write the staged schemas into `template`
    ///
    /// Every top-level key except `components` is kept as it is. `components`
    /// is replaced by `{schemas: <catalog>}`, and created when the template
    /// has none.
    pub fn assemble(self, template: Value) -> Result<Value> {
        let mut document = match template {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            other => {
                return Err(TransformError::Template(format!(
                    "OpenAPI template root must be a mapping, found {}",
                    kind(&other)
                )))
            }
        };

        let mut components = Mapping::new();
        components.insert("schemas".into(), Value::Mapping(self.catalog));

        // Mapping::insert keeps the position of an existing key
        document.insert("components".into(), Value::Mapping(components));

        Ok(Value::Mapping(document))
    }
}

/// Parse the OpenAPI template
pub fn parse_template(yaml: &str) -> Result<Value> {
    serde_yaml::from_str(yaml)
        .map_err(|e| TransformError::Parse(format!("Failed to parse OpenAPI template: {}", e)))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(yaml: &str) -> SchemaCatalog {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_later_stage_wins() {
        let mut assembler = DocumentAssembler::new();
        assembler
            .stage(catalog("Foo: {type: string}\nBar: {type: integer}\n"))
            .stage(catalog("Foo: {type: object}\n"));

        let schemas = assembler.catalog();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas.get("Foo").unwrap()["type"].as_str(), Some("object"));
        assert_eq!(schemas.get("Bar").unwrap()["type"].as_str(), Some("integer"));
    }

    #[test]
    fn test_template_keys_preserved() {
        let template = parse_template(
            r#"
openapi: 3.0.0
info:
  title: OpenAPI Template
  version: 1.0.0
components:
  securitySchemes:
    bearer: {type: http}
paths: {}
"#,
        )
        .unwrap();

        let mut assembler = DocumentAssembler::new();
        assembler.stage(catalog("Foo: {type: string}\n"));
        let document = assembler.assemble(template).unwrap();

        let keys: Vec<&str> = document
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keys, vec!["openapi", "info", "components", "paths"]);
        assert_eq!(document["info"]["title"].as_str(), Some("OpenAPI Template"));

        // components is replaced wholesale
        let components = document["components"].as_mapping().unwrap();
        assert_eq!(components.len(), 1);
        assert!(document["components"]["schemas"]["Foo"].is_mapping());
    }

    #[test]
    fn test_missing_components_created() {
        let template = parse_template("openapi: 3.0.0\n").unwrap();
        let document = DocumentAssembler::new().assemble(template).unwrap();

        assert!(document["components"]["schemas"].is_mapping());
    }

    #[test]
    fn test_null_template() {
        let template = parse_template("~").unwrap();
        let document = DocumentAssembler::new().assemble(template).unwrap();
        assert!(document["components"]["schemas"].is_mapping());
    }

    #[test]
    fn test_scalar_template_rejected() {
        let template = parse_template("- not\n- a mapping\n").unwrap();
        let result = DocumentAssembler::new().assemble(template);
        assert!(matches!(result, Err(TransformError::Template(_))));
    }

    #[test]
    fn test_malformed_template() {
        let result = parse_template("openapi: [3.0.0");
        assert!(matches!(result, Err(TransformError::Parse(_))));
    }
}
