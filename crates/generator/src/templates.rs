//! Template loading and management

use asyncapi_openapi_common::{Result, TransformError};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("snake_case", snake_case_filter);

    tera.add_raw_template(
        "handlers.rs",
        include_str!("../templates/handlers.rs.tera"),
    )
    .map_err(|e| {
        TransformError::Generation(format!("Failed to load handlers.rs template: {}", e))
    })?;

    Ok(tera)
}

/// Filter to convert a message name to a snake_case field name
fn snake_case_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("snake_case filter expects a string"))?;

    Ok(Value::String(to_snake_case(s)))
}

/// `AddPartialTranscript` → `add_partial_transcript`
///
/// Acronym runs stay together: `EndOfASRStream` → `end_of_asr_stream`.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let should_add_underscore = i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || (i + 1 < chars.len() && chars[i + 1].is_lowercase()));
            if should_add_underscore && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch == '-' || ch == ' ' || ch == '.' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(ch);
        }
    }

    result.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Error"), "error");
        assert_eq!(to_snake_case("RecognitionStarted"), "recognition_started");
        assert_eq!(to_snake_case("AddPartialTranscript"), "add_partial_transcript");
        assert_eq!(to_snake_case("EndOfASRStream"), "end_of_asr_stream");
        assert_eq!(to_snake_case("Audio2Added"), "audio2_added");
    }

    #[test]
    fn test_templates_load() {
        let tera = load_templates().unwrap();
        assert!(tera.get_template_names().any(|n| n == "handlers.rs"));
    }
}
