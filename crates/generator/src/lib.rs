//! Event-handler code generation for realtime clients
//!
//! Renders a Rust `handlers` module from a message classification. The module
//! holds one optional callback per server-originated message, an `Attach`
//! trait for registering callbacks, and a `handle_event` dispatcher that
//! decodes the raw frame into the message model.
//!
//! Two flavours are rendered: plain `fn` callbacks with a blocking dispatcher,
//! or handlers returning a boxed future with an `async` dispatcher.

mod templates;

pub use templates::to_snake_case;

use asyncapi_openapi_common::{MessageClassification, Result, TransformError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tera::Tera;
use tracing::{debug, warn};

/// Settings for the generated module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerOptions {
    /// Module that holds the generated message models
    pub models_path: String,

    /// Name of the message-name enum in that module
    pub enum_name: String,

    /// Render future-returning handlers and an `async fn handle_event`
    pub asynchronous: bool,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            models_path: "crate::realtime::models".to_string(),
            enum_name: "Messages".to_string(),
            asynchronous: false,
        }
    }
}

/// Event-handler module generator
pub struct HandlerGenerator {
    messages: Vec<String>,
    /// Server messages without a handler slot
    skipped: Vec<String>,
    options: HandlerOptions,
    tera: Tera,
}

impl HandlerGenerator {
    /// Create a generator for the server-originated messages of `classification`
    ///
    /// Names that are not Rust identifiers get no handler slot; the
    /// dispatcher falls through for them.
    pub fn new(classification: &MessageClassification, options: HandlerOptions) -> Result<Self> {
        let tera = templates::load_templates()?;

        let (messages, skipped): (Vec<String>, Vec<String>) = classification
            .subscribe
            .iter()
            .cloned()
            .partition(|name| is_identifier(name));

        for name in &skipped {
            warn!("Skipping handler for '{}': not a Rust identifier", name);
        }

        Ok(Self {
            messages,
            skipped,
            options,
            tera,
        })
    }

    /// Messages that get a handler slot
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Messages left without a handler slot
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Render the handlers module
    pub fn render(&self) -> Result<String> {
        let context = self.create_context();
        self.tera
            .render("handlers.rs", &context)
            .map_err(|e| TransformError::Generation(format!("Template error: {:?}", e)))
    }

    /// Render the handlers module and write it to `output_path`
    pub fn generate_to_file(&self, output_path: &Path) -> Result<()> {
        let rendered = self.render()?;

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    TransformError::Generation(format!(
                        "Failed to create output directory: {}",
                        e
                    ))
                })?;
            }
        }

        fs::write(output_path, rendered).map_err(|e| {
            TransformError::Generation(format!(
                "Failed to write {}: {}",
                output_path.display(),
                e
            ))
        })?;

        debug!(
            "Wrote {} handler(s) to {}",
            self.messages.len(),
            output_path.display()
        );
        Ok(())
    }

    /// Suffix of the generated per-message type aliases
    fn type_suffix(&self) -> &'static str {
        if self.options.asynchronous {
            "Handler"
        } else {
            "Callback"
        }
    }

    fn create_context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("messages", &self.messages);
        context.insert("skipped", &self.skipped);
        context.insert("suffix", self.type_suffix());
        context.insert("options", &self.options);
        context
    }
}

/// Generate the handlers module (convenience function)
pub fn generate_handlers(classification: &MessageClassification, output_path: &str) -> Result<()> {
    let generator = HandlerGenerator::new(classification, HandlerOptions::default())?;
    generator.generate_to_file(Path::new(output_path))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
