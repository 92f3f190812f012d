//! AsyncAPI to OpenAPI schema transformation
//!
//! Converts a message-oriented AsyncAPI document into an OpenAPI document that
//! standard client/server generators understand.
//!
//! ## Pipeline
//!
//! 1. **Rename** type names shared with a sibling spec (`TranscriptionConfig`
//!    → `RealtimeTranscriptionConfig`)
//! 2. **Classify** messages into client-originated (`publish`) and
//!    server-originated (`subscribe`)
//! 3. **Extract** each message payload as a schema named after the message
//! 4. **Synthesize** `RealtimeMessage`, `ServerMessages`, `ClientMessages` and
//!    `Messages`
//! 5. **Assemble** payload, synthetic and raw schemas (later wins) into the
//!    template's `components.schemas`
//!
//! ## Usage
//! ```rust,ignore
//! use asyncapi_openapi_common::TransformConfig;
//! use asyncapi_openapi_transform::transform_files;
//!
//! let output = transform_files(&TransformConfig::default())?;
//! for warning in &output.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! ```

mod assembler;
mod classifier;
mod document;
mod extractor;
mod pipeline;
mod renamer;
pub mod synthetic;

pub use assembler::{parse_template, DocumentAssembler};
pub use classifier::MessageClassifier;
pub use document::{AsyncSpec, MessageDef};
pub use extractor::extract_payloads;
pub use pipeline::{transform, transform_files, TransformOutput};
pub use renamer::{RenameRule, Renamer};
pub use synthetic::build_synthetic_schemas;
