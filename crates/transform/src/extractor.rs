//! Payload extraction
//!
//! Every message payload becomes a top-level schema named after the message.

use crate::document::MessageDef;
use asyncapi_openapi_common::{SchemaCatalog, TransformWarning};
use serde_yaml::{Mapping, Value};

/// Stage each message payload under the message name
///
/// Payloads are copied as-is; their shape is not inspected. A message without
/// a `payload` key is staged as an empty schema.
pub fn extract_payloads(
    messages: &[MessageDef<'_>],
    warnings: &mut Vec<TransformWarning>,
) -> SchemaCatalog {
    let mut catalog = SchemaCatalog::with_capacity(messages.len());

    for message in messages {
        let payload = match message.payload {
            Some(payload) => payload.clone(),
            None => {
                warnings.push(TransformWarning::MissingPayload(message.name.clone()));
                Value::Mapping(Mapping::new())
            }
        };

        catalog.insert(Value::String(message.name.clone()), payload);
    }

    catalog
}
