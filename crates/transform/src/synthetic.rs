//! Synthetic schemas
//!
//! Schemas that do not exist in the AsyncAPI spec but that generated clients
//! need: a message envelope and string enums of message names.

use asyncapi_openapi_common::{ClientMessagesSource, MessageClassification, SchemaCatalog};
use serde_yaml::{Mapping, Value};

pub const REALTIME_MESSAGE: &str = "RealtimeMessage";
pub const SERVER_MESSAGES: &str = "ServerMessages";
pub const CLIENT_MESSAGES: &str = "ClientMessages";
pub const MESSAGES: &str = "Messages";

/// Names of all synthetic schemas, in insertion order
pub const SYNTHETIC_SCHEMAS: &[&str] = &[
    REALTIME_MESSAGE,
    SERVER_MESSAGES,
    CLIENT_MESSAGES,
    MESSAGES,
];

/// Build the envelope and message-name enums for a classification
pub fn build_synthetic_schemas(
    classification: &MessageClassification,
    client_messages: ClientMessagesSource,
) -> SchemaCatalog {
    let client_names = match client_messages {
        ClientMessagesSource::Subscribe => &classification.subscribe,
        ClientMessagesSource::Publish => &classification.publish,
    };

    let mut catalog = SchemaCatalog::new();
    catalog.insert(REALTIME_MESSAGE.into(), envelope_schema());
    catalog.insert(SERVER_MESSAGES.into(), string_enum(&classification.subscribe));
    catalog.insert(CLIENT_MESSAGES.into(), string_enum(client_names));
    catalog.insert(MESSAGES.into(), string_enum(&classification.subscribe));
    catalog
}

/// `{type: object, properties: {message: {$ref: Messages}}}`
///
/// The reference is left for the consumer to resolve.
fn envelope_schema() -> Value {
    let mut reference = Mapping::new();
    reference.insert("$ref".into(), format!("#/components/schemas/{}", MESSAGES).into());

    let mut properties = Mapping::new();
    properties.insert("message".into(), Value::Mapping(reference));

    let mut schema = Mapping::new();
    schema.insert("type".into(), "object".into());
    schema.insert("properties".into(), Value::Mapping(properties));
    Value::Mapping(schema)
}

fn string_enum(names: &[String]) -> Value {
    let mut schema = Mapping::new();
    schema.insert("type".into(), "string".into());
    schema.insert(
        "enum".into(),
        Value::Sequence(names.iter().map(|n| Value::String(n.clone())).collect()),
    );
    Value::Mapping(schema)
}
