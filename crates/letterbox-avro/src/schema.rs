//! Versioned Avro schemas for the dead-letter record.
//!
//! Evolution is additive-only: a new version may append optional, defaulted
//! fields and must never remove or repurpose existing ones. Every historical
//! writer schema stays embedded here so any compatible version can be
//! resolved against the current reader schema.

use std::sync::OnceLock;

use apache_avro::Schema;

/// Version written by the current encoder.
pub const CURRENT_VERSION: u8 = 3;

/// First field set: description, cause chain, stack trace, input value, and
/// the topic/partition/offset coordinates.
const SCHEMA_V1_JSON: &str = r#"
{
  "type": "record",
  "name": "DeadLetter",
  "namespace": "io.letterbox",
  "fields": [
    {"name": "description", "type": "string"},
    {"name": "cause", "type": {"type": "array", "items": {
      "type": "record",
      "name": "Cause",
      "fields": [
        {"name": "type_name", "type": ["null", "string"], "default": null},
        {"name": "message", "type": "string"}
      ]
    }}, "default": []},
    {"name": "stack_trace", "type": ["null", "string"], "default": null},
    {"name": "input_value", "type": ["null", {
      "type": "record",
      "name": "Payload",
      "fields": [
        {"name": "body", "type": "bytes"},
        {"name": "type_tag", "type": ["null", "string"], "default": null}
      ]
    }], "default": null},
    {"name": "topic", "type": ["null", "string"], "default": null},
    {"name": "partition", "type": ["null", "int"], "default": null},
    {"name": "offset", "type": ["null", "long"], "default": null}
  ]
}
"#;

/// Adds the captured input key, the record timestamp, and the cause-chain
/// truncation marker.
const SCHEMA_V2_JSON: &str = r#"
{
  "type": "record",
  "name": "DeadLetter",
  "namespace": "io.letterbox",
  "fields": [
    {"name": "description", "type": "string"},
    {"name": "cause", "type": {"type": "array", "items": {
      "type": "record",
      "name": "Cause",
      "fields": [
        {"name": "type_name", "type": ["null", "string"], "default": null},
        {"name": "message", "type": "string"}
      ]
    }}, "default": []},
    {"name": "stack_trace", "type": ["null", "string"], "default": null},
    {"name": "input_value", "type": ["null", {
      "type": "record",
      "name": "Payload",
      "fields": [
        {"name": "body", "type": "bytes"},
        {"name": "type_tag", "type": ["null", "string"], "default": null}
      ]
    }], "default": null},
    {"name": "topic", "type": ["null", "string"], "default": null},
    {"name": "partition", "type": ["null", "int"], "default": null},
    {"name": "offset", "type": ["null", "long"], "default": null},
    {"name": "input_key", "type": ["null", "Payload"], "default": null},
    {"name": "timestamp_ms", "type": ["null", "long"], "default": null},
    {"name": "causes_truncated", "type": "boolean", "default": false}
  ]
}
"#;

/// Adds the stack-trace truncation marker.
const SCHEMA_V3_JSON: &str = r#"
{
  "type": "record",
  "name": "DeadLetter",
  "namespace": "io.letterbox",
  "fields": [
    {"name": "description", "type": "string"},
    {"name": "cause", "type": {"type": "array", "items": {
      "type": "record",
      "name": "Cause",
      "fields": [
        {"name": "type_name", "type": ["null", "string"], "default": null},
        {"name": "message", "type": "string"}
      ]
    }}, "default": []},
    {"name": "stack_trace", "type": ["null", "string"], "default": null},
    {"name": "input_value", "type": ["null", {
      "type": "record",
      "name": "Payload",
      "fields": [
        {"name": "body", "type": "bytes"},
        {"name": "type_tag", "type": ["null", "string"], "default": null}
      ]
    }], "default": null},
    {"name": "topic", "type": ["null", "string"], "default": null},
    {"name": "partition", "type": ["null", "int"], "default": null},
    {"name": "offset", "type": ["null", "long"], "default": null},
    {"name": "input_key", "type": ["null", "Payload"], "default": null},
    {"name": "timestamp_ms", "type": ["null", "long"], "default": null},
    {"name": "causes_truncated", "type": "boolean", "default": false},
    {"name": "stack_trace_truncated", "type": "boolean", "default": false}
  ]
}
"#;

fn parse(json: &str) -> Schema {
    // The embedded schemas are fixed at compile time; failing to parse one
    // is a build defect, not a runtime condition.
    Schema::parse_str(json).expect("embedded schema is valid")
}

/// The current writer/reader schema.
pub fn current() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| parse(SCHEMA_V3_JSON))
}

/// Writer schema for a historical version, if it is one we know.
pub fn for_version(version: u8) -> Option<&'static Schema> {
    static V1: OnceLock<Schema> = OnceLock::new();
    static V2: OnceLock<Schema> = OnceLock::new();
    match version {
        1 => Some(V1.get_or_init(|| parse(SCHEMA_V1_JSON))),
        2 => Some(V2.get_or_init(|| parse(SCHEMA_V2_JSON))),
        CURRENT_VERSION => Some(current()),
        _ => None,
    }
}
