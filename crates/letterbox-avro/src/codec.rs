//! Frame layout and datum conversion for the row codec.
//!
//! Encoded layout: 2 magic bytes, a format byte, the writer schema version,
//! then a bare Avro datum (no container file). Decoding resolves the writer
//! schema named by the frame against the current reader schema, so bytes
//! from any older compatible writer decode with new fields at their
//! declared defaults.

use std::collections::HashMap;

use apache_avro::types::Value;
use apache_avro::{from_avro_datum, to_avro_datum};

use letterbox_core::{Cause, DeadLetter, EncodeLimits, Payload, SourceCoordinates};

use crate::schema;

/// Magic bytes opening every encoded dead letter.
pub const MAGIC: [u8; 2] = [0xDE, 0xAD];

/// Format byte identifying the row (Avro) codec.
pub const FORMAT_ROW: u8 = 0x01;

const HEADER_LEN: usize = 4;

/// Encoding failed. Does not happen for well-formed descriptors; kept as a
/// `Result` so an internal invariant breach surfaces instead of panicking.
#[derive(Debug, thiserror::Error)]
#[error("avro encoding failed: {0}")]
pub struct EncodeError(#[from] apache_avro::Error);

/// The bytes do not decode under any known schema version.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Shorter than the fixed frame header.
    #[error("frame too short: {len} bytes")]
    TruncatedFrame {
        /// Observed byte length.
        len: usize,
    },

    /// The first two bytes are not the dead-letter magic.
    #[error("bad magic: expected {MAGIC:02x?}, found {found:02x?}")]
    BadMagic {
        /// Observed leading bytes.
        found: [u8; 2],
    },

    /// The frame belongs to a different codec.
    #[error("not a row-codec frame: format byte {0:#04x}")]
    WrongFormat(u8),

    /// The writer schema version is not one this reader knows.
    #[error("unknown schema version {0}")]
    UnknownSchemaVersion(u8),

    /// The cause chain decoded empty. A descriptor always carries at least
    /// the originating cause; bytes without one are malformed, not minimal.
    #[error("decoded dead letter has an empty cause chain")]
    EmptyCauseChain,

    /// Datum decoding or schema resolution failed.
    #[error("avro decoding failed: {0}")]
    Avro(#[from] apache_avro::Error),

    /// The resolved value does not match the expected record shape.
    #[error("decoded record has unexpected shape at `{field}`")]
    UnexpectedShape {
        /// Field (or structural element) that did not match.
        field: &'static str,
    },
}

/// Row-oriented codec for [`DeadLetter`] records.
#[derive(Debug, Clone, Default)]
pub struct AvroDeadLetterCodec {
    limits: EncodeLimits,
}

impl AvroDeadLetterCodec {
    /// Codec with default encode limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec with explicit encode limits.
    pub fn with_limits(limits: EncodeLimits) -> Self {
        Self { limits }
    }

    /// Encode a descriptor under the current schema version, clamping it to
    /// the configured size bounds first.
    pub fn encode(&self, letter: &DeadLetter) -> Result<Vec<u8>, EncodeError> {
        let clamped = self.limits.apply(letter);
        let datum = to_avro_datum(schema::current(), to_value(&clamped))?;

        let mut out = Vec::with_capacity(HEADER_LEN + datum.len());
        out.extend_from_slice(&MAGIC);
        out.push(FORMAT_ROW);
        out.push(schema::CURRENT_VERSION);
        out.extend_from_slice(&datum);
        Ok(out)
    }

    /// Decode bytes produced by this codec at any known schema version.
    pub fn decode(&self, bytes: &[u8]) -> Result<DeadLetter, DecodeError> {
        let (version, body) = parse_frame(bytes)?;
        let writer = schema::for_version(version)
            .ok_or(DecodeError::UnknownSchemaVersion(version))?;

        let mut reader = body;
        let value = from_avro_datum(writer, &mut reader, Some(schema::current()))?;
        from_value(value)
    }
}

fn parse_frame(bytes: &[u8]) -> Result<(u8, &[u8]), DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::TruncatedFrame { len: bytes.len() });
    }
    if bytes[..2] != MAGIC {
        return Err(DecodeError::BadMagic {
            found: [bytes[0], bytes[1]],
        });
    }
    if bytes[2] != FORMAT_ROW {
        return Err(DecodeError::WrongFormat(bytes[2]));
    }
    Ok((bytes[3], &bytes[HEADER_LEN..]))
}

// ---------------------------------------------------------------------------
// Model -> Avro value
// ---------------------------------------------------------------------------

fn to_value(letter: &DeadLetter) -> Value {
    let coordinates = &letter.coordinates;
    Value::Record(vec![
        (
            "description".into(),
            Value::String(letter.description.clone()),
        ),
        (
            "cause".into(),
            Value::Array(letter.cause.iter().map(cause_to_value).collect()),
        ),
        (
            "stack_trace".into(),
            nullable(letter.stack_trace.clone().map(Value::String)),
        ),
        (
            "input_value".into(),
            nullable(letter.input_value.as_ref().map(payload_to_value)),
        ),
        (
            "topic".into(),
            nullable(coordinates.topic.clone().map(Value::String)),
        ),
        (
            "partition".into(),
            nullable(coordinates.partition.map(Value::Int)),
        ),
        ("offset".into(), nullable(coordinates.offset.map(Value::Long))),
        (
            "input_key".into(),
            nullable(letter.input_key.as_ref().map(payload_to_value)),
        ),
        (
            "timestamp_ms".into(),
            nullable(coordinates.timestamp_ms.map(Value::Long)),
        ),
        (
            "causes_truncated".into(),
            Value::Boolean(letter.causes_truncated),
        ),
        (
            "stack_trace_truncated".into(),
            Value::Boolean(letter.stack_trace_truncated),
        ),
    ])
}

fn cause_to_value(cause: &Cause) -> Value {
    Value::Record(vec![
        (
            "type_name".into(),
            nullable(cause.type_name.clone().map(Value::String)),
        ),
        ("message".into(), Value::String(cause.message.clone())),
    ])
}

fn payload_to_value(payload: &Payload) -> Value {
    Value::Record(vec![
        ("body".into(), Value::Bytes(payload.body.to_vec())),
        (
            "type_tag".into(),
            nullable(payload.type_tag.clone().map(Value::String)),
        ),
    ])
}

fn nullable(inner: Option<Value>) -> Value {
    match inner {
        None => Value::Union(0, Box::new(Value::Null)),
        Some(value) => Value::Union(1, Box::new(value)),
    }
}

// ---------------------------------------------------------------------------
// Avro value -> model
// ---------------------------------------------------------------------------

fn from_value(value: Value) -> Result<DeadLetter, DecodeError> {
    let mut fields = record_fields(value, "DeadLetter")?;

    let cause = match take(&mut fields, "cause")? {
        Value::Array(items) => items
            .into_iter()
            .map(cause_from_value)
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(shape("cause")),
    };
    if cause.is_empty() {
        return Err(DecodeError::EmptyCauseChain);
    }

    Ok(DeadLetter {
        description: string(take(&mut fields, "description")?, "description")?,
        cause,
        causes_truncated: match take(&mut fields, "causes_truncated")? {
            Value::Boolean(b) => b,
            _ => return Err(shape("causes_truncated")),
        },
        stack_trace: opt_string(take(&mut fields, "stack_trace")?, "stack_trace")?,
        stack_trace_truncated: match take(&mut fields, "stack_trace_truncated")? {
            Value::Boolean(b) => b,
            _ => return Err(shape("stack_trace_truncated")),
        },
        input_key: opt_payload(take(&mut fields, "input_key")?, "input_key")?,
        input_value: opt_payload(take(&mut fields, "input_value")?, "input_value")?,
        coordinates: SourceCoordinates {
            topic: opt_string(take(&mut fields, "topic")?, "topic")?,
            partition: match unwrap_union(take(&mut fields, "partition")?) {
                Value::Null => None,
                Value::Int(p) => Some(p),
                _ => return Err(shape("partition")),
            },
            offset: opt_long(take(&mut fields, "offset")?, "offset")?,
            timestamp_ms: opt_long(take(&mut fields, "timestamp_ms")?, "timestamp_ms")?,
        },
    })
}

fn cause_from_value(value: Value) -> Result<Cause, DecodeError> {
    let mut fields = record_fields(value, "cause entry")?;
    Ok(Cause {
        type_name: opt_string(take(&mut fields, "type_name")?, "type_name")?,
        message: string(take(&mut fields, "message")?, "message")?,
    })
}

fn opt_payload(value: Value, field: &'static str) -> Result<Option<Payload>, DecodeError> {
    match unwrap_union(value) {
        Value::Null => Ok(None),
        record @ Value::Record(_) => {
            let mut fields = record_fields(record, field)?;
            let body = match take(&mut fields, "body")? {
                Value::Bytes(bytes) => bytes,
                _ => return Err(shape("body")),
            };
            let mut payload = Payload::bytes(body);
            payload.type_tag = opt_string(take(&mut fields, "type_tag")?, "type_tag")?;
            Ok(Some(payload))
        }
        _ => Err(shape(field)),
    }
}

fn record_fields(
    value: Value,
    field: &'static str,
) -> Result<HashMap<String, Value>, DecodeError> {
    match value {
        Value::Record(fields) => Ok(fields.into_iter().collect()),
        _ => Err(shape(field)),
    }
}

fn take(fields: &mut HashMap<String, Value>, name: &'static str) -> Result<Value, DecodeError> {
    fields.remove(name).ok_or(DecodeError::UnexpectedShape { field: name })
}

fn string(value: Value, field: &'static str) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(shape(field)),
    }
}

fn opt_string(value: Value, field: &'static str) -> Result<Option<String>, DecodeError> {
    match unwrap_union(value) {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        _ => Err(shape(field)),
    }
}

fn opt_long(value: Value, field: &'static str) -> Result<Option<i64>, DecodeError> {
    match unwrap_union(value) {
        Value::Null => Ok(None),
        Value::Long(n) => Ok(Some(n)),
        _ => Err(shape(field)),
    }
}

fn unwrap_union(value: Value) -> Value {
    match value {
        Value::Union(_, inner) => *inner,
        other => other,
    }
}

fn shape(field: &'static str) -> DecodeError {
    DecodeError::UnexpectedShape { field }
}
