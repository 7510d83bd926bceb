//! Wire messages mirroring `proto/dead_letter.proto`, plus conversions to
//! and from the core model.
//!
//! The structs are hand-derived rather than generated so the crate builds
//! without `protoc`. Keep them in lockstep with the `.proto` file: tags are
//! append-only, and every best-effort field is `optional` so its absence
//! survives the wire unchanged.

use letterbox_core::{Cause, DeadLetter, Payload, SourceCoordinates};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoDeadLetter {
    #[prost(string, tag = "1")]
    pub description: String,
    #[prost(message, repeated, tag = "2")]
    pub cause: Vec<ProtoCause>,
    #[prost(string, optional, tag = "3")]
    pub stack_trace: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub input_value: Option<ProtoPayload>,
    #[prost(string, optional, tag = "5")]
    pub topic: Option<String>,
    #[prost(int32, optional, tag = "6")]
    pub partition: Option<i32>,
    #[prost(int64, optional, tag = "7")]
    pub offset: Option<i64>,
    #[prost(message, optional, tag = "8")]
    pub input_key: Option<ProtoPayload>,
    #[prost(int64, optional, tag = "9")]
    pub timestamp_ms: Option<i64>,
    #[prost(bool, tag = "10")]
    pub causes_truncated: bool,
    #[prost(bool, tag = "11")]
    pub stack_trace_truncated: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoCause {
    #[prost(string, optional, tag = "1")]
    pub type_name: Option<String>,
    #[prost(string, tag = "2")]
    pub message: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoPayload {
    #[prost(bytes = "bytes", tag = "1")]
    pub body: ::bytes::Bytes,
    #[prost(string, optional, tag = "2")]
    pub type_tag: Option<String>,
}

impl From<&DeadLetter> for ProtoDeadLetter {
    fn from(letter: &DeadLetter) -> Self {
        let coordinates = &letter.coordinates;
        Self {
            description: letter.description.clone(),
            cause: letter.cause.iter().map(ProtoCause::from).collect(),
            stack_trace: letter.stack_trace.clone(),
            input_value: letter.input_value.as_ref().map(ProtoPayload::from),
            topic: coordinates.topic.clone(),
            partition: coordinates.partition,
            offset: coordinates.offset,
            input_key: letter.input_key.as_ref().map(ProtoPayload::from),
            timestamp_ms: coordinates.timestamp_ms,
            causes_truncated: letter.causes_truncated,
            stack_trace_truncated: letter.stack_trace_truncated,
        }
    }
}

impl From<ProtoDeadLetter> for DeadLetter {
    fn from(message: ProtoDeadLetter) -> Self {
        Self {
            description: message.description,
            cause: message.cause.into_iter().map(Cause::from).collect(),
            causes_truncated: message.causes_truncated,
            stack_trace: message.stack_trace,
            stack_trace_truncated: message.stack_trace_truncated,
            input_key: message.input_key.map(Payload::from),
            input_value: message.input_value.map(Payload::from),
            coordinates: SourceCoordinates {
                topic: message.topic,
                partition: message.partition,
                offset: message.offset,
                timestamp_ms: message.timestamp_ms,
            },
        }
    }
}

impl From<&Cause> for ProtoCause {
    fn from(cause: &Cause) -> Self {
        Self {
            type_name: cause.type_name.clone(),
            message: cause.message.clone(),
        }
    }
}

impl From<ProtoCause> for Cause {
    fn from(message: ProtoCause) -> Self {
        Self {
            type_name: message.type_name,
            message: message.message,
        }
    }
}

impl From<&Payload> for ProtoPayload {
    fn from(payload: &Payload) -> Self {
        Self {
            body: payload.body.clone(),
            type_tag: payload.type_tag.clone(),
        }
    }
}

impl From<ProtoPayload> for Payload {
    fn from(message: ProtoPayload) -> Self {
        Self {
            body: message.body,
            type_tag: message.type_tag,
        }
    }
}
