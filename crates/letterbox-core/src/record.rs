//! Input records, source coordinates, and opaque payload capture.
//!
//! [`Record`] is the per-invocation shape the host engine hands to a wrapped
//! transformation. [`Payload`] is how a record's key or value is preserved
//! inside a dead letter: raw bytes plus an optional type tag, never a
//! business schema the codecs would have to understand.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Where a record came from, when known.
///
/// Every field is best-effort: a failure occurring before a record reaches a
/// source-tracked stage legitimately has none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCoordinates {
    /// Source topic name.
    pub topic: Option<String>,
    /// Source partition.
    pub partition: Option<i32>,
    /// Offset within the partition.
    pub offset: Option<i64>,
    /// Record timestamp in epoch milliseconds.
    pub timestamp_ms: Option<i64>,
}

impl SourceCoordinates {
    /// Returns `true` when no coordinate is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topic.is_none()
            && self.partition.is_none()
            && self.offset.is_none()
            && self.timestamp_ms.is_none()
    }
}

/// One input record as delivered by the host engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<K, V> {
    /// Record key.
    pub key: K,
    /// Record value.
    pub value: V,
    /// Source coordinates, if the engine tracks them at this stage.
    pub coordinates: SourceCoordinates,
}

impl<K, V> Record<K, V> {
    /// Build a record without source coordinates.
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            coordinates: SourceCoordinates::default(),
        }
    }

    /// Attach source coordinates.
    #[must_use]
    pub fn with_coordinates(mut self, coordinates: SourceCoordinates) -> Self {
        self.coordinates = coordinates;
        self
    }
}

/// Captured key or value: opaque bytes plus an optional type tag.
///
/// The tag names the structured representation the bytes were derived from
/// (a Rust type path for [`Payload::from_serialize`], or whatever the caller
/// chooses). Codecs treat both parts as opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Raw captured bytes.
    pub body: Bytes,
    /// Optional name of the structured type the bytes encode.
    pub type_tag: Option<String>,
}

impl Payload {
    /// Capture raw bytes with no type information.
    pub fn bytes(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            type_tag: None,
        }
    }

    /// Capture UTF-8 text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            body: Bytes::from(text.into().into_bytes()),
            type_tag: None,
        }
    }

    /// Attach a type tag.
    #[must_use]
    pub fn with_type_tag(mut self, tag: impl Into<String>) -> Self {
        self.type_tag = Some(tag.into());
        self
    }

    /// Capture a structured value as JSON bytes tagged with its Rust type
    /// name. Falls back to `None` only if JSON serialization itself fails
    /// (e.g. a map with non-string keys).
    pub fn from_serialize<T: Serialize>(value: &T) -> Option<Self> {
        let body = serde_json::to_vec(value).ok()?;
        Some(Self {
            body: Bytes::from(body),
            type_tag: Some(std::any::type_name::<T>().to_string()),
        })
    }
}

/// Conversion into a captured [`Payload`], used by the capture decorator to
/// preserve the failing record's key and value.
///
/// Returning `None` means "this input has no payload to capture" (unit keys,
/// absent optional keys) — it is not an error signal.
pub trait AsPayload {
    /// Capture this input as an opaque payload.
    fn to_payload(&self) -> Option<Payload>;
}

impl AsPayload for () {
    fn to_payload(&self) -> Option<Payload> {
        None
    }
}

impl<T: AsPayload> AsPayload for Option<T> {
    fn to_payload(&self) -> Option<Payload> {
        self.as_ref().and_then(AsPayload::to_payload)
    }
}

impl AsPayload for Bytes {
    fn to_payload(&self) -> Option<Payload> {
        Some(Payload::bytes(self.clone()))
    }
}

impl AsPayload for Vec<u8> {
    fn to_payload(&self) -> Option<Payload> {
        Some(Payload::bytes(self.clone()))
    }
}

impl AsPayload for &[u8] {
    fn to_payload(&self) -> Option<Payload> {
        Some(Payload::bytes(self.to_vec()))
    }
}

impl AsPayload for String {
    fn to_payload(&self) -> Option<Payload> {
        Some(Payload::text(self.clone()))
    }
}

impl AsPayload for &str {
    fn to_payload(&self) -> Option<Payload> {
        Some(Payload::text(*self))
    }
}

macro_rules! impl_as_payload_for_int {
    ($($ty:ty),*) => {
        $(impl AsPayload for $ty {
            fn to_payload(&self) -> Option<Payload> {
                Some(Payload::text(self.to_string()).with_type_tag(stringify!($ty)))
            }
        })*
    };
}

impl_as_payload_for_int!(i8, i16, i32, i64, u8, u16, u32, u64);
