//! Frame layout for the message codec.
//!
//! Encoded layout: 2 magic bytes, a format byte, the wire version, then a
//! length-free protobuf message. Additive evolution rides on protobuf's
//! unknown-field skipping, so the version byte only moves on a breaking
//! change; appended fields keep the same version.

use prost::Message as _;

use letterbox_core::{DeadLetter, EncodeLimits};

use crate::message::ProtoDeadLetter;

/// Magic bytes opening every encoded dead letter.
pub const MAGIC: [u8; 2] = [0xDE, 0xAD];

/// Format byte identifying the message (protobuf) codec.
pub const FORMAT_MESSAGE: u8 = 0x02;

/// Wire version written by the current encoder.
pub const CURRENT_VERSION: u8 = 1;

const HEADER_LEN: usize = 4;

/// The bytes do not decode as a message-codec frame.
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
    #[error("not a message-codec frame: format byte {0:#04x}")]
    WrongFormat(u8),

    /// The wire version signals an incompatible layout.
    #[error("unknown wire version {0}")]
    UnknownWireVersion(u8),

    /// The cause chain decoded empty. A descriptor always carries at least
    /// the originating cause; bytes without one are malformed, not minimal.
    #[error("decoded dead letter has an empty cause chain")]
    EmptyCauseChain,

    /// The message body is not valid protobuf.
    #[error("protobuf decoding failed: {0}")]
    Proto(#[from] prost::DecodeError),
}

/// Message-oriented codec for [`DeadLetter`] records.
#[derive(Debug, Clone, Default)]
pub struct ProtoDeadLetterCodec {
    limits: EncodeLimits,
}

impl ProtoDeadLetterCodec {
    /// Codec with default encode limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec with explicit encode limits.
    pub fn with_limits(limits: EncodeLimits) -> Self {
        Self { limits }
    }

    /// Encode a descriptor, clamping it to the configured size bounds first.
    /// Protobuf serialization of an in-memory message cannot fail.
    pub fn encode(&self, letter: &DeadLetter) -> Vec<u8> {
        let clamped = self.limits.apply(letter);
        let body = ProtoDeadLetter::from(&*clamped).encode_to_vec();

        let mut out = Vec::with_capacity(HEADER_LEN + body.len());
        out.extend_from_slice(&MAGIC);
        out.push(FORMAT_MESSAGE);
        out.push(CURRENT_VERSION);
        out.extend_from_slice(&body);
        out
    }

    /// Decode bytes produced by this codec. Fields appended by a newer
    /// writer at the same wire version are skipped, not rejected.
    pub fn decode(&self, bytes: &[u8]) -> Result<DeadLetter, DecodeError> {
        let body = parse_frame(bytes)?;
        let message = ProtoDeadLetter::decode(body)?;
        if message.cause.is_empty() {
            return Err(DecodeError::EmptyCauseChain);
        }
        Ok(message.into())
    }
}

fn parse_frame(bytes: &[u8]) -> Result<&[u8], DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::TruncatedFrame { len: bytes.len() });
    }
    if bytes[..2] != MAGIC {
        return Err(DecodeError::BadMagic {
            found: [bytes[0], bytes[1]],
        });
    }
    if bytes[2] != FORMAT_MESSAGE {
        return Err(DecodeError::WrongFormat(bytes[2]));
    }
    if bytes[3] != CURRENT_VERSION {
        return Err(DecodeError::UnknownWireVersion(bytes[3]));
    }
    Ok(&bytes[HEADER_LEN..])
}
