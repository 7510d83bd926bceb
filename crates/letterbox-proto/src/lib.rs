//! Message-oriented (protobuf) codec for dead-letter descriptors.
//!
//! One of the two wire representations of [`letterbox_core::DeadLetter`].
//! Encoding is infallible; decoding tolerates fields appended by newer
//! writers by skipping what it does not know. The canonical field layout
//! lives in `proto/dead_letter.proto`.
//!
//! ```
//! use letterbox_core::DeadLetter;
//! use letterbox_proto::ProtoDeadLetterCodec;
//!
//! let letter = DeadLetter::builder("enrich shipment")
//!     .capture_backtrace(false)
//!     .from_error(&"country code missing".parse::<i32>().unwrap_err());
//!
//! let codec = ProtoDeadLetterCodec::new();
//! let bytes = codec.encode(&letter);
//! assert_eq!(codec.decode(&bytes).unwrap(), letter);
//! ```

mod codec;
pub mod message;

pub use codec::{
    DecodeError, ProtoDeadLetterCodec, CURRENT_VERSION, FORMAT_MESSAGE, MAGIC,
};
