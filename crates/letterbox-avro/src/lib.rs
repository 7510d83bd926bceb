//! Row-oriented (Apache Avro) codec for dead-letter descriptors.
//!
//! One of the two wire representations of [`letterbox_core::DeadLetter`].
//! Each encoded record is a small frame — magic, format byte, writer schema
//! version — followed by a bare Avro datum. Schema evolution is additive
//! only; see [`schema`] for the embedded version history.
//!
//! ```
//! use letterbox_avro::AvroDeadLetterCodec;
//! use letterbox_core::DeadLetter;
//!
//! let letter = DeadLetter::builder("enrich shipment")
//!     .capture_backtrace(false)
//!     .from_error(&"country code missing".parse::<i32>().unwrap_err());
//!
//! let codec = AvroDeadLetterCodec::new();
//! let bytes = codec.encode(&letter).unwrap();
//! assert_eq!(codec.decode(&bytes).unwrap(), letter);
//! ```

mod codec;
pub mod schema;

pub use codec::{AvroDeadLetterCodec, DecodeError, EncodeError, FORMAT_ROW, MAGIC};
