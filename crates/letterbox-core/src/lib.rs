//! Error-capturing decorator and dead-letter model for stream processors.
//!
//! The host engine hands one record at a time to a wrapped transformation.
//! Every invocation yields either the transformed output or a structured,
//! serializable [`DeadLetter`] describing the failure — the pipeline never
//! stalls on a poison record and never drops it either.
//!
//! ```
//! use letterbox_core::{ErrorCapture, Record, split};
//!
//! let capture = ErrorCapture::new("parse order id");
//! let parse = capture.wrap_values(|_key: &String, value: &String| {
//!     value.parse::<u64>()
//! });
//!
//! let records = vec![
//!     Record::new("a".to_string(), "17".to_string()),
//!     Record::new("b".to_string(), "not a number".to_string()),
//! ];
//! let outcomes: Vec<_> = records
//!     .iter()
//!     .map(|r| parse(r).expect("no shutdown in flight"))
//!     .collect();
//!
//! let (ids, dead_letters) = split(outcomes);
//! assert_eq!(ids, vec![17]);
//! assert_eq!(dead_letters.len(), 1);
//! ```

pub mod capture;
pub mod descriptor;
pub mod limits;
pub mod outcome;
pub mod record;
pub mod split;

pub use capture::{is_cooperative, Cancellation, CaptureConfig, ErrorCapture};
pub use descriptor::{Cause, DeadLetter, DeadLetterBuilder};
pub use limits::EncodeLimits;
pub use outcome::Outcome;
pub use record::{AsPayload, Payload, Record, SourceCoordinates};
pub use split::{split, OutcomeIteratorExt};
