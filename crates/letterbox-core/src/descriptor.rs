//! Dead-letter descriptor: the serializable account of one failed record.
//!
//! A [`DeadLetter`] is built once, at capture time, and never mutated —
//! codecs only read it. It carries enough context to replay or inspect the
//! failure independently of the success path: the static description of the
//! failing step, the flattened cause chain, a rendered backtrace, the
//! original key/value, and source coordinates when known.

use std::any::Any;
use std::backtrace::Backtrace;
use std::error::Error;

use serde::{Deserialize, Serialize};

use crate::record::{Payload, SourceCoordinates};

/// Default bound on the flattened cause chain.
pub const DEFAULT_MAX_CAUSE_DEPTH: usize = 10;

/// Type name recorded for failures that surfaced as panics rather than
/// error values.
pub const PANIC_TYPE_NAME: &str = "panic";

/// One entry of the flattened cause chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// Concrete type of the failure, when known. Only the raised (outermost)
    /// error and panics have one; intermediate `dyn Error` sources do not
    /// expose their type.
    pub type_name: Option<String>,
    /// Rendered failure message.
    pub message: String,
}

/// Structured, immutable description of a single processing failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetter {
    /// Which processing step failed; supplied at decorator construction and
    /// shared by every descriptor the decorator produces.
    pub description: String,
    /// Cause chain ordered innermost-first: the originating failure, then
    /// each wrapping cause outward. Never empty.
    pub cause: Vec<Cause>,
    /// Set when the chain was cut to a configured depth, at build or encode
    /// time. Outermost wrappers are dropped first.
    pub causes_truncated: bool,
    /// Backtrace rendered as text at the capture site, when enabled.
    pub stack_trace: Option<String>,
    /// Set when the rendered backtrace was cut to a byte budget at encode
    /// time.
    pub stack_trace_truncated: bool,
    /// The failing record's key, captured as an opaque payload.
    pub input_key: Option<Payload>,
    /// The failing record's value, captured as an opaque payload.
    pub input_value: Option<Payload>,
    /// Source coordinates, best-effort.
    pub coordinates: SourceCoordinates,
}

impl DeadLetter {
    /// Start building a descriptor for the given processing step.
    pub fn builder(description: impl Into<String>) -> DeadLetterBuilder {
        DeadLetterBuilder {
            description: description.into(),
            max_cause_depth: DEFAULT_MAX_CAUSE_DEPTH,
            capture_backtrace: true,
            input_key: None,
            input_value: None,
            coordinates: SourceCoordinates::default(),
        }
    }

    /// The originating (innermost) cause.
    #[must_use]
    pub fn root_cause(&self) -> &Cause {
        // Every construction path guarantees a non-empty chain: the builder
        // always emits at least one entry and the codecs reject records
        // whose chain decodes empty.
        &self.cause[0]
    }
}

/// Pure builder assembling a [`DeadLetter`] from a raised failure plus
/// whatever context the capture site has.
#[derive(Debug, Clone)]
pub struct DeadLetterBuilder {
    description: String,
    max_cause_depth: usize,
    capture_backtrace: bool,
    input_key: Option<Payload>,
    input_value: Option<Payload>,
    coordinates: SourceCoordinates,
}

impl DeadLetterBuilder {
    /// Bound the flattened cause chain. Excess outermost wrappers are
    /// dropped and the truncation marker is set. A depth of zero is treated
    /// as one: the originating cause is always kept.
    #[must_use]
    pub fn max_cause_depth(mut self, depth: usize) -> Self {
        self.max_cause_depth = depth.max(1);
        self
    }

    /// Toggle backtrace rendering (on by default).
    #[must_use]
    pub fn capture_backtrace(mut self, capture: bool) -> Self {
        self.capture_backtrace = capture;
        self
    }

    /// Attach the failing record's captured key.
    #[must_use]
    pub fn input_key(mut self, key: Option<Payload>) -> Self {
        self.input_key = key;
        self
    }

    /// Attach the failing record's captured value.
    #[must_use]
    pub fn input_value(mut self, value: Option<Payload>) -> Self {
        self.input_value = value;
        self
    }

    /// Attach source coordinates.
    #[must_use]
    pub fn coordinates(mut self, coordinates: SourceCoordinates) -> Self {
        self.coordinates = coordinates;
        self
    }

    /// Build from an error value, flattening its `source()` chain.
    pub fn from_error<E: Error + 'static>(self, error: &E) -> DeadLetter {
        // Walk outermost-in, then reverse so the originating failure leads.
        let mut chain = vec![Cause {
            type_name: Some(std::any::type_name::<E>().to_string()),
            message: error.to_string(),
        }];
        let mut source = (error as &(dyn Error + 'static)).source();
        while let Some(cause) = source {
            chain.push(Cause {
                type_name: None,
                message: cause.to_string(),
            });
            source = cause.source();
        }
        chain.reverse();
        self.finish(chain)
    }

    /// Build from a panic payload. String payloads are preserved verbatim;
    /// anything else is recorded as opaque.
    pub fn from_panic(self, payload: &(dyn Any + Send)) -> DeadLetter {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "opaque panic payload".to_string()
        };
        let chain = vec![Cause {
            type_name: Some(PANIC_TYPE_NAME.to_string()),
            message,
        }];
        self.finish(chain)
    }

    fn finish(self, mut chain: Vec<Cause>) -> DeadLetter {
        let causes_truncated = chain.len() > self.max_cause_depth;
        chain.truncate(self.max_cause_depth);

        let stack_trace = self
            .capture_backtrace
            .then(|| Backtrace::force_capture().to_string());

        DeadLetter {
            description: self.description,
            cause: chain,
            causes_truncated,
            stack_trace,
            stack_trace_truncated: false,
            input_key: self.input_key,
            input_value: self.input_value,
            coordinates: self.coordinates,
        }
    }
}
