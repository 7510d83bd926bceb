//! Capture decorator: runs a user transformation inside a failure boundary.
//!
//! Wrapped functions take the record by reference, so the original key and
//! value are still available for the descriptor when the call fails. The
//! boundary converts returned errors and panics into [`DeadLetter`]s, with
//! one carve-out: cooperative shutdown signals pass through untouched. The
//! decorator never retries, never logs, never drops a record, and holds no
//! mutable state — one instance may be shared across partition tasks.

use std::error::Error;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

use crate::descriptor::{DeadLetter, DeadLetterBuilder, DEFAULT_MAX_CAUSE_DEPTH};
use crate::outcome::Outcome;
use crate::record::{AsPayload, Record};

/// Cooperative shutdown/cancellation signal.
///
/// Raising this (as an error anywhere in a source chain, or as a panic
/// payload via `panic_any`) tells the capture boundary to re-surface the
/// failure to the host engine instead of converting it into a dead letter.
#[derive(Debug, Clone, thiserror::Error)]
#[error("cooperative shutdown: {reason}")]
pub struct Cancellation {
    reason: String,
}

impl Cancellation {
    /// Signal with a human-readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The stated shutdown reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Default forward filter: `true` when the error or any of its sources is a
/// [`Cancellation`]. Matching errors are re-raised, not captured.
pub fn is_cooperative<E: Error + 'static>(error: &E) -> bool {
    let mut current: Option<&(dyn Error + 'static)> = Some(error);
    while let Some(e) = current {
        if e.is::<Cancellation>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Knobs for descriptor construction at the capture site.
#[derive(Debug, Clone, Copy)]
pub struct CaptureConfig {
    /// Bound on the flattened cause chain; excess outermost wrappers are
    /// dropped and the truncation marker set.
    pub max_cause_depth: usize,
    /// Render a backtrace at the capture site (on by default).
    pub capture_backtrace: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_cause_depth: DEFAULT_MAX_CAUSE_DEPTH,
            capture_backtrace: true,
        }
    }
}

/// Factory for wrapped transformations sharing one step description.
///
/// Each `wrap_*` method decorates a transformation shape, producing a
/// closure the host engine calls once per record:
///
/// - the inner `Outcome` is the per-record result (success or dead letter);
/// - the outer `Result` only ever carries forwarded errors — cooperative
///   signals the engine must see, matching the original raised value.
#[derive(Debug, Clone)]
pub struct ErrorCapture {
    description: String,
    config: CaptureConfig,
}

impl ErrorCapture {
    /// Decorator with default config.
    pub fn new(description: impl Into<String>) -> Self {
        Self::with_config(description, CaptureConfig::default())
    }

    /// Decorator with explicit config.
    pub fn with_config(description: impl Into<String>, config: CaptureConfig) -> Self {
        Self {
            description: description.into(),
            config,
        }
    }

    /// The static step description stamped on every descriptor.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Wrap a value mapper `(&K, &V) -> Result<O, E>`.
    pub fn wrap_values<K, V, O, E, F>(
        &self,
        f: F,
    ) -> impl Fn(&Record<K, V>) -> Result<Outcome<O, DeadLetter>, E>
    where
        K: AsPayload,
        V: AsPayload,
        E: Error + 'static,
        F: Fn(&K, &V) -> Result<O, E>,
    {
        self.wrap_values_with(f, is_cooperative::<E>)
    }

    /// Wrap a value mapper with a custom forward filter. Errors for which
    /// `forward` returns `true` are re-raised instead of captured.
    pub fn wrap_values_with<K, V, O, E, F, G>(
        &self,
        f: F,
        forward: G,
    ) -> impl Fn(&Record<K, V>) -> Result<Outcome<O, DeadLetter>, E>
    where
        K: AsPayload,
        V: AsPayload,
        E: Error + 'static,
        F: Fn(&K, &V) -> Result<O, E>,
        G: Fn(&E) -> bool,
    {
        let description = self.description.clone();
        let config = self.config;
        move |record| {
            capture_call(
                &description,
                config,
                record,
                || f(&record.key, &record.value),
                &forward,
            )
        }
    }

    /// Wrap a key-value mapper producing a new key alongside the new value.
    pub fn wrap_key_values<K, V, KR, VR, E, F>(
        &self,
        f: F,
    ) -> impl Fn(&Record<K, V>) -> Result<Outcome<(KR, VR), DeadLetter>, E>
    where
        K: AsPayload,
        V: AsPayload,
        E: Error + 'static,
        F: Fn(&K, &V) -> Result<(KR, VR), E>,
    {
        self.wrap_values(f)
    }

    /// Wrap a predicate `(&K, &V) -> Result<bool, E>`.
    pub fn wrap_predicate<K, V, E, F>(
        &self,
        f: F,
    ) -> impl Fn(&Record<K, V>) -> Result<Outcome<bool, DeadLetter>, E>
    where
        K: AsPayload,
        V: AsPayload,
        E: Error + 'static,
        F: Fn(&K, &V) -> Result<bool, E>,
    {
        self.wrap_values(f)
    }

    /// Wrap a flat-mapping transformation producing zero or more outputs.
    ///
    /// All-or-nothing per input: a failing invocation yields exactly one
    /// `Failure` element and suppresses any partially produced outputs, so
    /// downstream never sees ambiguous partial state.
    pub fn wrap_flat_values<K, V, O, E, F>(
        &self,
        f: F,
    ) -> impl Fn(&Record<K, V>) -> Result<Vec<Outcome<O, DeadLetter>>, E>
    where
        K: AsPayload,
        V: AsPayload,
        E: Error + 'static,
        F: Fn(&K, &V) -> Result<Vec<O>, E>,
    {
        self.wrap_flat_values_with(f, is_cooperative::<E>)
    }

    /// Flat-mapping variant with a custom forward filter.
    pub fn wrap_flat_values_with<K, V, O, E, F, G>(
        &self,
        f: F,
        forward: G,
    ) -> impl Fn(&Record<K, V>) -> Result<Vec<Outcome<O, DeadLetter>>, E>
    where
        K: AsPayload,
        V: AsPayload,
        E: Error + 'static,
        F: Fn(&K, &V) -> Result<Vec<O>, E>,
        G: Fn(&E) -> bool,
    {
        let description = self.description.clone();
        let config = self.config;
        move |record| {
            let outcome = capture_call(
                &description,
                config,
                record,
                || f(&record.key, &record.value),
                &forward,
            )?;
            Ok(match outcome {
                Outcome::Success(outputs) => {
                    outputs.into_iter().map(Outcome::Success).collect()
                }
                Outcome::Failure(letter) => vec![Outcome::Failure(letter)],
            })
        }
    }
}

/// The failure boundary shared by every wrapped shape.
fn capture_call<K, V, O, E>(
    description: &str,
    config: CaptureConfig,
    record: &Record<K, V>,
    call: impl FnOnce() -> Result<O, E>,
    forward: &impl Fn(&E) -> bool,
) -> Result<Outcome<O, DeadLetter>, E>
where
    K: AsPayload,
    V: AsPayload,
    E: Error + 'static,
{
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(output)) => Ok(Outcome::Success(output)),
        Ok(Err(error)) => {
            if forward(&error) {
                return Err(error);
            }
            Ok(Outcome::Failure(
                builder_for(description, config, record).from_error(&error),
            ))
        }
        Err(payload) => {
            if payload.downcast_ref::<Cancellation>().is_some() {
                resume_unwind(payload);
            }
            Ok(Outcome::Failure(
                builder_for(description, config, record).from_panic(payload.as_ref()),
            ))
        }
    }
}

fn builder_for<K: AsPayload, V: AsPayload>(
    description: &str,
    config: CaptureConfig,
    record: &Record<K, V>,
) -> DeadLetterBuilder {
    DeadLetter::builder(description)
        .max_cause_depth(config.max_cause_depth)
        .capture_backtrace(config.capture_backtrace)
        .input_key(record.key.to_payload())
        .input_value(record.value.to_payload())
        .coordinates(record.coordinates.clone())
}
