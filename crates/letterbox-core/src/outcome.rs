//! Tagged success/failure container produced by the capture decorator.
//!
//! [`Outcome`] is deliberately minimal: exactly one variant is ever
//! populated, there are no panicking accessors, and consuming the absent
//! variant is impossible by construction. Matching is total — [`Outcome::fold`]
//! requires a handler for both sides.

/// Result of processing a single record: the transformed value or a
/// description of why the transformation failed.
///
/// Generic over both payloads so it composes with any transformation shape
/// (value mappers, key-value mappers, predicates, flat-mapping producers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome<S, F> {
    /// The transformation returned normally with this value.
    Success(S),
    /// The transformation failed; the payload describes the failure.
    Failure(F),
}

impl<S, F> Outcome<S, F> {
    /// Wrap a successful transformation output.
    pub fn success(value: S) -> Self {
        Self::Success(value)
    }

    /// Wrap a failure payload.
    pub fn failure(failure: F) -> Self {
        Self::Failure(failure)
    }

    /// Returns `true` for the `Success` variant.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for the `Failure` variant.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Total match: exactly one of the two handlers runs.
    pub fn fold<R>(self, on_success: impl FnOnce(S) -> R, on_failure: impl FnOnce(F) -> R) -> R {
        match self {
            Self::Success(value) => on_success(value),
            Self::Failure(failure) => on_failure(failure),
        }
    }

    /// Borrowing projection, useful for inspecting without consuming.
    pub fn as_ref(&self) -> Outcome<&S, &F> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Map the success payload, leaving failures untouched.
    pub fn map_success<T>(self, f: impl FnOnce(S) -> T) -> Outcome<T, F> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Consume, yielding the success value if present.
    pub fn into_success(self) -> Option<S> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Consume, yielding the failure payload if present.
    pub fn into_failure(self) -> Option<F> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}
