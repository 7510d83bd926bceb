//! Deterministic routing of outcome streams into success and failure
//! channels.
//!
//! Pure, stateless, one-pass: relative order within each channel matches the
//! relative order of same-variant elements in the input, and nothing is
//! buffered beyond the eager `Vec`s of [`split`] itself. For per-record
//! delivery use the lazy [`OutcomeIteratorExt`] projections.

use crate::outcome::Outcome;

/// Partition a stream of outcomes into its success and failure channels,
/// preserving relative order within each.
pub fn split<S, F>(outcomes: impl IntoIterator<Item = Outcome<S, F>>) -> (Vec<S>, Vec<F>) {
    let mut successes = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Outcome::Success(value) => successes.push(value),
            Outcome::Failure(failure) => failures.push(failure),
        }
    }
    (successes, failures)
}

/// Lazy success projection over an outcome iterator.
#[derive(Debug, Clone)]
pub struct Successes<I> {
    inner: I,
}

impl<I, S, F> Iterator for Successes<I>
where
    I: Iterator<Item = Outcome<S, F>>,
{
    type Item = S;

    fn next(&mut self) -> Option<S> {
        self.inner.by_ref().find_map(Outcome::into_success)
    }
}

/// Lazy failure projection over an outcome iterator.
#[derive(Debug, Clone)]
pub struct Failures<I> {
    inner: I,
}

impl<I, S, F> Iterator for Failures<I>
where
    I: Iterator<Item = Outcome<S, F>>,
{
    type Item = F;

    fn next(&mut self) -> Option<F> {
        self.inner.by_ref().find_map(Outcome::into_failure)
    }
}

/// Channel projections for any iterator of outcomes.
pub trait OutcomeIteratorExt<S, F>: Iterator<Item = Outcome<S, F>> + Sized {
    /// Unwrapped success values, in input order.
    fn successes(self) -> Successes<Self> {
        Successes { inner: self }
    }

    /// Failure payloads, in input order.
    fn failures(self) -> Failures<Self> {
        Failures { inner: self }
    }
}

impl<I, S, F> OutcomeIteratorExt<S, F> for I where I: Iterator<Item = Outcome<S, F>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sfssf() -> Vec<Outcome<u32, &'static str>> {
        vec![
            Outcome::Success(1),
            Outcome::Failure("two"),
            Outcome::Success(3),
            Outcome::Success(4),
            Outcome::Failure("five"),
        ]
    }

    #[test]
    fn split_preserves_relative_order() {
        let (successes, failures) = split(sfssf());
        assert_eq!(successes, vec![1, 3, 4]);
        assert_eq!(failures, vec!["two", "five"]);
    }

    #[test]
    fn lazy_projections_match_split() {
        let successes: Vec<_> = sfssf().into_iter().successes().collect();
        assert_eq!(successes, vec![1, 3, 4]);

        let failures: Vec<_> = sfssf().into_iter().failures().collect();
        assert_eq!(failures, vec!["two", "five"]);
    }

    #[test]
    fn empty_input_yields_empty_channels() {
        let (successes, failures) = split(Vec::<Outcome<u32, String>>::new());
        assert!(successes.is_empty());
        assert!(failures.is_empty());
    }

    proptest! {
        #[test]
        fn split_is_a_partition(input in proptest::collection::vec(any::<Result<u32, u32>>(), 0..64)) {
            let outcomes: Vec<Outcome<u32, u32>> = input
                .iter()
                .map(|r| match r {
                    Ok(v) => Outcome::Success(*v),
                    Err(f) => Outcome::Failure(*f),
                })
                .collect();

            let (successes, failures) = split(outcomes);

            // Same elements, same relative order, nothing merged or dropped.
            let expected_successes: Vec<u32> = input.iter().filter_map(|r| r.ok()).collect();
            let expected_failures: Vec<u32> = input.iter().filter_map(|r| r.err()).collect();
            prop_assert_eq!(successes, expected_successes);
            prop_assert_eq!(failures, expected_failures);
        }
    }
}
