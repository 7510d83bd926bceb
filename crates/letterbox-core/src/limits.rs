//! Encode-side size bounds for descriptors.
//!
//! Downstream transports cap record sizes, so both codecs clamp a
//! descriptor before writing it: the cause chain to a configured depth
//! (dropping outermost wrappers first) and the stack-trace text to a byte
//! budget. Clamping degrades, it never fails — each cut sets its own marker
//! in the encoded record as the explicit signal that it happened.

use std::borrow::Cow;

use crate::descriptor::DeadLetter;

/// Default stack-trace byte budget.
pub const DEFAULT_MAX_STACK_TRACE_BYTES: usize = 16 * 1024;

/// Size bounds applied before encoding.
#[derive(Debug, Clone, Copy)]
pub struct EncodeLimits {
    /// Maximum cause-chain entries kept in the encoded record.
    pub max_cause_depth: usize,
    /// Maximum stack-trace text size, in bytes (clamped to a char boundary).
    pub max_stack_trace_bytes: usize,
}

impl Default for EncodeLimits {
    fn default() -> Self {
        Self {
            max_cause_depth: crate::descriptor::DEFAULT_MAX_CAUSE_DEPTH,
            max_stack_trace_bytes: DEFAULT_MAX_STACK_TRACE_BYTES,
        }
    }
}

impl EncodeLimits {
    /// Override the cause-chain depth. Zero is treated as one; the
    /// originating cause is always encoded.
    #[must_use]
    pub fn max_cause_depth(mut self, depth: usize) -> Self {
        self.max_cause_depth = depth.max(1);
        self
    }

    /// Override the stack-trace byte budget.
    #[must_use]
    pub fn max_stack_trace_bytes(mut self, bytes: usize) -> Self {
        self.max_stack_trace_bytes = bytes;
        self
    }

    /// Clamp a descriptor to these bounds. Borrows when nothing exceeds
    /// them; otherwise returns a degraded copy with `causes_truncated` or
    /// `stack_trace_truncated` set for whichever part was cut.
    pub fn apply<'a>(&self, letter: &'a DeadLetter) -> Cow<'a, DeadLetter> {
        let cut_causes = letter.cause.len() > self.max_cause_depth;
        let cut_trace = letter
            .stack_trace
            .as_ref()
            .is_some_and(|t| t.len() > self.max_stack_trace_bytes);

        if !cut_causes && !cut_trace {
            return Cow::Borrowed(letter);
        }

        let mut clamped = letter.clone();
        if cut_causes {
            clamped.cause.truncate(self.max_cause_depth);
            clamped.causes_truncated = true;
        }
        if cut_trace {
            if let Some(trace) = clamped.stack_trace.as_mut() {
                let mut end = self.max_stack_trace_bytes;
                while end > 0 && !trace.is_char_boundary(end) {
                    end -= 1;
                }
                trace.truncate(end);
            }
            clamped.stack_trace_truncated = true;
        }

        tracing::debug!(
            description = %clamped.description,
            cut_causes,
            cut_trace,
            "degraded dead letter to fit encode limits"
        );
        Cow::Owned(clamped)
    }
}
