//! Comparison options carried by a multiset.
//!
//! The left operand's options govern a binary operation.

/// How a bucket holding exactly one element on each side is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingletonPolicy {
    /// Confirm singleton matches with `equal`, like any other bucket.
    /// Two unequal records that happen to share a hash never match.
    #[default]
    Verify,
    /// Treat a singleton-vs-singleton bucket as a match on hash alone.
    /// Saves one comparison per bucket at the cost of trusting the hash:
    /// a 64-bit collision between unequal records reads as a match.
    TrustHash,
}

impl SingletonPolicy {
    pub fn trusts_hash(self) -> bool {
        matches!(self, SingletonPolicy::TrustHash)
    }
}

/// Options for queries and set-algebra operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompareOptions {
    pub singleton_policy: SingletonPolicy,
    /// Cap on diff reporter invocations per operation. `None` is unlimited.
    /// Results are unaffected by the cap.
    pub max_reported_pairs: Option<usize>,
}

impl CompareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_singleton_policy(mut self, policy: SingletonPolicy) -> Self {
        self.singleton_policy = policy;
        self
    }

    pub fn with_max_reported_pairs(mut self, max: usize) -> Self {
        self.max_reported_pairs = Some(max);
        self
    }
}
