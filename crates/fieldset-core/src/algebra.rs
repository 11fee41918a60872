//! Bucket-aware set algebra over two [`BucketIndex`]es.
//!
//! Every operation only compares records that share a bucket key, so cost
//! stays near-linear unless a diff reporter asks for the cross product.
//! Results are record positions; callers map them back to their elements.
//!
//! Matching uses a consume-on-match sweep: each left record takes the first
//! unconsumed equal record of the right bucket, so duplicates pair up one to
//! one (multiset semantics, not set semantics).

use crate::bucket::{Bucket, BucketIndex};
use crate::config::SingletonPolicy;
use crate::equivalence::{self, RecordKey};

/// Receives the pairs a diff reporter should describe.
pub trait MismatchSink {
    /// `left` found no match and was compared against `right`.
    fn pair(&mut self, left: usize, right: usize);

    /// The two multisets differ in size.
    fn sizes(&mut self, left_len: usize, right_len: usize);

    /// Whether candidate pairs should be enumerated at all.
    fn enabled(&self) -> bool {
        true
    }
}

/// Sink that ignores everything.
pub struct NoReport;

impl MismatchSink for NoReport {
    fn pair(&mut self, _left: usize, _right: usize) {}

    fn sizes(&mut self, _left_len: usize, _right_len: usize) {}

    fn enabled(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
struct Sweep {
    matched: Vec<usize>,
    left_unmatched: Vec<usize>,
    right_unmatched: Vec<usize>,
}

fn trusted_singletons(policy: SingletonPolicy, lb: &Bucket, rb: &Bucket) -> bool {
    policy.trusts_hash() && lb.len() == 1 && rb.len() == 1
}

fn equal_at(left: &BucketIndex, i: usize, right: &BucketIndex, j: usize) -> bool {
    equivalence::keys_equal(left.key(i), right.key(j))
}

/// Consume the first unconsumed member of `rb` equal to `left[pos]`.
fn take_match(
    left: &BucketIndex,
    pos: usize,
    right: &BucketIndex,
    rb: &Bucket,
    consumed: &mut [bool],
) -> Option<usize> {
    let slot = rb
        .members
        .iter()
        .enumerate()
        .position(|(slot, &j)| !consumed[slot] && equal_at(left, pos, right, j))?;
    consumed[slot] = true;
    Some(rb.members[slot])
}

fn report_remaining<S: MismatchSink>(sink: &mut S, pos: usize, rb: &Bucket, consumed: &[bool]) {
    if !sink.enabled() {
        return;
    }
    for (&j, _) in rb.members.iter().zip(consumed).filter(|(_, c)| !**c) {
        sink.pair(pos, j);
    }
}

fn report_against_all<S: MismatchSink>(sink: &mut S, members: &[usize], right: &BucketIndex) {
    if !sink.enabled() {
        return;
    }
    for &i in members {
        for j in 0..right.len() {
            sink.pair(i, j);
        }
    }
}

fn sweep<S: MismatchSink>(
    left: &BucketIndex,
    lb: &Bucket,
    right: &BucketIndex,
    rb: &Bucket,
    policy: SingletonPolicy,
    sink: &mut S,
) -> Sweep {
    if trusted_singletons(policy, lb, rb) {
        return Sweep {
            matched: lb.members.clone(),
            ..Sweep::default()
        };
    }

    let mut out = Sweep::default();
    let mut consumed = vec![false; rb.len()];
    for &pos in &lb.members {
        match take_match(left, pos, right, rb, &mut consumed) {
            Some(_) => out.matched.push(pos),
            None => {
                report_remaining(sink, pos, rb, &consumed);
                out.left_unmatched.push(pos);
            }
        }
    }
    out.right_unmatched = rb
        .members
        .iter()
        .zip(&consumed)
        .filter(|(_, c)| !**c)
        .map(|(&j, _)| j)
        .collect();
    out
}

/// Left positions that consume a distinct equal right record.
pub fn intersect(left: &BucketIndex, right: &BucketIndex, policy: SingletonPolicy) -> Vec<usize> {
    let mut out = Vec::new();
    for lb in left.buckets() {
        if let Some(rb) = right.bucket(lb.hash) {
            out.extend(sweep(left, lb, right, rb, policy, &mut NoReport).matched);
        }
    }
    out
}

/// Left positions that find no unconsumed equal right record.
///
/// With an enabled sink, every unmatched left record is reported against
/// every remaining candidate of its bucket, or against all of `right` when
/// the bucket is absent there.
pub fn difference<S: MismatchSink>(
    left: &BucketIndex,
    right: &BucketIndex,
    policy: SingletonPolicy,
    sink: &mut S,
) -> Vec<usize> {
    let mut out = Vec::new();
    for lb in left.buckets() {
        match right.bucket(lb.hash) {
            None => {
                report_against_all(sink, &lb.members, right);
                out.extend_from_slice(&lb.members);
            }
            Some(rb) => out.extend(sweep(left, lb, right, rb, policy, sink).left_unmatched),
        }
    }
    out
}

/// `(left only, right only)` positions.
pub fn symmetric_difference(
    left: &BucketIndex,
    right: &BucketIndex,
    policy: SingletonPolicy,
) -> (Vec<usize>, Vec<usize>) {
    let mut first = Vec::new();
    let mut second = Vec::new();
    for lb in left.buckets() {
        match right.bucket(lb.hash) {
            None => first.extend_from_slice(&lb.members),
            Some(rb) => {
                let swept = sweep(left, lb, right, rb, policy, &mut NoReport);
                first.extend(swept.left_unmatched);
                second.extend(swept.right_unmatched);
            }
        }
    }
    for rb in right.buckets() {
        if left.bucket(rb.hash).is_none() {
            second.extend_from_slice(&rb.members);
        }
    }
    (first, second)
}

/// For each left position, every equal right position in its bucket.
/// Left positions without a match are omitted.
pub fn match_elements(
    left: &BucketIndex,
    right: &BucketIndex,
    policy: SingletonPolicy,
) -> Vec<(usize, Vec<usize>)> {
    let mut out = Vec::new();
    for lb in left.buckets() {
        let Some(rb) = right.bucket(lb.hash) else {
            continue;
        };
        if trusted_singletons(policy, lb, rb) {
            out.push((lb.members[0], rb.members.clone()));
            continue;
        }
        for &i in &lb.members {
            let matches: Vec<usize> = rb
                .members
                .iter()
                .copied()
                .filter(|&j| equal_at(left, i, right, j))
                .collect();
            if !matches.is_empty() {
                out.push((i, matches));
            }
        }
    }
    out
}

/// Full multiset equivalence: a one-to-one pairing of equal records exists.
pub fn elements_equals<S: MismatchSink>(
    left: &BucketIndex,
    right: &BucketIndex,
    policy: SingletonPolicy,
    sink: &mut S,
) -> bool {
    if left.len() != right.len() {
        sink.sizes(left.len(), right.len());
        return false;
    }
    if left.bucket_count() != right.bucket_count() {
        for lb in left.buckets() {
            report_against_all(sink, &lb.members, right);
        }
        return false;
    }

    for lb in left.buckets() {
        let rb = match right.bucket(lb.hash) {
            Some(rb) if rb.len() == lb.len() => rb,
            _ => {
                report_against_all(sink, &lb.members, right);
                return false;
            }
        };
        if trusted_singletons(policy, lb, rb) {
            continue;
        }
        let mut consumed = vec![false; rb.len()];
        for &pos in &lb.members {
            if take_match(left, pos, right, rb, &mut consumed).is_none() {
                report_remaining(sink, pos, rb, &consumed);
                return false;
            }
        }
    }
    true
}

/// Order-independent hash: sorted element hashes folded from seed 1.
pub fn content_hash(index: &BucketIndex) -> u64 {
    let mut hashes: Vec<u64> = index.keys().iter().map(RecordKey::hash).collect();
    hashes.sort_unstable();
    equivalence::fold_hashes(1, hashes)
}

/// Number of records in `index` equal to `key`.
pub fn count(index: &BucketIndex, key: &RecordKey, policy: SingletonPolicy) -> usize {
    match index.bucket(key.hash()) {
        None => 0,
        Some(bucket) if policy.trusts_hash() && bucket.len() == 1 => 1,
        Some(bucket) => bucket
            .members
            .iter()
            .filter(|&&j| equivalence::keys_equal(key, index.key(j)))
            .count(),
    }
}

/// Whether `index` holds a record equal to `key`.
pub fn contains(index: &BucketIndex, key: &RecordKey, policy: SingletonPolicy) -> bool {
    match index.bucket(key.hash()) {
        None => false,
        Some(bucket) if policy.trusts_hash() && bucket.len() == 1 => true,
        Some(bucket) => bucket
            .members
            .iter()
            .any(|&j| equivalence::keys_equal(key, index.key(j))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldValue;
    use std::hash::{Hash, Hasher};

    /// Every instance hashes identically; equality still uses the id.
    #[derive(Debug, PartialEq, Eq)]
    struct Colliding(u32);

    impl Hash for Colliding {
        fn hash<H: Hasher>(&self, state: &mut H) {
            1_u8.hash(state);
        }
    }

    fn plain(ids: &[i64]) -> BucketIndex {
        BucketIndex::build(
            ids.iter()
                .map(|&id| RecordKey::new(vec![FieldValue::from(id)]))
                .collect(),
        )
    }

    fn colliding(ids: &[u32]) -> BucketIndex {
        BucketIndex::build(
            ids.iter()
                .map(|&id| RecordKey::new(vec![FieldValue::custom(Colliding(id))]))
                .collect(),
        )
    }

    #[derive(Default)]
    struct Recording {
        pairs: Vec<(usize, usize)>,
        sizes: Vec<(usize, usize)>,
    }

    impl MismatchSink for Recording {
        fn pair(&mut self, left: usize, right: usize) {
            self.pairs.push((left, right));
        }

        fn sizes(&mut self, left_len: usize, right_len: usize) {
            self.sizes.push((left_len, right_len));
        }
    }

    const VERIFY: SingletonPolicy = SingletonPolicy::Verify;

    #[test]
    fn test_intersect_consumes_duplicates_one_to_one() {
        let left = plain(&[1, 1, 1, 2]);
        let right = plain(&[1, 1, 3]);
        assert_eq!(intersect(&left, &right, VERIFY), vec![0, 1]);
        assert_eq!(intersect(&right, &left, VERIFY), vec![0, 1]);
    }

    #[test]
    fn test_difference_keeps_unconsumed_duplicates() {
        let left = plain(&[1, 1, 1, 2]);
        let right = plain(&[1, 1, 3]);
        assert_eq!(difference(&left, &right, VERIFY, &mut NoReport), vec![2, 3]);
    }

    #[test]
    fn test_collisions_are_resolved_by_equality() {
        let left = colliding(&[1, 2, 3]);
        let right = colliding(&[1, 2]);
        assert_eq!(left.bucket_count(), 1);

        assert_eq!(intersect(&left, &right, VERIFY), vec![0, 1]);
        assert_eq!(difference(&left, &right, VERIFY, &mut NoReport), vec![2]);
        assert_eq!(
            count(&left, &RecordKey::new(vec![FieldValue::custom(Colliding(2))]), VERIFY),
            1
        );
    }

    #[test]
    fn test_singleton_policy_only_matters_on_collisions() {
        let left = colliding(&[1]);
        let right = colliding(&[2]);

        assert!(intersect(&left, &right, VERIFY).is_empty());
        assert!(!elements_equals(&left, &right, VERIFY, &mut NoReport));

        let trust = SingletonPolicy::TrustHash;
        assert_eq!(intersect(&left, &right, trust), vec![0]);
        assert!(elements_equals(&left, &right, trust, &mut NoReport));
        assert_eq!(match_elements(&left, &right, trust), vec![(0, vec![0])]);
    }

    #[test]
    fn test_symmetric_difference_splits_both_sides() {
        let left = plain(&[1, 2, 2, 4]);
        let right = plain(&[2, 3, 1, 1]);
        let (first, second) = symmetric_difference(&left, &right, VERIFY);
        assert_eq!(first, vec![2, 3]);
        assert_eq!(second, vec![3, 1]);
    }

    #[test]
    fn test_match_elements_lists_all_equal_candidates() {
        let left = plain(&[1, 5]);
        let right = plain(&[1, 2, 1]);
        assert_eq!(match_elements(&left, &right, VERIFY), vec![(0, vec![0, 2])]);
    }

    #[test]
    fn test_elements_equals_ignores_order() {
        let left = plain(&[3, 1, 2, 1]);
        let right = plain(&[1, 2, 1, 3]);
        assert!(elements_equals(&left, &right, VERIFY, &mut NoReport));
        assert!(!elements_equals(&left, &plain(&[1, 2, 3, 3]), VERIFY, &mut NoReport));
    }

    #[test]
    fn test_elements_equals_reports_sizes() {
        let mut sink = Recording::default();
        assert!(!elements_equals(&plain(&[1, 2]), &plain(&[1]), VERIFY, &mut sink));
        assert_eq!(sink.sizes, vec![(2, 1)]);
        assert!(sink.pairs.is_empty());
    }

    #[test]
    fn test_difference_reports_against_all_when_bucket_absent() {
        let mut sink = Recording::default();
        let out = difference(&plain(&[7]), &plain(&[1, 2]), VERIFY, &mut sink);
        assert_eq!(out, vec![0]);
        assert_eq!(sink.pairs, vec![(0, 0), (0, 1)]);
    }

    #[test]
    fn test_difference_reports_remaining_bucket_candidates() {
        let mut sink = Recording::default();
        let out = difference(&colliding(&[1, 9]), &colliding(&[1, 2, 3]), VERIFY, &mut sink);
        assert_eq!(out, vec![1]);
        assert_eq!(sink.pairs, vec![(1, 1), (1, 2)]);
    }

    #[test]
    fn test_content_hash_is_order_independent() {
        assert_eq!(content_hash(&plain(&[1, 2, 3])), content_hash(&plain(&[3, 1, 2])));
        assert_ne!(content_hash(&plain(&[1, 2])), content_hash(&plain(&[1, 2, 2])));
        assert_eq!(content_hash(&plain(&[])), 1);
    }

    #[test]
    fn test_contains_and_count() {
        let index = plain(&[1, 1, 2]);
        let one = RecordKey::new(vec![FieldValue::from(1)]);
        let nine = RecordKey::new(vec![FieldValue::from(9)]);
        assert!(contains(&index, &one, VERIFY));
        assert!(!contains(&index, &nine, VERIFY));
        assert_eq!(count(&index, &one, VERIFY), 2);
        assert_eq!(count(&index, &nine, VERIFY), 0);
    }
}
