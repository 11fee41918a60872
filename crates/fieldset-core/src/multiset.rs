//! The bucketed multiset container and its public operations.
//!
//! A [`BucketedMultiset`] holds records verbatim together with the
//! [`FieldSelector`] that defines their comparable view. Buckets are computed
//! on first use and shared for the multiset's lifetime.
//!
//! ```
//! use fieldset_core::{BucketedMultiset, FieldSelector};
//!
//! #[derive(Debug)]
//! struct Row { id: i64, name: &'static str, seen_at: u64 }
//!
//! let selector = FieldSelector::new()
//!     .field("id", |r: &Row| r.id)
//!     .field("name", |r: &Row| r.name);
//! let a = BucketedMultiset::new(
//!     vec![Row { id: 1, name: "A", seen_at: 10 }, Row { id: 2, name: "B", seen_at: 11 }],
//!     selector.clone(),
//! )?;
//! let b = BucketedMultiset::new(vec![Row { id: 2, name: "B", seen_at: 99 }], selector)?;
//!
//! let common = a.intersect(&b)?;
//! assert_eq!(common.len(), 1);
//! assert_eq!(common[0].id, 2);
//! # Ok::<(), fieldset_core::FieldSetError>(())
//! ```

use crate::algebra::{self, NoReport};
use crate::bucket::BucketIndex;
use crate::config::CompareOptions;
use crate::diff::DiffReporter;
use crate::errors::{FieldSetError, Result};
use crate::field::FieldSelector;
use crate::nested::{NestedMultiset, Shape};
use crate::{log_op_end, log_op_error, log_op_start};
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// One left element with every equal element of the other multiset.
#[derive(Debug, PartialEq)]
pub struct ElementMatch<'a, T> {
    pub element: &'a T,
    pub matches: Vec<&'a T>,
}

/// An immutable multiset of records compared by a field subset.
pub struct BucketedMultiset<T> {
    elements: Vec<T>,
    selector: FieldSelector<T>,
    options: CompareOptions,
    index: OnceLock<Arc<BucketIndex>>,
}

impl<T> BucketedMultiset<T> {
    /// Build a multiset. Fails if the selector, or any nested sub-selector,
    /// has no fields.
    ///
    /// # Errors
    ///
    /// Returns [`FieldSetError::EmptySelector`] for an empty selector.
    pub fn new(elements: impl IntoIterator<Item = T>, selector: FieldSelector<T>) -> Result<Self> {
        let start = Instant::now();
        if let Err(err) = selector.validate("multiset construction") {
            log_op_error!("construct", err.clone(), since = start);
            return Err(err);
        }
        Ok(Self {
            elements: elements.into_iter().collect(),
            selector,
            options: CompareOptions::default(),
            index: OnceLock::new(),
        })
    }

    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> CompareOptions {
        self.options
    }

    pub fn elements(&self) -> &[T] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn selector(&self) -> &FieldSelector<T> {
        &self.selector
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.selector.names()
    }

    pub fn bucket_count(&self) -> usize {
        self.index().bucket_count()
    }

    /// Buckets in first-seen order, each with its members in insertion order.
    pub fn buckets(&self) -> Vec<(u64, Vec<&T>)> {
        self.index()
            .buckets()
            .iter()
            .map(|b| (b.hash, b.members.iter().map(|&i| &self.elements[i]).collect()))
            .collect()
    }

    /// Structural hash of `record` under this multiset's selector.
    pub fn hash_of(&self, record: &T) -> u64 {
        self.selector.hash(record)
    }

    /// Whether an element equal to `record` is present.
    pub fn contains(&self, record: &T) -> bool {
        let key = self.selector.extract(record);
        algebra::contains(self.index(), &key, self.options.singleton_policy)
    }

    /// Number of elements equal to `record`.
    pub fn count(&self, record: &T) -> usize {
        let key = self.selector.extract(record);
        algebra::count(self.index(), &key, self.options.singleton_policy)
    }

    /// Order-independent hash over all elements.
    pub fn content_hash(&self) -> u64 {
        algebra::content_hash(self.index())
    }

    /// Elements of `self` that consume a distinct equal element of `other`,
    /// in bucket order and, within a bucket, insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`FieldSetError::SelectorMismatch`] if the selectors differ.
    pub fn intersect<'a>(&'a self, other: &BucketedMultiset<T>) -> Result<Vec<&'a T>> {
        self.run("intersect", other, Vec::len, |left, right| {
            self.resolve(algebra::intersect(left, right, self.options.singleton_policy))
        })
    }

    /// Elements of `self` left over after consuming every match in `other`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldSetError::SelectorMismatch`] if the selectors differ.
    pub fn difference<'a>(&'a self, other: &BucketedMultiset<T>) -> Result<Vec<&'a T>> {
        self.run("difference", other, Vec::len, |left, right| {
            let positions =
                algebra::difference(left, right, self.options.singleton_policy, &mut NoReport);
            self.resolve(positions)
        })
    }

    /// `(only in self, only in other)`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldSetError::SelectorMismatch`] if the selectors differ.
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a BucketedMultiset<T>,
    ) -> Result<(Vec<&'a T>, Vec<&'a T>)> {
        let result_len = |r: &(Vec<&'a T>, Vec<&'a T>)| r.0.len() + r.1.len();
        self.run("symmetric_difference", other, result_len, |left, right| {
            let (first, second) =
                algebra::symmetric_difference(left, right, self.options.singleton_policy);
            (self.resolve(first), other.resolve(second))
        })
    }

    /// Every element of `self` with all equal elements of `other`. Elements
    /// without a match are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`FieldSetError::SelectorMismatch`] if the selectors differ.
    pub fn match_elements<'a>(
        &'a self,
        other: &'a BucketedMultiset<T>,
    ) -> Result<Vec<ElementMatch<'a, T>>> {
        self.run("match_elements", other, Vec::len, |left, right| {
            algebra::match_elements(left, right, self.options.singleton_policy)
                .into_iter()
                .map(|(i, matches)| ElementMatch {
                    element: &self.elements[i],
                    matches: other.resolve(matches),
                })
                .collect()
        })
    }

    /// Whether both multisets hold the same elements with the same
    /// multiplicities, in any order.
    ///
    /// # Errors
    ///
    /// Returns [`FieldSetError::SelectorMismatch`] if the selectors differ.
    pub fn elements_equals(&self, other: &BucketedMultiset<T>) -> Result<bool> {
        self.run("elements_equals", other, |&eq| usize::from(eq), |left, right| {
            algebra::elements_equals(left, right, self.options.singleton_policy, &mut NoReport)
        })
    }

    /// Type-erased view for use as a multiset-typed field value.
    pub fn to_nested(&self) -> NestedMultiset {
        NestedMultiset::from_index(Shape::of(&self.selector), Arc::clone(self.shared_index()))
    }

    fn index(&self) -> &BucketIndex {
        self.shared_index()
    }

    fn shared_index(&self) -> &Arc<BucketIndex> {
        self.index.get_or_init(|| {
            let keys = self.elements.iter().map(|e| self.selector.extract(e)).collect();
            let index = BucketIndex::build(keys);
            tracing::debug!(
                elements = index.len() as u64,
                bucket_count = index.bucket_count() as u64,
                "bucket index built"
            );
            Arc::new(index)
        })
    }

    fn resolve(&self, positions: Vec<usize>) -> Vec<&T> {
        positions.into_iter().map(|i| &self.elements[i]).collect()
    }

    fn check_compatible(&self, op: &str, other: &BucketedMultiset<T>) -> Result<()> {
        let left = self.selector.signature();
        let right = other.selector.signature();
        if left == right {
            return Ok(());
        }
        Err(FieldSetError::SelectorMismatch {
            op: op.to_string(),
            left,
            right,
        })
    }

    /// Lifecycle wrapper for binary operations: start event, selector check,
    /// body, end event.
    fn run<R>(
        &self,
        op: &'static str,
        other: &BucketedMultiset<T>,
        result_len: impl Fn(&R) -> usize,
        body: impl FnOnce(&BucketIndex, &BucketIndex) -> R,
    ) -> Result<R> {
        log_op_start!(
            op,
            left_len = self.len() as u64,
            right_len = other.len() as u64
        );
        let start = Instant::now();

        if let Err(err) = self.check_compatible(op, other) {
            log_op_error!(op, err.clone(), since = start);
            return Err(err);
        }

        let result = body(self.index(), other.index());
        log_op_end!(op, since = start, result_len = result_len(&result) as u64);
        Ok(result)
    }
}

impl<T: fmt::Debug> BucketedMultiset<T> {
    /// [`difference`](Self::difference), reporting every failed comparison.
    ///
    /// For each unmatched element, `reporter` receives one message per
    /// candidate it was compared against: the remaining members of its
    /// bucket, or every element of `other` when the bucket is absent there.
    ///
    /// **Cost:** with a reporter this is `O(n*m)` in the worst case instead
    /// of near-linear. Cap it with
    /// [`CompareOptions::max_reported_pairs`] on large inputs.
    ///
    /// # Errors
    ///
    /// Returns [`FieldSetError::SelectorMismatch`] if the selectors differ.
    pub fn difference_with_reporter<'a>(
        &'a self,
        other: &BucketedMultiset<T>,
        reporter: &mut dyn FnMut(String),
    ) -> Result<Vec<&'a T>> {
        self.run("difference", other, Vec::len, |left, right| {
            let mut sink = self.reporter_for(other, (left, right), reporter);
            let positions =
                algebra::difference(left, right, self.options.singleton_policy, &mut sink);
            tracing::debug!(reported = sink.sent() as u64, "difference reported");
            self.resolve(positions)
        })
    }

    /// [`elements_equals`](Self::elements_equals), reporting why the
    /// multisets differ: a size mismatch, or the comparisons made for the
    /// first element that found no match.
    ///
    /// **Cost:** with a reporter this is `O(n*m)` in the worst case instead
    /// of near-linear. Cap it with
    /// [`CompareOptions::max_reported_pairs`] on large inputs.
    ///
    /// # Errors
    ///
    /// Returns [`FieldSetError::SelectorMismatch`] if the selectors differ.
    pub fn elements_equals_with_reporter(
        &self,
        other: &BucketedMultiset<T>,
        reporter: &mut dyn FnMut(String),
    ) -> Result<bool> {
        self.run("elements_equals", other, |&eq| usize::from(eq), |left, right| {
            let mut sink = self.reporter_for(other, (left, right), reporter);
            let equal =
                algebra::elements_equals(left, right, self.options.singleton_policy, &mut sink);
            tracing::debug!(reported = sink.sent() as u64, "elements_equals reported");
            equal
        })
    }

    fn reporter_for<'r, 'e>(
        &'e self,
        other: &'e BucketedMultiset<T>,
        (left, right): (&'e BucketIndex, &'e BucketIndex),
        reporter: &'r mut dyn FnMut(String),
    ) -> DiffReporter<'r, 'e, T> {
        DiffReporter::new(
            self.selector.names(),
            (self.elements.as_slice(), left),
            (other.elements.as_slice(), right),
            self.options,
            reporter,
        )
    }
}

impl<T: fmt::Debug> fmt::Debug for BucketedMultiset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BucketedMultiset(elements={:?})", self.elements)
    }
}
