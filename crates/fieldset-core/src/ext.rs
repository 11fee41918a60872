//! Set algebra directly on slices.
//!
//! Each method builds borrowed multisets over both slices with the given
//! selector and delegates to [`BucketedMultiset`].
//!
//! ```
//! use fieldset_core::{FieldSelector, SliceMultisetExt};
//!
//! let selector = FieldSelector::new().field("n", |n: &i64| *n);
//! let left = [1_i64, 2, 2, 3];
//! let right = [2_i64, 3, 4];
//!
//! assert_eq!(left.intersect_by(&right, &selector)?, vec![&2, &3]);
//! assert_eq!(left.difference_by(&right, &selector)?, vec![&1, &2]);
//! # Ok::<(), fieldset_core::FieldSetError>(())
//! ```

use crate::errors::Result;
use crate::field::FieldSelector;
use crate::multiset::{BucketedMultiset, ElementMatch};

pub trait SliceMultisetExt<T> {
    /// A multiset borrowing this slice's elements.
    ///
    /// # Errors
    ///
    /// Returns `EmptySelector` for an empty selector.
    fn to_multiset(&self, selector: &FieldSelector<T>) -> Result<BucketedMultiset<&T>>;

    /// # Errors
    ///
    /// Returns `EmptySelector` for an empty selector.
    fn intersect_by<'a>(&'a self, other: &'a [T], selector: &FieldSelector<T>) -> Result<Vec<&'a T>>;

    /// # Errors
    ///
    /// Returns `EmptySelector` for an empty selector.
    fn difference_by<'a>(&'a self, other: &'a [T], selector: &FieldSelector<T>) -> Result<Vec<&'a T>>;

    /// # Errors
    ///
    /// Returns `EmptySelector` for an empty selector.
    fn symmetric_difference_by<'a>(
        &'a self,
        other: &'a [T],
        selector: &FieldSelector<T>,
    ) -> Result<(Vec<&'a T>, Vec<&'a T>)>;

    /// # Errors
    ///
    /// Returns `EmptySelector` for an empty selector.
    fn match_elements_by<'a>(
        &'a self,
        other: &'a [T],
        selector: &FieldSelector<T>,
    ) -> Result<Vec<ElementMatch<'a, T>>>;

    /// Whether both slices hold the same elements, in any order.
    ///
    /// # Errors
    ///
    /// Returns `EmptySelector` for an empty selector.
    fn match_lists_by(&self, other: &[T], selector: &FieldSelector<T>) -> Result<bool>;
}

fn unwrap_refs<'a, T>(items: Vec<&&'a T>) -> Vec<&'a T> {
    items.into_iter().copied().collect()
}

impl<T: 'static> SliceMultisetExt<T> for [T] {
    fn to_multiset(&self, selector: &FieldSelector<T>) -> Result<BucketedMultiset<&T>> {
        BucketedMultiset::new(self.iter(), selector.by_ref())
    }

    fn intersect_by<'a>(&'a self, other: &'a [T], selector: &FieldSelector<T>) -> Result<Vec<&'a T>> {
        let (left, right) = (self.to_multiset(selector)?, other.to_multiset(selector)?);
        Ok(unwrap_refs(left.intersect(&right)?))
    }

    fn difference_by<'a>(&'a self, other: &'a [T], selector: &FieldSelector<T>) -> Result<Vec<&'a T>> {
        let (left, right) = (self.to_multiset(selector)?, other.to_multiset(selector)?);
        Ok(unwrap_refs(left.difference(&right)?))
    }

    fn symmetric_difference_by<'a>(
        &'a self,
        other: &'a [T],
        selector: &FieldSelector<T>,
    ) -> Result<(Vec<&'a T>, Vec<&'a T>)> {
        let (left, right) = (self.to_multiset(selector)?, other.to_multiset(selector)?);
        let (first, second) = left.symmetric_difference(&right)?;
        Ok((unwrap_refs(first), unwrap_refs(second)))
    }

    fn match_elements_by<'a>(
        &'a self,
        other: &'a [T],
        selector: &FieldSelector<T>,
    ) -> Result<Vec<ElementMatch<'a, T>>> {
        let (left, right) = (self.to_multiset(selector)?, other.to_multiset(selector)?);
        let matches = left
            .match_elements(&right)?
            .into_iter()
            .map(|m| ElementMatch {
                element: *m.element,
                matches: unwrap_refs(m.matches),
            })
            .collect();
        Ok(matches)
    }

    fn match_lists_by(&self, other: &[T], selector: &FieldSelector<T>) -> Result<bool> {
        let (left, right) = (self.to_multiset(selector)?, other.to_multiset(selector)?);
        left.elements_equals(&right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FieldSetError;

    #[derive(Debug, PartialEq)]
    struct Reading {
        sensor: &'static str,
        value: i64,
        taken_at: u64,
    }

    fn r(sensor: &'static str, value: i64, taken_at: u64) -> Reading {
        Reading { sensor, value, taken_at }
    }

    fn selector() -> FieldSelector<Reading> {
        FieldSelector::new()
            .field("sensor", |r: &Reading| r.sensor)
            .field("value", |r: &Reading| r.value)
    }

    #[test]
    fn test_ignores_unselected_fields() {
        let left = vec![r("t1", 20, 1), r("t2", 21, 2)];
        let right = vec![r("t2", 21, 99), r("t1", 20, 98)];
        assert!(left.match_lists_by(&right, &selector()).unwrap());
        assert_eq!(left.intersect_by(&right, &selector()).unwrap().len(), 2);
        assert!(left.difference_by(&right, &selector()).unwrap().is_empty());
    }

    #[test]
    fn test_results_borrow_from_the_slices() {
        let left = vec![r("t1", 20, 1), r("t3", 5, 2)];
        let right = vec![r("t1", 20, 7), r("t4", 6, 8)];

        let (first, second) = left.symmetric_difference_by(&right, &selector()).unwrap();
        assert!(std::ptr::eq(first[0], &left[1]));
        assert!(std::ptr::eq(second[0], &right[1]));

        let matches = left.match_elements_by(&right, &selector()).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(std::ptr::eq(matches[0].element, &left[0]));
        assert!(std::ptr::eq(matches[0].matches[0], &right[0]));
    }

    #[test]
    fn test_empty_selector_is_an_error() {
        let left = vec![r("t1", 20, 1)];
        let err = left.intersect_by(&left, &FieldSelector::new()).unwrap_err();
        assert!(matches!(err, FieldSetError::EmptySelector { .. }));
    }
}
