//! Collection-valued fields compared as multisets of sub-records.
//!
//! A [`NestedMultiset`] is the type-erased, extracted form of a sub-record
//! collection: the sub-records' keys grouped into buckets, plus the names of
//! the sub-fields they were extracted with. Equality is full multiset
//! equivalence and the hash is the order-independent content hash, so the
//! recursion holds at every depth.

use crate::algebra::{self, NoReport};
use crate::bucket::BucketIndex;
use crate::config::SingletonPolicy;
use crate::field::{FieldSelector, FieldValue};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Field names and signature of a sub-selector, computed once per declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Shape {
    pub(crate) names: Arc<[String]>,
    pub(crate) signature: Arc<[String]>,
}

impl Shape {
    pub(crate) fn of<U>(selector: &FieldSelector<U>) -> Self {
        let names: Vec<String> = selector.names().into_iter().map(str::to_string).collect();
        Self {
            names: names.into(),
            signature: selector.signature().into(),
        }
    }
}

struct Inner {
    shape: Shape,
    index: Arc<BucketIndex>,
    content_hash: OnceLock<u64>,
}

/// An immutable multiset of extracted sub-records. Cheap to clone.
#[derive(Clone)]
pub struct NestedMultiset {
    inner: Arc<Inner>,
}

impl NestedMultiset {
    pub(crate) fn from_records<U>(records: &[U], selector: &FieldSelector<U>, shape: Shape) -> Self {
        let keys = records.iter().map(|r| selector.extract(r)).collect();
        Self::from_index(shape, Arc::new(BucketIndex::build(keys)))
    }

    pub(crate) fn from_index(shape: Shape, index: Arc<BucketIndex>) -> Self {
        Self {
            inner: Arc::new(Inner {
                shape,
                index,
                content_hash: OnceLock::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.index.is_empty()
    }

    /// Sub-field names in declared order.
    pub fn field_names(&self) -> &[String] {
        &self.inner.shape.names
    }

    /// Extracted sub-records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &[FieldValue]> + '_ {
        self.inner.index.keys().iter().map(|key| key.values())
    }

    /// Order-independent hash over the sub-records, memoized.
    pub fn content_hash(&self) -> u64 {
        *self
            .inner
            .content_hash
            .get_or_init(|| algebra::content_hash(&self.inner.index))
    }

    /// Full multiset equivalence. Sub-records extracted with different
    /// sub-fields are never equivalent.
    ///
    /// Singleton buckets are always verified here, whatever the policy of
    /// the enclosing multiset.
    pub fn elements_equals(&self, other: &NestedMultiset) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        self.inner.shape.signature == other.inner.shape.signature
            && algebra::elements_equals(
                &self.inner.index,
                &other.inner.index,
                SingletonPolicy::Verify,
                &mut NoReport,
            )
    }

    pub(crate) fn index(&self) -> &BucketIndex {
        &self.inner.index
    }
}

impl PartialEq for NestedMultiset {
    fn eq(&self, other: &Self) -> bool {
        self.elements_equals(other)
    }
}

impl fmt::Display for NestedMultiset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, record) in self.records().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{{")?;
            for (j, (name, value)) in self.field_names().iter().zip(record).enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{name}: {value}")?;
            }
            write!(f, "}}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for NestedMultiset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NestedMultiset({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dept {
        id: &'static str,
        name: &'static str,
    }

    fn depts(rows: &[(&'static str, &'static str)]) -> NestedMultiset {
        let selector = FieldSelector::new()
            .field("id", |d: &Dept| d.id)
            .field("name", |d: &Dept| d.name);
        let records: Vec<Dept> = rows.iter().map(|&(id, name)| Dept { id, name }).collect();
        NestedMultiset::from_records(&records, &selector, Shape::of(&selector))
    }

    #[test]
    fn test_equal_regardless_of_order() {
        let a = depts(&[("D1", "Engineering"), ("D2", "HR")]);
        let b = depts(&[("D2", "HR"), ("D1", "Engineering")]);
        assert!(a.elements_equals(&b));
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_content_or_size_difference_is_unequal() {
        let a = depts(&[("D1", "Engineering"), ("D2", "HR")]);
        assert_ne!(a, depts(&[("D1", "Engineering"), ("D2", "Research")]));
        assert_ne!(a, depts(&[("D1", "Engineering")]));
    }

    #[test]
    fn test_different_sub_fields_are_unequal() {
        let only_id = FieldSelector::new().field("id", |d: &Dept| d.id);
        let only_name = FieldSelector::new().field("name", |d: &Dept| d.id);
        let records = vec![Dept { id: "D1", name: "x" }];
        let a = NestedMultiset::from_records(&records, &only_id, Shape::of(&only_id));
        let b = NestedMultiset::from_records(&records, &only_name, Shape::of(&only_name));
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_lists_sub_records() {
        let a = depts(&[("D1", "Engineering"), ("D2", "HR")]);
        assert_eq!(a.to_string(), "[{id: D1, name: Engineering}, {id: D2, name: HR}]");
        assert_eq!(format!("{a:?}"), format!("NestedMultiset({a})"));
        assert_eq!(depts(&[]).to_string(), "[]");
    }
}
