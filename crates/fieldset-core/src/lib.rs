//! Field-subset multiset comparison.
//!
//! Compares collections of records by a caller-chosen subset of their
//! fields, with decimal-aware equality and nested collection-valued fields
//! compared as multisets at every depth. Records are grouped into hash
//! buckets so set algebra stays near-linear, and hash collisions are
//! resolved by full field equality.

pub mod algebra;
pub mod bucket;
pub mod config;
pub mod diff;
pub mod equivalence;
pub mod errors;
pub mod ext;
pub mod field;
pub mod logging_facility;
pub mod multiset;
pub mod nested;

pub use fieldset_core_types;
#[doc(hidden)]
pub use tracing;

pub use config::{CompareOptions, SingletonPolicy};
pub use diff::tracing_reporter;
pub use errors::{ExError, ExErrorKind, FieldSetError, Result};
pub use ext::SliceMultisetExt;
pub use field::{CustomValue, Field, FieldSelector, FieldValue};
pub use multiset::{BucketedMultiset, ElementMatch};
pub use nested::NestedMultiset;
