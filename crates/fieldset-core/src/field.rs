//! Field extraction: the comparable view of a caller-defined record.
//!
//! A [`FieldSelector`] is an ordered list of named accessors. Each accessor
//! turns a record into a [`FieldValue`], the tagged value the equivalence
//! engine knows how to compare and hash. Records are never inspected beyond
//! what the selector names.
//!
//! ```
//! use fieldset_core::field::FieldSelector;
//!
//! struct Order { id: i64, sku: String, updated_at: u64 }
//!
//! // `updated_at` is incidental and left out of the comparison.
//! let selector = FieldSelector::new()
//!     .field("id", |o: &Order| o.id)
//!     .field("sku", |o: &Order| o.sku.clone());
//! assert_eq!(selector.names(), vec!["id", "sku"]);
//! ```

use crate::equivalence::{self, RecordKey};
use crate::errors::{FieldSetError, Result};
use crate::multiset::BucketedMultiset;
use crate::nested::{NestedMultiset, Shape};
use rust_decimal::Decimal;
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A comparison-relevant value extracted from a record.
#[derive(Clone, Debug)]
pub enum FieldValue {
    /// Absent value. Equal only to another `Null`.
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    /// Exact decimal, compared numerically (`1.50 == 1.5`). Holds at most
    /// 28 significant digits.
    Decimal(Decimal),
    /// A collection of sub-records compared as a multiset.
    Multiset(NestedMultiset),
    /// Any other caller type, compared and hashed natively.
    Custom(CustomValue),
}

impl FieldValue {
    /// Wrap a caller value that uses its own `Eq` and `Hash`.
    pub fn custom<V>(value: V) -> Self
    where
        V: Eq + Hash + fmt::Debug + Send + Sync + 'static,
    {
        FieldValue::Custom(CustomValue::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_multiset(&self) -> Option<&NestedMultiset> {
        match self {
            FieldValue::Multiset(m) => Some(m),
            _ => None,
        }
    }
}

/// Field equality as defined by the equivalence engine.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        equivalence::field_equal(self, other)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Decimal(d) => write!(f, "{d}"),
            FieldValue::Multiset(m) => write!(f, "{m}"),
            FieldValue::Custom(c) => write!(f, "{c:?}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

macro_rules! int_field_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Int(i64::from(value))
                }
            }
        )*
    };
}

int_field_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<NestedMultiset> for FieldValue {
    fn from(value: NestedMultiset) -> Self {
        FieldValue::Multiset(value)
    }
}

impl From<CustomValue> for FieldValue {
    fn from(value: CustomValue) -> Self {
        FieldValue::Custom(value)
    }
}

/// A multiset-typed field: the multiset is compared by full equivalence.
impl<U> From<&BucketedMultiset<U>> for FieldValue {
    fn from(value: &BucketedMultiset<U>) -> Self {
        FieldValue::Multiset(value.to_nested())
    }
}

impl<V: Into<FieldValue>> From<Option<V>> for FieldValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

trait DynValue: Any + Send + Sync + fmt::Debug {
    fn dyn_eq(&self, other: &dyn DynValue) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn as_any(&self) -> &dyn Any;
}

impl<V> DynValue for V
where
    V: Eq + Hash + fmt::Debug + Send + Sync + 'static,
{
    fn dyn_eq(&self, other: &dyn DynValue) -> bool {
        other
            .as_any()
            .downcast_ref::<V>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Type-erased caller value with native equality and hash.
///
/// Values of different concrete types are never equal.
#[derive(Clone)]
pub struct CustomValue(Arc<dyn DynValue>);

impl CustomValue {
    pub fn new<V>(value: V) -> Self
    where
        V: Eq + Hash + fmt::Debug + Send + Sync + 'static,
    {
        CustomValue(Arc::new(value))
    }

    pub fn downcast_ref<V: 'static>(&self) -> Option<&V> {
        self.0.as_any().downcast_ref::<V>()
    }

    pub(crate) fn value_eq(&self, other: &CustomValue) -> bool {
        self.0.dyn_eq(other.0.as_ref())
    }

    pub(crate) fn value_hash(&self, state: &mut dyn Hasher) {
        self.0.dyn_hash(state);
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

type Accessor<T> = Arc<dyn Fn(&T) -> FieldValue + Send + Sync>;

/// A named accessor producing one comparable value per record.
pub struct Field<T> {
    name: String,
    nested: Option<Shape>,
    nested_error: Option<FieldSetError>,
    accessor: Accessor<T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            nested: self.nested.clone(),
            nested_error: self.nested_error.clone(),
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("nested", &self.nested)
            .finish()
    }
}

impl<T> Field<T> {
    /// A leaf field compared by value.
    pub fn new<F, V>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        Self {
            name: name.into(),
            nested: None,
            nested_error: None,
            accessor: Arc::new(move |record: &T| accessor(record).into()),
        }
    }

    /// A nested field declaration.
    ///
    /// The collection returned by `accessor` is compared as a multiset of
    /// sub-records under `sub_selector`, regardless of order. `None` is
    /// treated as an absent value.
    pub fn nested<U, F>(name: impl Into<String>, accessor: F, sub_selector: FieldSelector<U>) -> Self
    where
        F: Fn(&T) -> Option<&[U]> + Send + Sync + 'static,
        U: 'static,
    {
        let name = name.into();
        let nested_error = sub_selector
            .validate(&format!("nested field `{name}`"))
            .err();
        let shape = Shape::of(&sub_selector);
        let sub_shape = shape.clone();
        Self {
            name,
            nested: Some(shape),
            nested_error,
            accessor: Arc::new(move |record: &T| match accessor(record) {
                Some(items) => FieldValue::Multiset(NestedMultiset::from_records(
                    items,
                    &sub_selector,
                    sub_shape.clone(),
                )),
                None => FieldValue::Null,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this field carries a nested field declaration.
    pub fn is_nested(&self) -> bool {
        self.nested.is_some()
    }

    /// Extract this field's value from a record.
    pub fn extract(&self, record: &T) -> FieldValue {
        (self.accessor)(record)
    }

    /// Field identity: the name, plus the sub-selector for nested declarations.
    pub fn signature(&self) -> String {
        match &self.nested {
            Some(shape) => format!("{}({})", self.name, shape.signature.join(",")),
            None => self.name.clone(),
        }
    }

    /// Adapt this field to records held by reference.
    fn by_ref<'a>(&self) -> Field<&'a T>
    where
        T: 'static,
    {
        let accessor = Arc::clone(&self.accessor);
        Field {
            name: self.name.clone(),
            nested: self.nested.clone(),
            nested_error: self.nested_error.clone(),
            accessor: Arc::new(move |record: &&'a T| accessor(record)),
        }
    }
}

/// Ordered list of fields defining the comparison scope.
///
/// Two selectors are interchangeable for set algebra only if their
/// [`signature`](FieldSelector::signature)s are identical.
pub struct FieldSelector<T> {
    fields: Vec<Field<T>>,
}

impl<T> Clone for FieldSelector<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<T> Default for FieldSelector<T> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<T> fmt::Debug for FieldSelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.signature()).finish()
    }
}

impl<T> From<Vec<Field<T>>> for FieldSelector<T> {
    fn from(fields: Vec<Field<T>>) -> Self {
        Self { fields }
    }
}

impl<T> FromIterator<Field<T>> for FieldSelector<T> {
    fn from_iter<I: IntoIterator<Item = Field<T>>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<T> FieldSelector<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leaf field.
    pub fn field<F, V>(self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<FieldValue>,
    {
        self.with(Field::new(name, accessor))
    }

    /// Append a nested field declaration (see [`Field::nested`]).
    pub fn nested<U, F>(self, name: impl Into<String>, accessor: F, sub_selector: FieldSelector<U>) -> Self
    where
        F: Fn(&T) -> Option<&[U]> + Send + Sync + 'static,
        U: 'static,
    {
        self.with(Field::nested(name, accessor, sub_selector))
    }

    /// Append a prebuilt field.
    pub fn with(mut self, field: Field<T>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(Field::name).collect()
    }

    /// Field identity and order, used to check operand compatibility.
    pub fn signature(&self) -> Vec<String> {
        self.fields.iter().map(Field::signature).collect()
    }

    /// `equal(a, b)`: every selected field satisfies field equality.
    pub fn equal(&self, a: &T, b: &T) -> bool {
        self.fields
            .iter()
            .all(|field| equivalence::field_equal(&field.extract(a), &field.extract(b)))
    }

    /// `hash(record)`: polynomial fold of the selected fields' hashes.
    pub fn hash(&self, record: &T) -> u64 {
        self.extract(record).hash()
    }

    /// Adapt this selector to records held by reference.
    pub fn by_ref<'a>(&self) -> FieldSelector<&'a T>
    where
        T: 'static,
    {
        self.fields.iter().map(Field::by_ref).collect()
    }

    /// Reject empty selectors, including empty nested sub-selectors.
    pub(crate) fn validate(&self, context: &str) -> Result<()> {
        if self.fields.is_empty() {
            return Err(FieldSetError::EmptySelector {
                context: context.to_string(),
            });
        }
        match self.fields.iter().find_map(|f| f.nested_error.clone()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub(crate) fn extract(&self, record: &T) -> RecordKey {
        RecordKey::new(self.fields.iter().map(|f| f.extract(record)).collect())
    }
}
