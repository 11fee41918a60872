//! Field-level equality and a structural hash consistent with it.
//!
//! ## Contract
//!
//! `field_equal(a, b) ⇒ field_hash(a) == field_hash(b)`, and therefore
//! `keys_equal(a, b) ⇒ a.hash() == b.hash()`. The converse does not hold:
//! collisions are expected and resolved by the callers of [`keys_equal`].
//!
//! ## Equality rules, in priority order
//!
//! 1. Two nulls are equal; a null never equals a non-null.
//! 2. Decimals compare numerically (`1.50 == 1.5`).
//! 3. Nested multisets compare by full multiset equivalence.
//! 4. Everything else compares by the value's native equality; values of
//!    different variants are unequal.

use crate::field::FieldValue;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Polynomial multiplier for folding field hashes.
pub const HASH_MULTIPLIER: u64 = 31;

/// Field equality under the rules above.
pub fn field_equal(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => true,
        (FieldValue::Null, _) | (_, FieldValue::Null) => false,
        (FieldValue::Decimal(x), FieldValue::Decimal(y)) => x == y,
        (FieldValue::Multiset(x), FieldValue::Multiset(y)) => x.elements_equals(y),
        (FieldValue::Bool(x), FieldValue::Bool(y)) => x == y,
        (FieldValue::Int(x), FieldValue::Int(y)) => x == y,
        (FieldValue::Text(x), FieldValue::Text(y)) => x == y,
        (FieldValue::Custom(x), FieldValue::Custom(y)) => x.value_eq(y),
        _ => false,
    }
}

/// Hash contribution of one field value.
///
/// Decimals hash by their zero-stripped form, nested multisets by their
/// order-independent content hash, nulls as zero.
pub fn field_hash(value: &FieldValue) -> u64 {
    match value {
        FieldValue::Null => 0,
        FieldValue::Decimal(d) => native_hash(&d.normalize()),
        FieldValue::Multiset(m) => m.content_hash(),
        FieldValue::Bool(b) => native_hash(b),
        FieldValue::Int(i) => native_hash(i),
        FieldValue::Text(s) => native_hash(s.as_str()),
        FieldValue::Custom(c) => {
            let mut hasher = DefaultHasher::new();
            c.value_hash(&mut hasher);
            hasher.finish()
        }
    }
}

/// `h = 31*h + x` over `hashes`, starting from `seed`.
pub fn fold_hashes(seed: u64, hashes: impl IntoIterator<Item = u64>) -> u64 {
    hashes
        .into_iter()
        .fold(seed, |acc, h| acc.wrapping_mul(HASH_MULTIPLIER).wrapping_add(h))
}

// Fixed-key hasher: equal inputs hash equally across calls and instances.
fn native_hash<V: Hash + ?Sized>(value: &V) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// The extracted, comparable form of one record: its selected field values
/// in declared order, plus their structural hash.
#[derive(Clone, Debug)]
pub struct RecordKey {
    values: Vec<FieldValue>,
    hash: u64,
}

impl RecordKey {
    pub fn new(values: Vec<FieldValue>) -> Self {
        let hash = fold_hashes(0, values.iter().map(field_hash));
        Self { values, hash }
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }
}

/// Record equality: every field pair satisfies [`field_equal`].
pub fn keys_equal(a: &RecordKey, b: &RecordKey) -> bool {
    a.values.len() == b.values.len()
        && a
            .values
            .iter()
            .zip(&b.values)
            .all(|(x, y)| field_equal(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> FieldValue {
        FieldValue::Decimal(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_null_rules() {
        assert!(field_equal(&FieldValue::Null, &FieldValue::Null));
        assert!(!field_equal(&FieldValue::Null, &FieldValue::from("x")));
        assert!(!field_equal(&FieldValue::from(0), &FieldValue::Null));
        assert_eq!(field_hash(&FieldValue::Null), 0);
    }

    #[test]
    fn test_decimal_trailing_zeros_are_insignificant() {
        assert!(field_equal(&dec("1.50"), &dec("1.5")));
        assert!(field_equal(&dec("2"), &dec("2.000")));
        assert_eq!(field_hash(&dec("1.50")), field_hash(&dec("1.5")));
        assert_eq!(field_hash(&dec("-0.00")), field_hash(&dec("0")));
    }

    #[test]
    fn test_decimal_precision_is_kept() {
        assert!(!field_equal(&dec("1.50"), &dec("1.500000001")));
    }

    #[test]
    fn test_variants_do_not_cross_compare() {
        assert!(!field_equal(&FieldValue::from(1), &dec("1")));
        assert!(!field_equal(&FieldValue::from(1), &FieldValue::from("1")));
        assert!(!field_equal(&FieldValue::from(true), &FieldValue::from(1)));
    }

    #[test]
    fn test_record_key_hash_is_polynomial() {
        let key = RecordKey::new(vec![FieldValue::Null, FieldValue::Null]);
        assert_eq!(key.hash(), 0);

        let a = FieldValue::from(1);
        let b = FieldValue::from("B");
        let expected = fold_hashes(0, [field_hash(&a), field_hash(&b)]);
        assert_eq!(RecordKey::new(vec![a, b]).hash(), expected);
    }

    #[test]
    fn test_record_key_hash_is_order_sensitive() {
        let ab = RecordKey::new(vec![FieldValue::from(1), FieldValue::from(2)]);
        let ba = RecordKey::new(vec![FieldValue::from(2), FieldValue::from(1)]);
        assert_ne!(ab.hash(), ba.hash());
        assert!(!keys_equal(&ab, &ba));
    }

    #[test]
    fn test_keys_equal_with_decimals() {
        let a = RecordKey::new(vec![FieldValue::from(7), dec("10.10")]);
        let b = RecordKey::new(vec![FieldValue::from(7), dec("10.1")]);
        assert!(keys_equal(&a, &b));
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_fold_hashes_seed() {
        assert_eq!(fold_hashes(1, []), 1);
        assert_eq!(fold_hashes(1, [5]), 31 + 5);
        assert_eq!(fold_hashes(0, [2, 3]), 2 * 31 + 3);
    }
}
