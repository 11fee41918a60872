use fieldset_core::{BucketedMultiset, FieldSelector, FieldValue};
use rust_decimal::Decimal;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub city: String,
    pub zip: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dept {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub salary: Decimal,
    pub address: Option<Address>,
    pub depts: Vec<Dept>,
    /// Incidental: never selected for comparison.
    pub fetched_at: u64,
}

/// Equal only by `id`, but every instance lands in the same hash bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionKey(pub u32);

impl Hash for CollisionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        0xC0FFEE_u32.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Colliding {
    pub key: CollisionKey,
    pub label: &'static str,
}

#[allow(dead_code)]
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[allow(dead_code)]
pub fn dept(id: &str, name: &str) -> Dept {
    Dept {
        id: id.to_string(),
        name: name.to_string(),
    }
}

#[allow(dead_code)]
pub fn person(name: &str, age: u32, depts: Vec<Dept>) -> Person {
    Person {
        name: name.to_string(),
        age,
        salary: dec("1000.00"),
        address: Some(Address {
            city: "Oslo".to_string(),
            zip: "0150".to_string(),
        }),
        depts,
        fetched_at: 0,
    }
}

#[allow(dead_code)]
pub fn dept_selector() -> FieldSelector<Dept> {
    FieldSelector::new()
        .field("id", |d: &Dept| d.id.clone())
        .field("name", |d: &Dept| d.name.clone())
}

/// name, age and the departments as a nested multiset.
#[allow(dead_code)]
pub fn person_selector() -> FieldSelector<Person> {
    FieldSelector::new()
        .field("name", |p: &Person| p.name.clone())
        .field("age", |p: &Person| p.age)
        .nested("depts", |p: &Person| Some(p.depts.as_slice()), dept_selector())
}

/// Every selected field, including the decimal and the custom-typed address.
#[allow(dead_code)]
pub fn full_person_selector() -> FieldSelector<Person> {
    person_selector()
        .field("salary", |p: &Person| p.salary)
        .field("address", |p: &Person| {
            p.address.clone().map_or(FieldValue::Null, FieldValue::custom)
        })
}

#[allow(dead_code)]
pub fn colliding_selector() -> FieldSelector<Colliding> {
    FieldSelector::new().field("key", |c: &Colliding| FieldValue::custom(c.key.clone()))
}

#[allow(dead_code)]
pub fn colliding(id: u32, label: &'static str) -> Colliding {
    Colliding {
        key: CollisionKey(id),
        label,
    }
}

#[allow(dead_code)]
pub fn multiset<T>(elements: Vec<T>, selector: FieldSelector<T>) -> BucketedMultiset<T> {
    BucketedMultiset::new(elements, selector).unwrap()
}
