#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::*;
use fieldset_core::{FieldSelector, FieldSetError, FieldValue};

#[derive(Debug, Clone)]
struct Project {
    code: &'static str,
    tags: Vec<&'static str>,
}

#[derive(Debug, Clone)]
struct Division {
    name: &'static str,
    projects: Vec<Project>,
}

fn division_selector() -> FieldSelector<Division> {
    let tags = FieldSelector::new().field("tag", |t: &&'static str| *t);
    let projects = FieldSelector::new()
        .field("code", |p: &Project| p.code)
        .nested("tags", |p: &Project| Some(p.tags.as_slice()), tags);
    FieldSelector::new()
        .field("name", |d: &Division| d.name)
        .nested("projects", |d: &Division| Some(d.projects.as_slice()), projects)
}

fn project(code: &'static str, tags: &[&'static str]) -> Project {
    Project {
        code,
        tags: tags.to_vec(),
    }
}

#[test]
fn test_nested_order_is_irrelevant() {
    let a = person("Alice", 25, vec![dept("D1", "Engineering"), dept("D2", "HR")]);
    let b = person("Alice", 25, vec![dept("D2", "HR"), dept("D1", "Engineering")]);

    let selector = person_selector();
    assert!(selector.equal(&a, &b));
    assert_eq!(selector.hash(&a), selector.hash(&b));

    let left = multiset(vec![a], person_selector());
    let right = multiset(vec![b], person_selector());
    assert!(left.elements_equals(&right).unwrap());
    assert_eq!(left.intersect(&right).unwrap().len(), 1);
}

#[test]
fn test_nested_content_difference_is_unequal() {
    let a = person("Alice", 25, vec![dept("D1", "Engineering"), dept("D2", "HR")]);
    let b = person("Alice", 25, vec![dept("D1", "Engineering"), dept("D2", "Research")]);
    assert!(!person_selector().equal(&a, &b));

    let left = multiset(vec![a], person_selector());
    let right = multiset(vec![b], person_selector());
    assert_eq!(left.difference(&right).unwrap().len(), 1);
}

#[test]
fn test_nested_size_difference_is_unequal() {
    let a = person("Alice", 25, vec![dept("D1", "Engineering"), dept("D1", "Engineering")]);
    let b = person("Alice", 25, vec![dept("D1", "Engineering")]);
    assert!(!person_selector().equal(&a, &b));
}

#[test]
fn test_nested_duplicates_are_counted() {
    let a = person("Alice", 25, vec![dept("D1", "Eng"), dept("D1", "Eng"), dept("D2", "HR")]);
    let b = person("Alice", 25, vec![dept("D1", "Eng"), dept("D2", "HR"), dept("D2", "HR")]);
    assert!(!person_selector().equal(&a, &b));
}

#[test]
fn test_unselected_sub_fields_are_ignored() {
    let by_id = FieldSelector::new()
        .field("name", |p: &Person| p.name.clone())
        .nested(
            "depts",
            |p: &Person| Some(p.depts.as_slice()),
            FieldSelector::new().field("id", |d: &Dept| d.id.clone()),
        );
    let a = person("Alice", 25, vec![dept("D1", "Engineering")]);
    let b = person("Alice", 25, vec![dept("D1", "Platform")]);
    assert!(by_id.equal(&a, &b));
}

#[test]
fn test_absent_collection_is_null() {
    let selector = FieldSelector::new().nested(
        "depts",
        |p: &Person| (!p.depts.is_empty()).then_some(p.depts.as_slice()),
        dept_selector(),
    );
    let none = person("Bob", 30, vec![]);
    let some = person("Bob", 30, vec![dept("D1", "Eng")]);

    assert!(selector.equal(&none, &none.clone()));
    assert!(!selector.equal(&none, &some));
}

#[test]
fn test_two_levels_of_nesting() {
    let a = Division {
        name: "R&D",
        projects: vec![project("P1", &["rust", "db"]), project("P2", &["ui"])],
    };
    let b = Division {
        name: "R&D",
        projects: vec![project("P2", &["ui"]), project("P1", &["db", "rust"])],
    };
    let c = Division {
        name: "R&D",
        projects: vec![project("P2", &["ui"]), project("P1", &["db", "go"])],
    };

    let selector = division_selector();
    assert_eq!(selector.signature(), vec!["name", "projects(code,tags(tag))"]);
    assert!(selector.equal(&a, &b));
    assert_eq!(selector.hash(&a), selector.hash(&b));
    assert!(!selector.equal(&a, &c));

    let left = multiset(vec![a], division_selector());
    let right = multiset(vec![c], division_selector());
    assert!(!left.elements_equals(&right).unwrap());
}

#[test]
fn test_empty_nested_selector_fails_construction() {
    let selector = FieldSelector::new()
        .field("name", |p: &Person| p.name.clone())
        .nested("depts", |p: &Person| Some(p.depts.as_slice()), FieldSelector::<Dept>::new());

    let err = fieldset_core::BucketedMultiset::new(vec![person("A", 1, vec![])], selector)
        .unwrap_err();
    assert!(matches!(err, FieldSetError::EmptySelector { ref context } if context.contains("depts")));
}

#[test]
fn test_nested_sub_selectors_must_match_across_operands() {
    let by_id = FieldSelector::new().nested(
        "depts",
        |p: &Person| Some(p.depts.as_slice()),
        FieldSelector::new().field("id", |d: &Dept| d.id.clone()),
    );
    let by_name = FieldSelector::new().nested(
        "depts",
        |p: &Person| Some(p.depts.as_slice()),
        FieldSelector::new().field("name", |d: &Dept| d.name.clone()),
    );

    let a = multiset(vec![person("A", 1, vec![])], by_id);
    let b = multiset(vec![person("A", 1, vec![])], by_name);
    assert!(matches!(
        a.intersect(&b).unwrap_err(),
        FieldSetError::SelectorMismatch { .. }
    ));
}

#[test]
fn test_nested_value_display() {
    let selector = person_selector();
    let depts = FieldSelector::new()
        .nested("depts", |p: &Person| Some(p.depts.as_slice()), dept_selector());
    let alice = person("Alice", 25, vec![dept("D1", "Engineering"), dept("D2", "HR")]);

    let multiset_field = multiset(alice.depts.clone(), dept_selector());
    let value = FieldValue::from(&multiset_field);
    assert_eq!(
        value.to_string(),
        "[{id: D1, name: Engineering}, {id: D2, name: HR}]"
    );
    assert_eq!(selector.names(), vec!["name", "age", "depts"]);
    assert!(depts.equal(&alice, &alice));
}
