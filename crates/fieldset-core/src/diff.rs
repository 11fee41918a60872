//! Human-readable field-level differences between non-matching records.
//!
//! Reporting is opt-in through the `*_with_reporter` operations on
//! [`BucketedMultiset`](crate::BucketedMultiset). A reporter is any
//! `FnMut(String)`; it is called zero or more times with self-contained
//! messages such as:
//!
//! ```text
//! No match for Person { name: "Alice", .. } in other multiset, differences with Person { name: "Bob", .. }:
//! name: Alice != Bob
//! depts: list sizes differ: 2 vs 1
//! ```

use crate::algebra::{self, MismatchSink};
use crate::bucket::BucketIndex;
use crate::config::{CompareOptions, SingletonPolicy};
use crate::equivalence::{self, RecordKey};
use crate::field::FieldValue;
use crate::nested::NestedMultiset;
use std::fmt::Debug;

/// A reporter that forwards every message as a `debug` event.
pub fn tracing_reporter() -> impl FnMut(String) {
    |message: String| tracing::debug!(target: "fieldset::diff", "{message}")
}

/// Describe why `a` does not match `b` under the named fields.
///
/// Returns `None` when every field is equal.
pub fn render_difference<T: Debug>(
    names: &[&str],
    a: &T,
    b: &T,
    a_key: &RecordKey,
    b_key: &RecordKey,
) -> Option<String> {
    let mut lines = Vec::new();
    for ((name, x), y) in names.iter().zip(a_key.values()).zip(b_key.values()) {
        field_lines(name, x, y, &mut lines);
    }
    if lines.is_empty() {
        return None;
    }
    Some(format!(
        "No match for {a:?} in other multiset, differences with {b:?}:\n{}",
        lines.join("\n")
    ))
}

fn field_lines(name: &str, x: &FieldValue, y: &FieldValue, lines: &mut Vec<String>) {
    if equivalence::field_equal(x, y) {
        return;
    }
    match (x, y) {
        (FieldValue::Multiset(mx), FieldValue::Multiset(my)) => nested_lines(name, mx, my, lines),
        _ => lines.push(format!("{name}: {x} != {y}")),
    }
}

fn nested_lines(name: &str, x: &NestedMultiset, y: &NestedMultiset, lines: &mut Vec<String>) {
    if x.len() != y.len() {
        lines.push(format!("{name}: list sizes differ: {} vs {}", x.len(), y.len()));
        return;
    }
    if x.field_names() != y.field_names() {
        lines.push(format!("{name}: {x} != {y}"));
        return;
    }

    let before = lines.len();
    let (left_only, right_only) =
        algebra::symmetric_difference(x.index(), y.index(), SingletonPolicy::Verify);
    for &i in &left_only {
        for &j in &right_only {
            let sub_keys = x.index().key(i).values().iter().zip(y.index().key(j).values());
            for (sub, (sx, sy)) in x.field_names().iter().zip(sub_keys) {
                field_lines(&format!("{name}[{i}~{j}].{sub}"), sx, sy, lines);
            }
        }
    }
    if lines.len() == before {
        lines.push(format!("{name}: {x} != {y}"));
    }
}

/// Turns the mismatched positions found by the set algebra into rendered
/// messages, within the options' reporting budget.
pub(crate) struct DiffReporter<'r, 'e, T> {
    names: Vec<&'e str>,
    left: &'e [T],
    right: &'e [T],
    left_index: &'e BucketIndex,
    right_index: &'e BucketIndex,
    sink: &'r mut dyn FnMut(String),
    budget: Option<usize>,
    sent: usize,
    exhausted: bool,
}

impl<'r, 'e, T: Debug> DiffReporter<'r, 'e, T> {
    pub(crate) fn new(
        names: Vec<&'e str>,
        (left, left_index): (&'e [T], &'e BucketIndex),
        (right, right_index): (&'e [T], &'e BucketIndex),
        options: CompareOptions,
        sink: &'r mut dyn FnMut(String),
    ) -> Self {
        Self {
            names,
            left,
            right,
            left_index,
            right_index,
            sink,
            budget: options.max_reported_pairs,
            sent: 0,
            exhausted: false,
        }
    }

    pub(crate) fn sent(&self) -> usize {
        self.sent
    }

    fn admit(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if let Some(max) = self.budget {
            if self.sent >= max {
                tracing::warn!(
                    max_reported_pairs = max,
                    "diff reporting budget exhausted, further differences are not reported"
                );
                self.exhausted = true;
                return false;
            }
        }
        true
    }

    fn send(&mut self, message: String) {
        self.sent += 1;
        (self.sink)(message);
    }
}

impl<T: Debug> MismatchSink for DiffReporter<'_, '_, T> {
    fn pair(&mut self, left: usize, right: usize) {
        if !self.admit() {
            return;
        }
        let message = render_difference(
            &self.names,
            &self.left[left],
            &self.right[right],
            self.left_index.key(left),
            self.right_index.key(right),
        );
        if let Some(message) = message {
            self.send(message);
        }
    }

    fn sizes(&mut self, left_len: usize, right_len: usize) {
        if self.admit() {
            self.send(format!(
                "No match between multisets, sizes are different: {left_len} vs {right_len}"
            ));
        }
    }

    fn enabled(&self) -> bool {
        !self.exhausted
    }
}
