//! JSON record loading and selector construction shared by all commands.

use clap::Args;
use fieldset_core::logging_facility::Profile;
use fieldset_core::{ExError, ExErrorKind, Field, FieldSelector, FieldValue};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Args)]
pub struct SelectorArgs {
    /// Comma-separated fields to compare, in order
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Compare FIELD (an array of objects) as a nested multiset of its sub-fields
    #[arg(long = "nested", value_name = "FIELD=SUB1,SUB2")]
    pub nested: Vec<String>,

    /// Emit logs on stderr with this profile (development, production)
    #[arg(long)]
    pub log_profile: Option<Profile>,
}

/// Read a JSON array of records.
pub fn load(path: &Path) -> Result<Vec<Value>, ExError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ExError::new(ExErrorKind::Io)
            .with_op("load_records")
            .with_message(format!("{}: {e}", path.display()))
    })?;
    let records: Vec<Value> = serde_json::from_str(&text).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("load_records")
            .with_message(format!("{}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), records = records.len() as u64, "records loaded");
    Ok(records)
}

/// Comparable form of a JSON value: numbers as decimals, strings as text,
/// arrays and objects as their canonical JSON text.
///
/// Numbers are read from their source text, so digits beyond `f64` precision
/// are kept. Numbers a `Decimal` cannot hold compare as text.
pub fn json_field(value: Option<&Value>) -> FieldValue {
    match value {
        None | Some(Value::Null) => FieldValue::Null,
        Some(Value::Bool(b)) => FieldValue::Bool(*b),
        Some(Value::Number(n)) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_or(FieldValue::Text(text), FieldValue::Decimal)
        }
        Some(Value::String(s)) => FieldValue::Text(s.clone()),
        Some(other) => FieldValue::Text(other.to_string()),
    }
}

fn leaf(name: &str) -> Field<Value> {
    let key = name.to_string();
    Field::new(name, move |record: &Value| json_field(record.get(key.as_str())))
}

fn invalid(message: String) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("build_selector")
        .with_message(message)
}

fn parse_nested(decls: &[String]) -> Result<BTreeMap<String, Vec<String>>, ExError> {
    let mut nested = BTreeMap::new();
    for decl in decls {
        let (field, subs) = decl
            .split_once('=')
            .ok_or_else(|| invalid(format!("--nested expects FIELD=SUB1,SUB2, got `{decl}`")))?;
        let subs = subs
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        nested.insert(field.to_string(), subs);
    }
    Ok(nested)
}

/// Build the record selector from `--fields` and `--nested`.
///
/// Emptiness is left to multiset construction, which reports it as a
/// configuration error.
pub fn build_selector(args: &SelectorArgs) -> Result<FieldSelector<Value>, ExError> {
    let mut nested = parse_nested(&args.nested)?;
    let mut selector: FieldSelector<Value> = FieldSelector::new();
    for name in args.fields.iter().filter(|n| !n.is_empty()) {
        selector = match nested.remove(name) {
            Some(subs) => {
                let key = name.clone();
                let sub_selector: FieldSelector<Value> = subs.iter().map(|s| leaf(s)).collect();
                selector.nested(
                    name.clone(),
                    move |record: &Value| {
                        record
                            .get(key.as_str())
                            .and_then(Value::as_array)
                            .map(Vec::as_slice)
                    },
                    sub_selector,
                )
            }
            None => selector.with(leaf(name)),
        };
    }
    if let Some(field) = nested.keys().next() {
        return Err(invalid(format!(
            "--nested field `{field}` is not listed in --fields"
        )));
    }
    Ok(selector)
}
