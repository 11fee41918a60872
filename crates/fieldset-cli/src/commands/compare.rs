//! Binary comparison commands
//!
//! Usage: fieldset <op> --left <FILE> --right <FILE> --fields <F1,F2>
//!        [--nested <FIELD=SUB1,SUB2>]... [--trust-hash] [--report]

use super::records::{self, SelectorArgs};
use clap::Args;
use fieldset_core::logging_facility;
use fieldset_core::{BucketedMultiset, CompareOptions, ExError, ExErrorKind, SingletonPolicy};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Left-hand JSON array of records
    #[arg(long)]
    pub left: PathBuf,

    /// Right-hand JSON array of records
    #[arg(long)]
    pub right: PathBuf,

    #[command(flatten)]
    pub selector: SelectorArgs,

    /// Resolve one-to-one buckets by hash alone, without comparing fields
    #[arg(long)]
    pub trust_hash: bool,

    /// Print field-level differences on stderr (difference and equals only)
    #[arg(long)]
    pub report: bool,

    /// Stop reporting after this many messages
    #[arg(long, value_name = "N")]
    pub max_reported_pairs: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Intersect,
    Difference,
    SymmetricDifference,
    Match,
    Equals,
}

#[derive(Serialize)]
struct SymmetricDifferenceOutput<'a> {
    left_only: Vec<&'a Value>,
    right_only: Vec<&'a Value>,
}

#[derive(Serialize)]
struct MatchOutput<'a> {
    element: &'a Value,
    matches: Vec<&'a Value>,
}

#[derive(Serialize)]
struct EqualsOutput {
    equal: bool,
}

fn options(args: &CompareArgs) -> CompareOptions {
    let policy = if args.trust_hash {
        SingletonPolicy::TrustHash
    } else {
        SingletonPolicy::Verify
    };
    let options = CompareOptions::new().with_singleton_policy(policy);
    match args.max_reported_pairs {
        Some(max) => options.with_max_reported_pairs(max),
        None => options,
    }
}

/// Execute a comparison command
pub fn execute(op: Op, args: CompareArgs) -> Result<(), ExError> {
    if let Some(profile) = args.selector.log_profile {
        logging_facility::init(profile);
    }

    let selector = records::build_selector(&args.selector)?;
    let left = BucketedMultiset::new(records::load(&args.left)?, selector.clone())?
        .with_options(options(&args));
    let right = BucketedMultiset::new(records::load(&args.right)?, selector)?;

    if args.report && !matches!(op, Op::Difference | Op::Equals) {
        tracing::debug!(?op, "--report has no effect on this operation");
    }
    let mut to_stderr = |message: String| eprintln!("{message}");

    let output = match op {
        Op::Intersect => to_json(left.intersect(&right)?),
        Op::Difference if args.report => {
            to_json(left.difference_with_reporter(&right, &mut to_stderr)?)
        }
        Op::Difference => to_json(left.difference(&right)?),
        Op::SymmetricDifference => {
            let (left_only, right_only) = left.symmetric_difference(&right)?;
            to_json(SymmetricDifferenceOutput {
                left_only,
                right_only,
            })
        }
        Op::Match => {
            let matches: Vec<MatchOutput> = left
                .match_elements(&right)?
                .into_iter()
                .map(|m| MatchOutput {
                    element: m.element,
                    matches: m.matches,
                })
                .collect();
            to_json(matches)
        }
        Op::Equals if args.report => to_json(EqualsOutput {
            equal: left.elements_equals_with_reporter(&right, &mut to_stderr)?,
        }),
        Op::Equals => to_json(EqualsOutput {
            equal: left.elements_equals(&right)?,
        }),
    }?;

    println!("{}", output);
    Ok(())
}

pub(crate) fn to_json<S: Serialize>(value: S) -> Result<String, ExError> {
    serde_json::to_string_pretty(&value).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("write_output")
            .with_message(e.to_string())
    })
}
