//! Content hash command
//!
//! Usage: fieldset content-hash --left <FILE> [--right <FILE>] --fields <F1,F2>

use super::compare::to_json;
use super::records::{self, SelectorArgs};
use clap::Args;
use fieldset_core::logging_facility;
use fieldset_core::{BucketedMultiset, ExError};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ContentHashArgs {
    /// JSON array of records to hash
    #[arg(long)]
    pub left: PathBuf,

    /// Optional second file, hashed with the same fields
    #[arg(long)]
    pub right: Option<PathBuf>,

    #[command(flatten)]
    pub selector: SelectorArgs,
}

#[derive(Serialize)]
struct ContentHashOutput {
    left: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    right: Option<u64>,
}

/// Execute content-hash command
pub fn execute(args: ContentHashArgs) -> Result<(), ExError> {
    if let Some(profile) = args.selector.log_profile {
        logging_facility::init(profile);
    }

    let selector = records::build_selector(&args.selector)?;
    let left = BucketedMultiset::new(records::load(&args.left)?, selector.clone())?;
    let right = match &args.right {
        Some(path) => Some(BucketedMultiset::new(records::load(path)?, selector)?.content_hash()),
        None => None,
    };

    let output = to_json(ContentHashOutput {
        left: left.content_hash(),
        right,
    })?;
    println!("{}", output);
    Ok(())
}
