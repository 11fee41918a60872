//! fieldset CLI
//!
//! Compares two JSON record files by a chosen subset of fields.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "fieldset")]
#[command(about = "fieldset - Field-subset multiset comparison of JSON records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Records of LEFT with an equal record in RIGHT
    Intersect(commands::compare::CompareArgs),
    /// Records of LEFT without an equal record in RIGHT
    Difference(commands::compare::CompareArgs),
    /// Records only in LEFT and records only in RIGHT
    SymmetricDifference(commands::compare::CompareArgs),
    /// Every record of LEFT with all its equal records in RIGHT
    Match(commands::compare::CompareArgs),
    /// Whether LEFT and RIGHT hold the same records, in any order
    Equals(commands::compare::CompareArgs),
    /// Order-independent hash of a record file
    ContentHash(commands::content_hash::ContentHashArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Intersect(args) => commands::compare::execute(commands::compare::Op::Intersect, args),
        Commands::Difference(args) => commands::compare::execute(commands::compare::Op::Difference, args),
        Commands::SymmetricDifference(args) => {
            commands::compare::execute(commands::compare::Op::SymmetricDifference, args)
        }
        Commands::Match(args) => commands::compare::execute(commands::compare::Op::Match, args),
        Commands::Equals(args) => commands::compare::execute(commands::compare::Op::Equals, args),
        Commands::ContentHash(args) => commands::content_hash::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
