#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI front end for the address resolution engine.
//!
//! Loads a reference store, builds the in-memory index once, and
//! resolves either a single address or every line of a query file.
//! Summary output is one line per query (`[0.97] 245 HIGH STREET
//! PRAHRAN VIC 3181,GAVIC411711441`); `--json` emits the full ranked
//! result per query instead.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use address_match_resolver::{
    MatchStatus, NoMatchReason, ResolutionResult, Resolver, ResolverConfig,
};

#[derive(Parser)]
#[command(name = "address-match", about = "Address resolution tool")]
struct Cli {
    /// Path to the reference store (`.psv` pipe-delimited or `.csv`)
    #[arg(long)]
    reference: PathBuf,

    /// Minimum score for a confident match
    #[arg(long)]
    acceptance_threshold: Option<f64>,

    /// Required score gap between first and second place
    #[arg(long)]
    separation_threshold: Option<f64>,

    /// Score floor below which nothing is reported
    #[arg(long)]
    minimum_threshold: Option<f64>,

    /// Maximum candidates scored per query
    #[arg(long)]
    max_candidates: Option<usize>,

    /// Maximum alternatives reported per query
    #[arg(long)]
    max_alternatives: Option<usize>,

    /// Emit full ranked results as JSON, one object per line
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single address
    Resolve {
        /// Free-form address text
        query: String,
    },
    /// Resolve every line of a query file
    Batch {
        /// File with one address per line; `--` starts a comment
        file: PathBuf,
    },
}

impl Cli {
    fn config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::default();
        if let Some(value) = self.acceptance_threshold {
            config.acceptance_threshold = value;
        }
        if let Some(value) = self.separation_threshold {
            config.separation_threshold = value;
        }
        if let Some(value) = self.minimum_threshold {
            config.minimum_threshold = value;
        }
        if let Some(value) = self.max_candidates {
            config.max_candidates = value;
        }
        if let Some(value) = self.max_alternatives {
            config.max_alternatives = value;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let index = address_match_reference::load_index(&cli.reference)?;
    log::info!("Reference index ready: {} records", index.len());

    let resolver = Resolver::new(index, cli.config())?;

    match &cli.command {
        Commands::Resolve { query } => {
            print_result(query, &resolver.resolve(query), cli.json)?;
        }
        Commands::Batch { file } => {
            let reader = BufReader::new(std::fs::File::open(file)?);
            let mut total = 0u64;
            let mut matched = 0u64;

            for line in reader.lines() {
                let line = line?;
                let Some(query) = query_from_line(&line) else {
                    continue;
                };
                let result = resolver.resolve(query);
                total += 1;
                if result.status == MatchStatus::Matched {
                    matched += 1;
                }
                print_result(query, &result, cli.json)?;
            }

            log::info!("Batch complete: {matched}/{total} matched");
        }
    }

    Ok(())
}

/// Extracts the query text from one batch file line.
///
/// Returns `None` for blank lines and full-line comments; a trailing
/// `--` comment is stripped.
fn query_from_line(line: &str) -> Option<&str> {
    let content = line.find("--").map_or(line, |pos| &line[..pos]);
    let content = content.trim();
    if content.is_empty() { None } else { Some(content) }
}

fn print_result(
    query: &str,
    result: &ResolutionResult,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    match (&result.status, &result.best) {
        (MatchStatus::Matched, Some(best)) => {
            println!("[{:4.2}] {},{}", best.score, best.record, best.record.id);
        }
        (MatchStatus::Ambiguous, Some(best)) => {
            println!(
                "[{:4.2}] {},{} (ambiguous, {} candidates)",
                best.score,
                best.record,
                best.record.id,
                result.alternatives.len()
            );
        }
        _ => {
            println!("[----] {query} ({})", reason_label(result.reason));
        }
    }

    Ok(())
}

const fn reason_label(reason: Option<NoMatchReason>) -> &'static str {
    match reason {
        Some(NoMatchReason::InvalidInput) => "invalid input",
        Some(NoMatchReason::NoCandidates) => "no candidates",
        Some(NoMatchReason::BelowMinimum) => "below minimum score",
        None => "no match",
    }
}
