//! CLI for running a form payload through the validation pipeline
//!
//! Usage:
//!   form-check validate --schema config/roster_schema.yaml --input payload.json
//!   form-check validate --schema schema.yaml --input payload.json --people people.json
//!   form-check delete --schema schema.yaml --existing person.json --confirm octocat
//!
//! Logging goes to stderr and is controlled by RUST_LOG (default: warn).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use roster_form::{
    ErrorDisplay, ExistingRecord, FormRules, FormSchema, FormSession, NormalizedRecord,
    PeopleIndex, SubmissionSink, ValidationEngine,
};

#[derive(Parser)]
#[command(name = "form-check")]
#[command(about = "Validate and normalize roster form submissions")]
struct Args {
    /// Form schema (YAML, or JSON with a .json extension)
    #[arg(short, long, global = true, default_value = "config/roster_schema.yaml")]
    schema: PathBuf,

    /// Business rules file; falls back to FORM_RULES_PATH, then defaults
    #[arg(short, long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a payload and print the normalized record
    Validate {
        /// JSON object of field values
        #[arg(short, long)]
        input: PathBuf,

        /// JSON array of existing people records
        #[arg(short, long)]
        people: Option<PathBuf>,

        /// JSON object of the record being edited (enables edit mode)
        #[arg(short, long)]
        existing: Option<PathBuf>,
    },
    /// Confirm deletion of an existing record
    Delete {
        /// JSON object of the record to delete
        #[arg(short, long)]
        existing: PathBuf,

        /// Identity as re-typed by the user
        #[arg(short, long)]
        confirm: String,
    },
}

/// Prints accepted records and deletions to stdout.
struct StdoutSink;

impl SubmissionSink for StdoutSink {
    fn submit(&mut self, record: NormalizedRecord) {
        match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize record: {}", e),
        }
    }

    fn destroy(&mut self, identity: &str) {
        println!("deleted {}", identity);
    }
}

struct StderrDisplay;

impl ErrorDisplay for StderrDisplay {
    fn show(&mut self, message: &str) {
        eprintln!("error: {}", message);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the form action was accepted.
fn run(args: Args) -> Result<bool> {
    let schema = FormSchema::load(&args.schema)?;
    let rules = match &args.rules {
        Some(path) => FormRules::load(path)?,
        None => FormRules::from_env()?,
    };
    let engine = ValidationEngine::new(schema, rules).context("Rules do not fit the schema")?;

    match args.command {
        Command::Validate {
            input,
            people,
            existing,
        } => {
            let payload: ExistingRecord = read_json(&input)?;
            let people = match people {
                Some(path) => {
                    let records: Vec<serde_json::Value> = read_json(&path)?;
                    PeopleIndex::from_records(&records, engine.identity_field())
                }
                None => PeopleIndex::default(),
            };
            let existing: Option<ExistingRecord> =
                existing.map(|path| read_json(&path)).transpose()?;

            let mut session = FormSession::new(&engine, existing, StdoutSink, StderrDisplay);
            session
                .apply_values(&payload)
                .with_context(|| format!("Invalid payload in {}", input.display()))?;
            Ok(session.submit(&people).is_ok())
        }
        Command::Delete { existing, confirm } => {
            let record: ExistingRecord = read_json(&existing)?;
            let mut session = FormSession::new(&engine, Some(record), StdoutSink, StderrDisplay);
            Ok(session.delete(&confirm).is_ok())
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
