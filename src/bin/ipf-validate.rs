//! IPF catalog validator CLI
//!
//! Validates catalog entries against the IPF JSON Schema.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ipf_validate::{
    collect_files, load_schema, render_json, render_text, require_roots, validate_files,
    CatalogSchema, CollectOptions, ConfigError, ValidateOptions,
};
use tracing_subscriber::EnvFilter;

/// Roots walked when no targets are given at all.
const DEFAULT_DIRS: &[&str] = &["catalog", "examples"];

#[derive(Parser)]
#[command(name = "ipf-validate")]
#[command(about = "Validate IPF JSON against the schema")]
#[command(version)]
struct Cli {
    /// Files, directories or globs (e.g. catalog examples/*.json)
    targets: Vec<String>,

    /// Path to the JSON Schema
    #[arg(long, default_value = "schema/ipf-schema-v1.0.json")]
    schema: PathBuf,

    /// Catalog root directory (must exist; repeatable)
    #[arg(long)]
    catalog: Vec<PathBuf>,

    /// Extra directories to walk; missing ones are skipped
    #[arg(long, num_args = 1..)]
    dirs: Vec<PathBuf>,

    /// Enable strict semantic checks (dates, escape hatches, quality bounds, license)
    #[arg(long)]
    strict: bool,

    /// Output a machine-readable JSON summary
    #[arg(long)]
    json: bool,

    /// Do not enforce `format` keywords
    #[arg(long)]
    no_format_check: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run(cli: Cli) -> Result<(), u8> {
    let json_output = cli.json;
    let options = ValidateOptions::new()
        .strict(cli.strict)
        .format_check(!cli.no_format_check);

    let schema = load_schema(&cli.schema).map_err(|e| config_error(json_output, &e))?;
    let compiled =
        CatalogSchema::compile(&schema, &options).map_err(|e| config_error(json_output, &e))?;
    require_roots(&cli.catalog).map_err(|e| config_error(json_output, &e))?;

    let targets = gather_targets(&cli);
    let files = collect_files(&targets, &CollectOptions::default());
    if files.is_empty() {
        if json_output {
            println!("{}", serde_json::json!({ "error": ConfigError::NoInput.to_string() }));
        }
        eprintln!("[WARN] No JSON files matched the given targets.");
        return Err(ConfigError::NoInput.exit_code() as u8);
    }
    tracing::debug!(count = files.len(), "collected candidate files");

    let summary = validate_files(&files, &compiled, &options);

    if json_output {
        let rendered = render_json(&summary).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", rendered);
    } else {
        print!("{}", render_text(&summary));
    }

    match summary.exit_code() {
        0 => Ok(()),
        code => Err(code),
    }
}

/// Positional targets, catalog roots and existing `--dirs`, or the default
/// roots when nothing was given.
fn gather_targets(cli: &Cli) -> Vec<String> {
    let mut targets = cli.targets.clone();
    targets.extend(cli.catalog.iter().map(|p| p.to_string_lossy().into_owned()));

    let lenient: Vec<PathBuf> = if targets.is_empty() && cli.dirs.is_empty() {
        DEFAULT_DIRS.iter().map(PathBuf::from).collect()
    } else {
        cli.dirs.clone()
    };
    for dir in lenient {
        if dir.exists() {
            targets.push(dir.to_string_lossy().into_owned());
        } else {
            tracing::warn!(dir = %dir.display(), "directory not found, skipping");
        }
    }
    targets
}

/// Report a configuration error and return its exit code.
fn config_error(json_output: bool, err: &ConfigError) -> u8 {
    if json_output {
        println!("{}", serde_json::json!({ "error": err.to_string() }));
    }
    eprintln!("Error: {}", err);
    err.exit_code() as u8
}
