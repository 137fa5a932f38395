// crates/fixture-keeper-cli/src/main.rs
// ============================================================================
// Module: Fixture Keeper CLI Entry Point
// Description: Operator commands over the pending-cleanup ledger.
// Purpose: Sweep, inspect, and prune fixture obligations outside a test run.
// Dependencies: clap, fixture-keeper-{config,core,ledger,runtime}, serde_json, tokio
// ============================================================================

//! ## Overview
//! `fixture-keeper sweep` resolves ledger entries left by earlier runs and
//! exits non-zero unless every account was deleted. `list` prints pending
//! identifiers and creation times; secrets are never printed. `prune` drops
//! stale entries locally without contacting the service.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use fixture_keeper_config::FixtureKeeperConfig;
use fixture_keeper_core::Credential;
use fixture_keeper_ledger::PendingCleanupLedger;
use fixture_keeper_runtime::FixtureAccounts;
use fixture_keeper_runtime::event_sink;
use fixture_keeper_runtime::write_summary;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Fixture account lifecycle operator tool.
#[derive(Parser, Debug)]
#[command(name = "fixture-keeper", version, disable_help_subcommand = true)]
struct Cli {
    /// Optional TOML config file; `FIXTURE_KEEPER_*` variables override it.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Command to run.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Delete every account recorded in the ledger.
    Sweep(SweepCommand),
    /// Print pending ledger entries.
    List,
    /// Drop ledger entries older than a threshold without contacting the service.
    Prune(PruneCommand),
}

/// Arguments for `sweep`.
#[derive(Args, Debug)]
struct SweepCommand {
    /// Write cleanup-summary.json and cleanup-summary.md into this directory.
    #[arg(long, value_name = "DIR")]
    summary_dir: Option<PathBuf>,
}

/// Arguments for `prune`.
#[derive(Args, Debug)]
struct PruneCommand {
    /// Age threshold in hours.
    #[arg(long = "older-than-hours", value_name = "HOURS")]
    older_than_hours: u64,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a display message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the command dispatcher.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = FixtureKeeperConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    match cli.command {
        Commands::Sweep(command) => command_sweep(&config, command).await,
        Commands::List => command_list(&config),
        Commands::Prune(command) => command_prune(&config, &command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Sweeps the ledger with an empty registry.
async fn command_sweep(config: &FixtureKeeperConfig, command: SweepCommand) -> CliResult<ExitCode> {
    let fixtures =
        FixtureAccounts::from_config(config).map_err(|err| CliError::new(err.to_string()))?;
    let summary = fixtures.sweep().await;
    if let Some(dir) = &command.summary_dir {
        write_summary(dir, &summary).map_err(|err| {
            CliError::new(format!("failed to write summary to {}: {err}", dir.display()))
        })?;
    }
    let value =
        serde_json::to_value(&summary).map_err(|err| CliError::new(err.to_string()))?;
    write_json(&value)?;
    Ok(if summary.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Prints pending entries.
fn command_list(config: &FixtureKeeperConfig) -> CliResult<ExitCode> {
    let ledger = open_ledger(config)?;
    write_json(&pending_listing(&ledger.read_all()))?;
    Ok(ExitCode::SUCCESS)
}

/// Removes entries older than the threshold.
fn command_prune(config: &FixtureKeeperConfig, command: &PruneCommand) -> CliResult<ExitCode> {
    let ledger = open_ledger(config)?;
    let cutoff = prune_cutoff(OffsetDateTime::now_utc(), command.older_than_hours)?;
    let pruned = ledger.prune_older_than(cutoff).map_err(|err| CliError::new(err.to_string()))?;
    write_json(&json!({
        "cutoff": format_time(cutoff),
        "pruned": pruned.iter().map(Credential::identifier).collect::<Vec<_>>(),
    }))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn open_ledger(config: &FixtureKeeperConfig) -> CliResult<PendingCleanupLedger> {
    let events = event_sink(&config.events).map_err(|err| CliError::new(err.to_string()))?;
    Ok(PendingCleanupLedger::open(config.ledger.path.clone(), events))
}

/// Renders entries without their secrets.
fn pending_listing(entries: &[Credential]) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|entry| {
                json!({
                    "identifier": entry.identifier(),
                    "createdAt": format_time(entry.created_at()),
                })
            })
            .collect(),
    )
}

/// Computes `now - hours`, rejecting thresholds that underflow the calendar.
fn prune_cutoff(now: OffsetDateTime, hours: u64) -> CliResult<OffsetDateTime> {
    let age = hours
        .checked_mul(3_600)
        .map(Duration::from_secs)
        .and_then(|age| time::Duration::try_from(age).ok())
        .and_then(|age| now.checked_sub(age));
    age.ok_or_else(|| CliError::new(format!("--older-than-hours {hours} is out of range")))
}

fn format_time(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Writes pretty JSON plus a newline to stdout.
fn write_json(value: &Value) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|err| CliError::new(err.to_string()))?;
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{text}")
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
