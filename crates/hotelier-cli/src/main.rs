// crates/hotelier-cli/src/main.rs
// ============================================================================
// Module: Hotelier CLI Entry Point
// Description: Command dispatcher for the Hotelier authorization service.
// Purpose: Serve the HTTP API and run offline store administration.
// Dependencies: clap, hotelier-config, hotelier-server, hotelier-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! `hotelier serve` runs the HTTP API, `config check` validates a config
//! file, `access explain` replays one authorization decision against a
//! `SQLite` store, and `bootstrap-admin` seeds the first administrator.
//! Command results are printed to stdout as JSON; failures go to stderr with
//! a non-zero exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use hotelier_cli::admin::bootstrap_admin;
use hotelier_cli::admin::explain_access;
use hotelier_config::HotelierConfig;
use hotelier_core::Action;
use hotelier_core::Module;
use hotelier_core::ResourceId;
use hotelier_core::UserId;
use hotelier_server::HotelierServer;
use hotelier_store_sqlite::SqliteAccessStore;
use hotelier_store_sqlite::SqliteStoreConfig;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "hotelier", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Access inspection utilities.
    Access {
        /// Selected access subcommand.
        #[command(subcommand)]
        command: AccessCommand,
    },
    /// Create the administrator role and user in a `SQLite` store.
    BootstrapAdmin(BootstrapAdminCommand),
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to hotelier.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file.
    Check(ConfigCheckCommand),
}

/// Arguments for `config check`.
#[derive(Args, Debug)]
struct ConfigCheckCommand {
    /// Optional config file path (defaults to hotelier.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Access subcommands.
#[derive(Subcommand, Debug)]
enum AccessCommand {
    /// Explain one authorization decision.
    Explain(AccessExplainCommand),
}

/// Arguments for `access explain`.
#[derive(Args, Debug)]
struct AccessExplainCommand {
    /// `SQLite` store path.
    #[arg(long, value_name = "PATH")]
    store: PathBuf,
    /// User to evaluate.
    #[arg(long, value_name = "USER_ID")]
    user: String,
    /// Module label (for example `property` or `bank_details`).
    #[arg(long, value_name = "MODULE", value_parser = parse_module)]
    module: Module,
    /// Action label: `create`, `read`, `update`, or `delete`.
    #[arg(long, value_name = "ACTION", value_parser = parse_action)]
    action: Action,
    /// Optional resource to check against the accessible-id-set.
    #[arg(long, value_name = "RESOURCE_ID")]
    resource: Option<String>,
}

/// Arguments for `bootstrap-admin`.
#[derive(Args, Debug)]
struct BootstrapAdminCommand {
    /// `SQLite` store path (created when missing).
    #[arg(long, value_name = "PATH")]
    store: PathBuf,
    /// Administrator user identifier.
    #[arg(long, value_name = "USER_ID")]
    user: String,
}

/// CLI error wrapper for user-facing failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
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
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command: ConfigCommand::Check(command),
        } => command_config_check(&command),
        Commands::Access {
            command: AccessCommand::Explain(command),
        } => command_access_explain(command),
        Commands::BootstrapAdmin(command) => command_bootstrap_admin(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = HotelierConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let server = tokio::task::spawn_blocking(move || HotelierServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config check`.
fn command_config_check(command: &ConfigCheckCommand) -> CliResult<ExitCode> {
    let _config = HotelierConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `access explain`.
fn command_access_explain(command: AccessExplainCommand) -> CliResult<ExitCode> {
    if !command.store.is_file() {
        return Err(CliError::new(format!("store not found: {}", command.store.display())));
    }
    let store = open_store(&command.store)?;
    let user_id = UserId::new(command.user);
    let resource_id = command.resource.map(ResourceId::new);
    let explanation =
        explain_access(store, &user_id, command.module, command.action, resource_id.as_ref())
            .map_err(|err| CliError::new(format!("access explain failed: {err}")))?;
    write_json(&explanation)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `bootstrap-admin`.
fn command_bootstrap_admin(command: &BootstrapAdminCommand) -> CliResult<ExitCode> {
    if command.user.trim().is_empty() {
        return Err(CliError::new("--user must be non-empty".to_string()));
    }
    let store = open_store(&command.store)?;
    let outcome = bootstrap_admin(&store, &UserId::new(command.user.clone()))
        .map_err(|err| CliError::new(format!("bootstrap failed: {err}")))?;
    write_json(&outcome)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a module label for clap.
fn parse_module(label: &str) -> Result<Module, String> {
    Module::parse(label).ok_or_else(|| {
        let known: Vec<&str> = Module::ALL.iter().map(|module| module.as_str()).collect();
        format!("unknown module {label}; expected one of {}", known.join(", "))
    })
}

/// Parses an action label for clap.
fn parse_action(label: &str) -> Result<Action, String> {
    Action::parse(label).ok_or_else(|| format!("unknown action {label}"))
}

/// Opens a `SQLite` store with default pragmas.
fn open_store(path: &Path) -> CliResult<SqliteAccessStore> {
    SqliteAccessStore::new(&SqliteStoreConfig::for_path(path))
        .map_err(|err| CliError::new(format!("failed to open store: {err}")))
}

/// Writes `value` as pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render output: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
