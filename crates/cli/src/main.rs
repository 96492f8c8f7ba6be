// Verger CLI - species catalog imports and lookups

mod exit_codes;
mod import;
mod registry;
mod species;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use verger_config::{ConfigError, Settings};
use verger_core::StoreError;
use verger_io::LoadError;

use exit_codes::{
    EXIT_CONFIG, EXIT_FETCH, EXIT_FORMAT, EXIT_NOT_FOUND, EXIT_PARSE, EXIT_STORAGE, EXIT_SUCCESS,
    EXIT_USAGE,
};
use import::ImportCommands;

/// Log filter variable, e.g. `VERGER_LOG=debug` or `VERGER_LOG=verger_recon=debug`.
const LOG_ENV: &str = "VERGER_LOG";

#[derive(Parser)]
#[command(name = "verger")]
#[command(about = "Species catalog: multi-source imports, seed lots, lookups")]
#[command(version)]
struct Cli {
    /// Print a JSON document on stdout instead of the human summary
    #[arg(long, global = true)]
    json: bool,

    /// SQLite catalog [default: from config, else the platform data directory]
    #[arg(long, global = true, env = "VERGER_DATABASE", value_name = "PATH")]
    database: Option<PathBuf>,

    /// Settings file [default: <config dir>/verger/config.toml]
    #[arg(long, global = true, env = "VERGER_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a data source into the catalog
    #[command(subcommand)]
    Import(ImportCommands),

    /// List the normalized columns of a source file
    #[command(after_help = "\
Examples:
  verger columns plants.csv
  verger columns pfaf.sqlite --table species_data --json")]
    Columns {
        /// JSON, CSV or SQLite file
        file: PathBuf,

        /// Table to read from SQLite files [default: from config, plant_data]
        #[arg(long)]
        table: Option<String>,
    },

    /// Look up species in the catalog
    #[command(subcommand)]
    Species(SpeciesCommands),
}

#[derive(Subcommand)]
enum SpeciesCommands {
    /// Show a species with its zones, sources and seed lots
    Show {
        /// Scientific or common name (cultivar quotes and case are ignored)
        name: String,
    },
}

/// Resolved global options shared by every command.
pub struct Globals {
    pub json: bool,
    pub settings: Settings,
    pub database: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable. `log` records
/// from the library crates are bridged into the same subscriber.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load(cli.config.as_deref())?;
    let database = cli.database.unwrap_or_else(|| settings.database_path());
    tracing::debug!("catalog database: {}", database.display());

    let globals = Globals { json: cli.json, settings, database };

    match cli.command {
        Commands::Import(command) => import::cmd_import(&globals, command),
        Commands::Columns { file, table } => species::cmd_columns(&globals, file, table),
        Commands::Species(SpeciesCommands::Show { name }) => {
            species::cmd_species_show(&globals, &name)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self { code: EXIT_FORMAT, message: msg.into(), hint: None }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_STORAGE, message: msg.into(), hint: None }
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self { code: EXIT_FETCH, message: msg.into(), hint: None }
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        let code = match &err {
            LoadError::NotFound(_) => EXIT_NOT_FOUND,
            LoadError::Parse(_) => EXIT_PARSE,
            LoadError::Format(_) => EXIT_FORMAT,
        };
        let hint = match &err {
            LoadError::Format(msg) if msg.starts_with("table ") => {
                Some("pick the table with --table".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self { code: EXIT_CONFIG, message: err.to_string(), hint: None }
    }
}
