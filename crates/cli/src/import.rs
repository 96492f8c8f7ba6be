//! `verger import`: load a source file (or the registry) into the catalog.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use verger_core::{MemoryRepository, Row};
use verger_io::load_rows;
use verger_recon::sources::hydroquebec::enrich_from_registry;
use verger_recon::{
    HydroQuebecSource, ImportOptions, ImportOrchestrator, ImportReport, ImportSource, MergeMode,
    PfafSource, SeedCatalogSource,
};
use verger_store::SqliteRepository;

use crate::registry::RegistryClient;
use crate::{CliError, Globals};

#[derive(Subcommand)]
pub enum ImportCommands {
    /// Import trees and shrubs from the Hydro-Québec registry
    #[command(after_help = "\
Examples:
  verger import hydroquebec --limit 0
  verger import hydroquebec --file arbres.json --enrich-from-api
  verger import hydroquebec --file arbres.json --fetch-details --merge fill_gaps")]
    Hydroquebec(HydroQuebecArgs),

    /// Import a PFAF plant reference export (JSON, CSV or SQLite)
    #[command(after_help = "\
Examples:
  verger import pfaf --file plants.csv
  verger import pfaf --db pfaf.sqlite --table species_data
  verger import pfaf --file plants.json --merge overwrite --dry-run")]
    Pfaf(PfafArgs),

    /// Import a seed catalog (JSON or CSV) with its seed lots
    #[command(after_help = "\
Examples:
  verger import seeds --file semences.csv --supplier 'Semences du Portage'
  verger import seeds --file semences.csv --update-existing")]
    Seeds(SeedArgs),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MergeArg {
    /// Supplied fields replace stored values
    Overwrite,
    /// Only empty fields are written
    #[value(name = "fill_gaps", alias = "fill-gaps")]
    FillGaps,
}

impl From<MergeArg> for MergeMode {
    fn from(arg: MergeArg) -> Self {
        match arg {
            MergeArg::Overwrite => MergeMode::Overwrite,
            MergeArg::FillGaps => MergeMode::FillGaps,
        }
    }
}

#[derive(Args)]
pub struct HydroQuebecArgs {
    /// Registry listing saved locally (JSON). Omit to fetch from the API.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Fetch the detail sheet of records missing leaf/flower/fruit descriptions
    #[arg(long)]
    fetch_details: bool,

    /// With --file: fill empty fields from the complete API listing
    #[arg(long, requires = "file")]
    enrich_from_api: bool,

    /// Maximum rows to import, 0 = all [default: from config, 50]
    #[arg(long)]
    limit: Option<usize>,

    /// Merge policy [default: from config, overwrite]
    #[arg(long)]
    merge: Option<MergeArg>,

    /// Resolve and report without writing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
pub struct PfafArgs {
    /// JSON, CSV or SQLite export
    #[arg(long, conflicts_with = "db", required_unless_present = "db")]
    file: Option<PathBuf>,

    /// SQLite database (same as --file with a .db/.sqlite path)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Table to read from SQLite exports [default: from config, plant_data]
    #[arg(long)]
    table: Option<String>,

    /// Maximum rows to import, 0 = all
    #[arg(long, default_value_t = 0)]
    limit: usize,

    /// Merge policy [default: from config, fill_gaps]
    #[arg(long)]
    merge: Option<MergeArg>,

    /// Resolve and report without writing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
pub struct SeedArgs {
    /// Seed catalog (JSON or CSV)
    #[arg(long)]
    file: PathBuf,

    /// Supplier recorded on every lot
    #[arg(long)]
    supplier: Option<String>,

    /// Refresh lots already in the catalog instead of skipping them
    #[arg(long)]
    update_existing: bool,

    /// Maximum rows to import, 0 = all
    #[arg(long, default_value_t = 0)]
    limit: usize,

    /// Merge policy for species fields [default: from config, fill_gaps]
    #[arg(long)]
    merge: Option<MergeArg>,

    /// Resolve and report without writing
    #[arg(long)]
    dry_run: bool,
}

pub fn cmd_import(globals: &Globals, command: ImportCommands) -> Result<(), CliError> {
    let report = match command {
        ImportCommands::Hydroquebec(args) => import_hydroquebec(globals, args)?,
        ImportCommands::Pfaf(args) => import_pfaf(globals, args)?,
        ImportCommands::Seeds(args) => import_seeds(globals, args)?,
    };
    emit_report(&report, globals.json)
}

fn import_hydroquebec(globals: &Globals, args: HydroQuebecArgs) -> Result<ImportReport, CliError> {
    let settings = &globals.settings.hydroquebec;
    let merge = args.merge.map(MergeMode::from).unwrap_or(settings.merge);
    let limit = args.limit.unwrap_or(settings.limit);

    let needs_client = args.file.is_none() || args.fetch_details || args.enrich_from_api;
    let client = if needs_client { Some(RegistryClient::new(settings)?) } else { None };

    let rows = match (&args.file, &client) {
        (Some(path), _) => {
            let mut rows = load_rows(path, &HydroQuebecSource::new().load_options())?;
            if let (true, Some(client)) = (args.enrich_from_api, &client) {
                match client.fetch_all(0) {
                    Ok(registry) => {
                        let merged = enrich_from_registry(&mut rows, &registry);
                        tracing::info!("enriched {merged} description fields from the registry");
                    }
                    Err(e) => tracing::warn!(
                        "registry enrichment failed, importing the file alone: {}",
                        e.message
                    ),
                }
            }
            rows
        }
        (None, Some(client)) => client.fetch_all(limit)?,
        (None, None) => Vec::new(),
    };

    let source = match client {
        Some(client) if args.fetch_details => HydroQuebecSource::with_detail_fetcher(Box::new(client)),
        _ => HydroQuebecSource::new(),
    };
    let mut orchestrator = ImportOrchestrator::new(source);
    let report = run(globals, &mut orchestrator, rows, merge, limit, args.dry_run)?;

    let merged = orchestrator.source().details_merged();
    if merged > 0 {
        tracing::info!("{merged} description fields completed from detail sheets");
    }
    Ok(report)
}

fn import_pfaf(globals: &Globals, args: PfafArgs) -> Result<ImportReport, CliError> {
    let settings = &globals.settings.pfaf;
    let merge = args.merge.map(MergeMode::from).unwrap_or(settings.merge);
    let table = args.table.unwrap_or_else(|| settings.table.clone());
    let path = args
        .file
        .or(args.db)
        .ok_or_else(|| CliError::args("pass --file or --db"))?;

    let mut orchestrator = ImportOrchestrator::new(PfafSource::new(table));
    let rows = load_rows(&path, &orchestrator.source().load_options())?;
    run(globals, &mut orchestrator, rows, merge, args.limit, args.dry_run)
}

fn import_seeds(globals: &Globals, args: SeedArgs) -> Result<ImportReport, CliError> {
    let merge = args
        .merge
        .map(MergeMode::from)
        .unwrap_or(globals.settings.seeds.merge);

    let mut orchestrator =
        ImportOrchestrator::new(SeedCatalogSource::new(args.supplier, args.update_existing));
    let rows = load_rows(&args.file, &orchestrator.source().load_options())?;
    run(globals, &mut orchestrator, rows, merge, args.limit, args.dry_run)
}

/// Run against the configured database. A dry run with no database yet
/// resolves against an empty in-memory catalog rather than creating one.
fn run<S: ImportSource>(
    globals: &Globals,
    orchestrator: &mut ImportOrchestrator<S>,
    rows: Vec<Row>,
    merge: MergeMode,
    limit: usize,
    dry_run: bool,
) -> Result<ImportReport, CliError> {
    let import = &globals.settings.import;
    let options = ImportOptions {
        dry_run,
        error_sample_limit: import.error_sample_limit,
        empty_identity_sample_limit: import.empty_identity_sample_limit,
    };

    if dry_run && !globals.database.exists() {
        tracing::info!(
            "{} does not exist, dry run resolves against an empty catalog",
            globals.database.display()
        );
        let mut repo = MemoryRepository::new();
        return Ok(orchestrator.import_rows(&mut repo, rows, merge, limit, &options));
    }

    let mut repo = SqliteRepository::open(&globals.database)?;
    Ok(orchestrator.import_rows(&mut repo, rows, merge, limit, &options))
}

fn emit_report(report: &ImportReport, json: bool) -> Result<(), CliError> {
    if json {
        let text = serde_json::to_string_pretty(report)
            .map_err(|e| CliError::format(format!("cannot serialize report: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    eprintln!("{report}");
    for sample in &report.error_samples {
        eprintln!("  error: {sample}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_arg_maps_to_mode() {
        assert_eq!(MergeMode::from(MergeArg::Overwrite), MergeMode::Overwrite);
        assert_eq!(MergeMode::from(MergeArg::FillGaps), MergeMode::FillGaps);
    }

    #[test]
    fn fill_gaps_accepts_both_spellings() {
        assert!(matches!(MergeArg::from_str("fill_gaps", false), Ok(MergeArg::FillGaps)));
        assert!(matches!(MergeArg::from_str("fill-gaps", false), Ok(MergeArg::FillGaps)));
    }
}
