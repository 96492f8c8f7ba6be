//! `verger-recon`: multi-source species reconciliation.
//!
//! Loads rows through `verger-io`, resolves each to a stored species,
//! merges fields and zones under a per-run policy and writes through the
//! repository traits of `verger-core`. No CLI or network dependencies: the
//! registry detail fetcher is injected.

pub mod aliases;
pub mod error;
pub mod identity;
pub mod merge;
pub mod orchestrator;
pub mod parse;
pub mod report;
pub mod source;
pub mod sources;

pub use error::{IdentityError, ImportError, RowError};
pub use identity::{normalize_scientific_name, IdentityInput, IdentityMatcher, Match, Resolution};
pub use merge::{
    apply_fields, merge_zone, primary_source, replace_provenance, MergeMode, SOURCE_HYDRO_QUEBEC,
    SOURCE_PFAF, SOURCE_SEED_CATALOG,
};
pub use orchestrator::{ImportOptions, ImportOrchestrator};
pub use report::{IdentityHint, ImportReport, SeedLotSummary};
pub use source::{ExtractedFields, FieldExtractor, ImportSource, PersistContext, RecordClassifier};
pub use sources::{DetailFetcher, HydroQuebecSource, PfafSource, SeedCatalogSource};
pub use verger_io::normalize_key;
