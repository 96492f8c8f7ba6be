//! Seams between the generic orchestrator and a dataset vocabulary.

use std::collections::BTreeMap;

use verger_core::{
    scalar_payload, FieldValue, OrganismType, Row, ScalarValue, SeedLotRepository, SpeciesField,
    SpeciesRecord, SpeciesRepository,
};
use verger_io::LoadOptions;

use crate::error::RowError;
use crate::identity::IdentityInput;
use crate::merge::MergeMode;
use crate::report::SeedLotSummary;

/// Everything a source derives from one row, apart from identity and
/// classification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    /// Written according to the run's merge mode.
    pub fields: Vec<(SpeciesField, FieldValue)>,
    /// Written only when the record is created.
    pub creation_defaults: Vec<(SpeciesField, FieldValue)>,
    /// This source's hardiness-zone claim. Blank means none.
    pub zone: String,
    /// `Some(true)` sets the flag; nothing ever clears it.
    pub nitrogen_fixer: Option<bool>,
}

pub trait FieldExtractor {
    fn identity(&self, row: &Row) -> IdentityInput;

    fn extract(&self, row: &Row) -> Result<ExtractedFields, RowError>;
}

pub trait RecordClassifier {
    fn classify(&self, row: &Row) -> OrganismType;
}

/// Per-run hook context handed to [`ImportSource::after_persist`].
pub struct PersistContext<'a> {
    pub record: &'a SpeciesRecord,
    pub row: &'a Row,
    pub created: bool,
}

/// A dataset the orchestrator can import.
pub trait ImportSource: FieldExtractor + RecordClassifier {
    /// Key used for zone entries and provenance.
    fn source_id(&self) -> &'static str;

    fn default_merge_mode(&self) -> MergeMode;

    fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
    }

    /// Whether the organism type follows the merge mode on existing records.
    /// When `false` it is only set on creation.
    fn classification_is_mergeable(&self) -> bool {
        false
    }

    /// Enrich a row before anything reads it.
    fn prepare_row(&mut self, row: Row) -> Row {
        row
    }

    /// Provenance block stored under [`ImportSource::source_id`].
    fn provenance(&self, row: &Row) -> BTreeMap<String, ScalarValue> {
        scalar_payload(row)
    }

    /// Runs after the species record is persisted.
    fn after_persist<R>(&mut self, _repo: &mut R, _ctx: PersistContext<'_>) -> Result<(), RowError>
    where
        R: SpeciesRepository + SeedLotRepository,
    {
        Ok(())
    }

    /// Seed lot counters, for sources that maintain lots.
    fn lot_summary(&self) -> Option<SeedLotSummary> {
        None
    }
}
