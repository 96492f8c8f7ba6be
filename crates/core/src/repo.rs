use std::fmt;

use crate::seed::SeedLot;
use crate::species::{SpeciesId, SpeciesRecord};

#[derive(Debug)]
pub enum StoreError {
    /// Update of a record that has no id or no longer exists.
    MissingRecord(String),
    /// Stored JSON column could not be (de)serialized.
    Serialization(String),
    /// Underlying database failure.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRecord(what) => write!(f, "record not found: {what}"),
            Self::Serialization(msg) => write!(f, "stored value error: {msg}"),
            Self::Backend(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Read access to the species identity space.
///
/// Every lookup that can return several rows returns the first one in
/// insertion order.
pub trait SpeciesQuery {
    fn species(&self, id: SpeciesId) -> Result<Option<SpeciesRecord>, StoreError>;

    /// Exact, case-insensitive match on scientific name.
    fn find_by_scientific_name(&self, name: &str) -> Result<Option<SpeciesRecord>, StoreError>;

    /// Exact, case-insensitive match on common name.
    fn find_by_common_name(&self, name: &str) -> Result<Option<SpeciesRecord>, StoreError>;

    /// All `(id, scientific_name)` pairs in insertion order.
    fn scientific_names(&self) -> Result<Vec<(SpeciesId, String)>, StoreError>;

    fn count_species(&self) -> Result<usize, StoreError>;
}

pub trait SpeciesRepository: SpeciesQuery {
    /// Persist a new record and return it with its id set.
    fn insert_species(&mut self, record: SpeciesRecord) -> Result<SpeciesRecord, StoreError>;

    fn update_species(&mut self, record: &SpeciesRecord) -> Result<(), StoreError>;
}

pub trait SeedLotRepository {
    fn find_seed_lot(
        &self,
        species: SpeciesId,
        variety: &str,
        lot_reference: &str,
    ) -> Result<Option<SeedLot>, StoreError>;

    fn insert_seed_lot(&mut self, lot: SeedLot) -> Result<SeedLot, StoreError>;

    fn update_seed_lot(&mut self, lot: &SeedLot) -> Result<(), StoreError>;

    fn seed_lots_for(&self, species: SpeciesId) -> Result<Vec<SeedLot>, StoreError>;
}
