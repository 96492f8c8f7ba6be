//! `verger-core`: shared types for the species catalog.
//!
//! Pure data crate: species records, scalar import rows, seed lots and the
//! repository traits the import pipeline is written against. No file or
//! database IO lives here; [`memory::MemoryRepository`] is the in-process
//! implementation used by tests, and [`staged::StagedRepository`] holds the
//! writes of a dry run.

pub mod memory;
pub mod repo;
pub mod scalar;
pub mod seed;
pub mod species;
pub mod staged;
pub mod zone;

pub use memory::MemoryRepository;
pub use repo::{SeedLotRepository, SpeciesQuery, SpeciesRepository, StoreError};
pub use scalar::{scalar_payload, Row, ScalarValue};
pub use seed::{SeedLot, SeedLotId, SeedUnit, StratificationKind};
pub use species::{
    FieldError, FieldValue, GrowthRate, Kingdom, OrganismType, SpeciesField, SpeciesId,
    SpeciesRecord, SunNeed, WaterNeed,
};
pub use staged::StagedRepository;
pub use zone::{primary_zone, zone_order, ZoneEntry};
