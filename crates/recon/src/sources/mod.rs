//! Dataset vocabularies: alias use, value heuristics and classification.

pub mod hydroquebec;
pub mod pfaf;
pub mod seeds;

pub use hydroquebec::{DetailFetcher, HydroQuebecSource};
pub use pfaf::PfafSource;
pub use seeds::SeedCatalogSource;
