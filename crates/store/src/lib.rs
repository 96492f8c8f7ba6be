//! `verger-store`: SQLite persistence for species records and seed lots.

mod repository;
pub mod schema;

pub use repository::SqliteRepository;
