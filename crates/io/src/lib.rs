//! `verger-io`: turns dataset files into normalized import rows.
//!
//! Format is picked by extension. Every loader normalizes column names with
//! [`normalize_key`] and coerces values to [`verger_core::ScalarValue`], so downstream code
//! never sees raw JSON, CSV records or SQLite types.

pub mod columns;
pub mod csv;
pub mod error;
pub mod json;
pub mod keys;
pub mod sqlite;

use std::path::Path;

use verger_core::Row;

pub use columns::{available_columns, suggest_identity_columns, IdentityCandidates};
pub use error::LoadError;
pub use keys::normalize_key;

/// Default table read from SQLite datasets (pfaf-data layout).
pub const DEFAULT_TABLE: &str = "plant_data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    /// Comma, semicolon or tab separated text.
    Delimited,
    Sqlite,
}

impl Format {
    pub const ALL: &'static [Format] = &[Format::Json, Format::Delimited, Format::Sqlite];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" | "txt" => Some(Self::Delimited),
            "sqlite" | "sqlite3" | "db" => Some(Self::Sqlite),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Json => ".json",
            Self::Delimited => ".csv",
            Self::Sqlite => ".sqlite/.db",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// SQLite table to read.
    pub table: String,
    /// Formats this caller accepts.
    pub formats: Vec<Format>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            formats: Format::ALL.to_vec(),
        }
    }
}

impl LoadOptions {
    pub fn with_table(table: impl Into<String>) -> Self {
        Self { table: table.into(), ..Self::default() }
    }

    /// JSON and delimited text only (seed catalogs).
    pub fn text_only() -> Self {
        Self {
            formats: vec![Format::Json, Format::Delimited],
            ..Self::default()
        }
    }

    fn accepted_list(&self) -> String {
        let labels: Vec<&str> = self.formats.iter().map(Format::label).collect();
        labels.join(", ")
    }
}

/// Load every row of `path`.
pub fn load_rows(path: &Path, options: &LoadOptions) -> Result<Vec<Row>, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    let format = Format::from_extension(&ext)
        .filter(|f| options.formats.contains(f))
        .ok_or_else(|| {
            LoadError::Format(format!(
                "unsupported format '.{ext}': use {}",
                options.accepted_list()
            ))
        })?;

    let rows = match format {
        Format::Json => json::load(path)?,
        Format::Delimited => self::csv::load(path)?,
        Format::Sqlite => sqlite::load(path, &options.table)?,
    };
    log::debug!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load_rows(&dir.path().join("absent.json"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn unknown_extension_is_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plants.xlsx");
        fs::write(&path, "x").unwrap();
        let err = load_rows(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Format(_)));
    }

    #[test]
    fn text_only_rejects_sqlite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seeds.db");
        fs::write(&path, "").unwrap();
        let err = load_rows(&path, &LoadOptions::text_only()).unwrap_err();
        match err {
            LoadError::Format(msg) => {
                assert!(msg.contains(".json"));
                assert!(!msg.contains(".sqlite"));
            }
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("PLANTS.CSV");
        fs::write(&path, "Latin Name,Common Name\nMalus dolgo,Dolgo\n").unwrap();
        let rows = load_rows(&path, &LoadOptions::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["latin_name"].as_str(), Some("Malus dolgo"));
    }
}
