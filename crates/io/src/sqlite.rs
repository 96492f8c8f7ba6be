// SQLite table import

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use verger_core::{Row, ScalarValue};

use crate::error::LoadError;
use crate::keys::normalize_key;

static TABLE_NAME: OnceLock<Regex> = OnceLock::new();

fn check_table_name(table: &str) -> Result<(), LoadError> {
    let re = TABLE_NAME.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
    if re.is_match(table) {
        Ok(())
    } else {
        Err(LoadError::Format(format!("invalid table name: '{table}'")))
    }
}

/// Read every row of `table`. The name is validated before it reaches SQL.
pub fn load(path: &Path, table: &str) -> Result<Vec<Row>, LoadError> {
    check_table_name(table)?;

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| LoadError::Parse(e.to_string()))?;

    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
            [table],
            |r| r.get(0),
        )
        .map_err(|e| LoadError::Parse(e.to_string()))?;
    if !exists {
        return Err(LoadError::Format(format!(
            "table '{table}' not found in {}",
            path.display()
        )));
    }

    let mut stmt = conn
        .prepare(&format!("SELECT * FROM \"{table}\""))
        .map_err(|e| LoadError::Parse(e.to_string()))?;
    let keys: Vec<String> = stmt.column_names().iter().map(|c| normalize_key(c)).collect();

    let mut rows = Vec::new();
    let mut cursor = stmt.query([]).map_err(|e| LoadError::Parse(e.to_string()))?;
    while let Some(record) = cursor.next().map_err(|e| LoadError::Parse(e.to_string()))? {
        let mut row = Row::new();
        for (idx, key) in keys.iter().enumerate() {
            let value = record
                .get_ref(idx)
                .map_err(|e| LoadError::Parse(e.to_string()))?;
            row.insert(key.clone(), scalar_from_sql(value));
        }
        rows.push(row);
    }
    Ok(rows)
}

fn scalar_from_sql(value: ValueRef<'_>) -> ScalarValue {
    match value {
        ValueRef::Null => ScalarValue::Null,
        ValueRef::Integer(i) => ScalarValue::from(i),
        ValueRef::Real(f) => ScalarValue::from_f64(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            ScalarValue::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pfaf_db(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("data.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE plant_data (
                "Latin name" TEXT, "Common name" TEXT, "Hardiness" INTEGER,
                "Height" REAL, "Picture" BLOB, "Notes" TEXT
            );
            INSERT INTO plant_data VALUES ('Corylus avellana', 'Hazel', 4, 6.5, X'6869', NULL);
            "#,
        )
        .unwrap();
        path
    }

    #[test]
    fn reads_table_with_normalized_columns() {
        let dir = tempdir().unwrap();
        let path = pfaf_db(dir.path());
        let rows = load(&path, "plant_data").unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["latin_name"].as_str(), Some("Corylus avellana"));
        assert_eq!(row["hardiness"].to_text().as_deref(), Some("4"));
        assert_eq!(row["height"].as_f64(), Some(6.5));
        assert_eq!(row["picture"].as_str(), Some("hi"));
        assert!(row["notes"].is_null());
    }

    #[test]
    fn rejects_injected_table_name() {
        let dir = tempdir().unwrap();
        let path = pfaf_db(dir.path());
        let err = load(&path, "plant_data; DROP TABLE plant_data").unwrap_err();
        assert!(matches!(err, LoadError::Format(_)));
        assert!(matches!(load(&path, "1plants"), Err(LoadError::Format(_))));
    }

    #[test]
    fn missing_table_is_format_error() {
        let dir = tempdir().unwrap();
        let path = pfaf_db(dir.path());
        assert!(matches!(load(&path, "species"), Err(LoadError::Format(_))));
    }
}
