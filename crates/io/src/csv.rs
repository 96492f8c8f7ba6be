// CSV/TSV import

use std::io::Read;
use std::path::Path;

use verger_core::{Row, ScalarValue};

use crate::error::LoadError;
use crate::keys::normalize_key;

/// Bytes inspected when guessing the delimiter.
const SNIFF_BYTES: usize = 4096;

pub fn load(path: &Path) -> Result<Vec<Row>, LoadError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    parse(&content, delimiter)
}

/// Pick the field delimiter from the head of the file.
///
/// Comma wins if one appears in the sample, then semicolon, else tab.
fn sniff_delimiter(content: &str) -> u8 {
    let bytes = content.as_bytes();
    let sample = &bytes[..bytes.len().min(SNIFF_BYTES)];
    if sample.contains(&b',') {
        b','
    } else if sample.contains(&b';') {
        b';'
    } else {
        b'\t'
    }
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, LoadError> {
    let mut file = std::fs::File::open(path).map_err(|e| LoadError::Parse(e.to_string()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| LoadError::Parse(e.to_string()))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            log::debug!("{}: not UTF-8, decoded as Windows-1252", path.display());
            Ok(decoded.into_owned())
        }
    }
}

/// Header row gives the keys. Short records get nulls for the missing
/// columns; extra trailing fields are dropped.
pub fn parse(content: &str, delimiter: u8) -> Result<Vec<Row>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Parse(e.to_string()))?
        .iter()
        .map(normalize_key)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LoadError::Parse(e.to_string()))?;
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(idx, key)| {
                let value = record
                    .get(idx)
                    .map(ScalarValue::from)
                    .unwrap_or(ScalarValue::Null);
                (key.clone(), value)
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Latin Name;Common Name\nMalus dolgo;Pommetier Dolgo\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Latin Name\tCommon Name\nMalus dolgo\tPommetier\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_comma_anywhere_in_sample_wins() {
        // A comma inside a description is enough to pick comma.
        let content = "Latin Name;Description\nMalus;Petit arbre, rustique\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_ignores_bytes_past_sample() {
        let mut content = "a;b\n".to_string();
        content.push_str(&"x;y\n".repeat(2000));
        content.push_str("late,comma\n");
        assert_eq!(sniff_delimiter(&content), b';');
    }

    #[test]
    fn test_headers_are_normalized() {
        let rows = parse("Latin Name,Common-Name,Height (m)\nCorylus avellana,Noisetier,6\n", b',').unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["latin_name"].as_str(), Some("Corylus avellana"));
        assert_eq!(rows[0]["common_name"].as_str(), Some("Noisetier"));
        assert_eq!(rows[0]["height_m"].as_str(), Some("6"));
    }

    #[test]
    fn test_short_record_gets_nulls() {
        let rows = parse("a,b,c\n1,2\n", b',').unwrap();
        assert_eq!(rows[0]["b"].as_str(), Some("2"));
        assert!(rows[0]["c"].is_null());
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        // "Érable" with É = 0xC9 in Windows-1252
        let mut bytes = b"nom;latin\n".to_vec();
        bytes.extend_from_slice(&[0xC9]);
        bytes.extend_from_slice(b"rable;Acer\n");
        fs::write(&path, bytes).unwrap();

        let rows = load(&path).unwrap();
        assert_eq!(rows[0]["nom"].as_str(), Some("Érable"));
        assert_eq!(rows[0]["latin"].as_str(), Some("Acer"));
    }

    #[test]
    fn test_semicolon_file_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seeds.csv");
        fs::write(&path, "Latin Name;Variety;Lot\nSolanum lycopersicum;Roma;L-22\n").unwrap();

        let rows = load(&path).unwrap();
        assert_eq!(rows[0]["variety"].as_str(), Some("Roma"));
        assert_eq!(rows[0]["lot"].as_str(), Some("L-22"));
    }
}
