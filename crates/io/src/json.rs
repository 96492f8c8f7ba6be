// JSON import

use std::path::Path;

use serde_json::{Map, Value};
use verger_core::{Row, ScalarValue};

use crate::error::LoadError;
use crate::keys::normalize_key;

/// Load a top-level array of objects. A single object is read as one row.
pub fn load(path: &Path) -> Result<Vec<Row>, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::Parse(e.to_string()))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| LoadError::Parse(format!("{}: not valid UTF-8 ({e})", path.display())))?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<Vec<Row>, LoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let root: Value = serde_json::from_str(text).map_err(|e| LoadError::Parse(e.to_string()))?;

    match root {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(obj) => Ok(row_from_object(obj)),
                other => Err(LoadError::Format(format!(
                    "element {idx} is {}, expected an object",
                    kind(&other)
                ))),
            })
            .collect(),
        Value::Object(obj) => Ok(vec![row_from_object(obj)]),
        other => Err(LoadError::Format(format!(
            "top-level JSON is {}, expected an array of objects",
            kind(&other)
        ))),
    }
}

fn row_from_object(obj: Map<String, Value>) -> Row {
    obj.into_iter()
        .map(|(k, v)| (normalize_key(&k), ScalarValue::from_json(v)))
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_objects() {
        let rows = parse(r#"[{"nomLatin": "Malus 'Dolgo'", "hauteur": 8}, {"nomLatin": null}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["nomlatin"].as_str(), Some("Malus 'Dolgo'"));
        assert_eq!(rows[0]["hauteur"].as_f64(), Some(8.0));
        assert!(rows[1]["nomlatin"].is_null());
    }

    #[test]
    fn single_object_is_one_row() {
        let rows = parse(r#"{"Latin Name": "Corylus avellana"}"#).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["latin_name"].as_str(), Some("Corylus avellana"));
    }

    #[test]
    fn nested_values_become_json_text() {
        let rows = parse(r#"[{"formes": ["Grand arbre"], "meta": {"a": 1}}]"#).unwrap();
        assert_eq!(rows[0]["formes"].as_str(), Some(r#"["Grand arbre"]"#));
        assert_eq!(rows[0]["meta"].as_str(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn scalar_root_is_format_error() {
        assert!(matches!(parse("42"), Err(LoadError::Format(_))));
        assert!(matches!(parse(r#"["a", "b"]"#), Err(LoadError::Format(_))));
    }

    #[test]
    fn malformed_is_parse_error() {
        assert!(matches!(parse("[{"), Err(LoadError::Parse(_))));
    }

    #[test]
    fn leading_bom_is_ignored() {
        let rows = parse("\u{feff}[{\"a\": 1}]").unwrap();
        assert_eq!(rows.len(), 1);
    }
}
