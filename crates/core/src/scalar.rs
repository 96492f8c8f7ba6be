use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// One normalized input record: canonical key → scalar value.
pub type Row = BTreeMap<String, ScalarValue>;

/// Closed set of values an import row may carry.
///
/// Nested JSON (arrays, objects) never travels past the loader: it is
/// coerced to its compact JSON text there. Source heuristics that need list
/// semantics read it back with [`ScalarValue::list_items`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Blank means null or a whitespace-only string. Zero and `false` are data.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Trimmed text form. `None` for null.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            other => Some(other.to_string().trim().to_string()),
        }
    }

    /// Items of a list-like value.
    ///
    /// A string holding a JSON array yields its elements (as text); any other
    /// non-blank value yields a single item.
    pub fn list_items(&self) -> Vec<String> {
        if self.is_blank() {
            return Vec::new();
        }
        if let Self::String(s) = self {
            let trimmed = s.trim();
            if trimmed.starts_with('[') {
                if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
                    return items
                        .into_iter()
                        .map(ScalarValue::from_json)
                        .filter(|v| !v.is_blank())
                        .filter_map(|v| v.to_text())
                        .collect();
                }
            }
        }
        self.to_text().into_iter().collect()
    }

    /// Coerce an arbitrary JSON value. Arrays and objects become their
    /// compact JSON text.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::String(nested.to_string()),
        }
    }

    pub fn from_f64(value: f64) -> Self {
        Number::from_f64(value).map(Self::Number).unwrap_or(Self::Null)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        Self::Number(Number::from(n))
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Drop null entries, keep everything else as-is. Used for provenance blocks.
pub fn scalar_payload(row: &Row) -> BTreeMap<String, ScalarValue> {
    row.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
