use std::collections::BTreeSet;

use verger_core::Row;

const SCIENTIFIC_HINTS: &[&str] = &["latin", "scientific", "species", "binomial"];
const COMMON_HINTS: &[&str] = &["common", "name", "vernacular", "english"];

/// Sorted union of keys across all rows.
pub fn available_columns(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .flat_map(|r| r.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Columns that look like they could hold an identity, for diagnostics when
/// the expected aliases are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityCandidates {
    pub scientific: Vec<String>,
    pub common: Vec<String>,
}

impl IdentityCandidates {
    pub fn is_empty(&self) -> bool {
        self.scientific.is_empty() && self.common.is_empty()
    }
}

pub fn suggest_identity_columns(columns: &[String]) -> IdentityCandidates {
    let matching = |hints: &[&str]| -> Vec<String> {
        columns
            .iter()
            .filter(|c| hints.iter().any(|h| c.contains(h)))
            .cloned()
            .collect()
    };
    IdentityCandidates {
        scientific: matching(SCIENTIFIC_HINTS),
        common: matching(COMMON_HINTS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verger_core::ScalarValue;

    fn row(keys: &[&str]) -> Row {
        keys.iter().map(|k| (k.to_string(), ScalarValue::Null)).collect()
    }

    #[test]
    fn union_is_sorted_and_deduplicated() {
        let rows = vec![row(&["zone", "latin"]), row(&["height", "latin"])];
        assert_eq!(available_columns(&rows), vec!["height", "latin", "zone"]);
        assert!(available_columns(&[]).is_empty());
    }

    #[test]
    fn suggests_by_substring() {
        let cols: Vec<String> = ["taxon_latin", "plant_name", "species_code", "zone"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let c = suggest_identity_columns(&cols);
        assert_eq!(c.scientific, vec!["taxon_latin", "species_code"]);
        assert_eq!(c.common, vec!["plant_name"]);
    }

    #[test]
    fn nothing_to_suggest() {
        let c = suggest_identity_columns(&["zone".to_string()]);
        assert!(c.is_empty());
    }
}
