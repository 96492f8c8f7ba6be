use std::sync::OnceLock;

use regex::Regex;

static SEPARATORS: OnceLock<Regex> = OnceLock::new();
static PUNCTUATION: OnceLock<Regex> = OnceLock::new();

/// Canonical snake_case form of a column label.
///
/// `"Latin Name"` → `latin_name`, `"nomLatin"` → `nomlatin`,
/// `"Hardiness-Zone (USDA)"` → `hardiness_zone_usda`.
pub fn normalize_key(label: &str) -> String {
    let separators = SEPARATORS.get_or_init(|| Regex::new(r"[\s\-]+").unwrap());
    let punctuation = PUNCTUATION.get_or_init(|| Regex::new(r"[^\w]").unwrap());

    let s = separators.replace_all(label.trim(), "_");
    let s = punctuation.replace_all(&s, "");
    s.to_lowercase().trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_and_hyphens_become_underscores() {
        assert_eq!(normalize_key("Latin Name"), "latin_name");
        assert_eq!(normalize_key("  common -  name "), "common_name");
    }

    #[test]
    fn camel_case_is_flattened() {
        assert_eq!(normalize_key("nomLatin"), "nomlatin");
        assert_eq!(normalize_key("zoneRusticite"), "zonerusticite");
    }

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(normalize_key("Height (m)"), "height_m");
        assert_eq!(normalize_key("__id__"), "id");
        assert_eq!(normalize_key("Known.Hazards?"), "knownhazards");
    }

    #[test]
    fn accented_letters_survive() {
        assert_eq!(normalize_key("Variété"), "variété");
    }

    #[test]
    fn empty_label() {
        assert_eq!(normalize_key("   "), "");
    }
}
