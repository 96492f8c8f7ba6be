use serde::{Deserialize, Serialize};

/// One hardiness-zone claim, tagged with the source that made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneEntry {
    pub zone: String,
    pub source: String,
}

impl ZoneEntry {
    pub fn new(zone: impl Into<String>, source: impl Into<String>) -> Self {
        Self { zone: zone.into(), source: source.into() }
    }
}

/// Sort key for USDA-style zones: lower number = colder.
///
/// `"4a"` → `(4, 0)`, `"4b"` → `(4, 1)`, `"10"` → `(10, 0)`. Anything that
/// does not parse (blank, `"4-5"`, `"H4"`) sorts after every valid zone.
pub fn zone_order(zone: &str) -> (u32, u8) {
    const UNPARSED: (u32, u8) = (99, 0);

    let z = zone.trim();
    let digits_end = z.find(|c: char| !c.is_ascii_digit()).unwrap_or(z.len());
    if digits_end == 0 {
        return UNPARSED;
    }
    let Ok(number) = z[..digits_end].parse::<u32>() else {
        return UNPARSED;
    };
    match z[digits_end..].to_ascii_lowercase().as_str() {
        "" | "a" => (number, 0),
        "b" => (number, 1),
        _ => UNPARSED,
    }
}

/// The coldest (most conservative) zone across all sources, if any.
pub fn primary_zone(zones: &[ZoneEntry]) -> Option<&str> {
    zones
        .iter()
        .map(|z| z.zone.as_str())
        .filter(|z| !z.trim().is_empty())
        .min_by_key(|z| zone_order(z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_numeric_then_subzone() {
        assert!(zone_order("4a") < zone_order("4b"));
        assert!(zone_order("4b") < zone_order("5a"));
        assert!(zone_order("9b") < zone_order("10a"));
        assert_eq!(zone_order("4A"), (4, 0));
        assert_eq!(zone_order("3"), (3, 0));
    }

    #[test]
    fn unparsable_sorts_last() {
        assert_eq!(zone_order(""), (99, 0));
        assert_eq!(zone_order("H4"), (99, 0));
        assert_eq!(zone_order("4-5"), (99, 0));
        assert!(zone_order("11b") < zone_order("zone froide"));
    }

    #[test]
    fn primary_zone_is_coldest() {
        let zones = vec![ZoneEntry::new("5b", "B"), ZoneEntry::new("4a", "A")];
        assert_eq!(primary_zone(&zones), Some("4a"));
    }

    #[test]
    fn primary_zone_prefers_parsable_entries() {
        let zones = vec![ZoneEntry::new("rustique", "x"), ZoneEntry::new("6", "y")];
        assert_eq!(primary_zone(&zones), Some("6"));
        assert_eq!(primary_zone(&[]), None);
    }
}
