//! Tolerant parsers for supplier-entered values.

use chrono::NaiveDate;
use verger_core::{ScalarValue, SeedUnit, StratificationKind};

/// Float from a number or text; accepts comma decimals and a trailing `%`.
pub fn parse_float(value: Option<&ScalarValue>) -> Option<f64> {
    match value? {
        ScalarValue::Number(n) => n.as_f64(),
        ScalarValue::String(s) => {
            let s = s.trim().replace(',', ".");
            let s = s.strip_suffix('%').unwrap_or(&s).trim();
            s.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        ScalarValue::Null | ScalarValue::Bool(_) => None,
    }
}

/// Integer from a number or text; fractional parts are truncated.
pub fn parse_int(value: Option<&ScalarValue>) -> Option<i64> {
    match value? {
        ScalarValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        ScalarValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.replace(',', ".").parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        ScalarValue::Null | ScalarValue::Bool(_) => None,
    }
}

/// Integer, or the upper bound of a range: `"7-14"` → 14.
pub fn parse_int_or_range(value: Option<&ScalarValue>) -> Option<i64> {
    if let Some(ScalarValue::String(s)) = value {
        let s = s.trim();
        if !s.starts_with('-') {
            if let Some((lo, hi)) = s.split_once('-') {
                if let (Ok(a), Ok(b)) = (lo.trim().parse::<i64>(), hi.trim().parse::<i64>()) {
                    return Some(a.max(b));
                }
            }
        }
    }
    parse_int(value)
}

/// Yes/no in French or English, `x` checkmarks, positive counts.
pub fn parse_bool(value: Option<&ScalarValue>) -> bool {
    let text = match value {
        None | Some(ScalarValue::Null) => return false,
        Some(ScalarValue::Bool(b)) => return *b,
        Some(ScalarValue::Number(n)) => return n.as_f64().is_some_and(|f| f > 0.0),
        Some(ScalarValue::String(s)) => s.trim().to_lowercase(),
    };
    match text.as_str() {
        "y" | "yes" | "oui" | "o" | "1" | "true" | "x" | "required" => true,
        "n" | "no" | "non" | "0" | "false" | "" => false,
        other => other.parse::<i64>().map(|n| n > 0).unwrap_or(true),
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Harvest or packing date. A bare year means January 1st of that year.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = s.parse().ok()?;
        return if (1900..=2100).contains(&year) {
            NaiveDate::from_ymd_opt(year, 1, 1)
        } else {
            None
        };
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

pub fn parse_unit(text: &str) -> SeedUnit {
    match text.trim().to_lowercase().as_str() {
        "g" | "grammes" => SeedUnit::Grams,
        "ml" => SeedUnit::Millilitres,
        "sachet" | "s" => SeedUnit::Packet,
        _ => SeedUnit::Seeds,
    }
}

pub fn parse_stratification_kind(text: &str) -> Option<StratificationKind> {
    let v = text.to_lowercase();
    if v.is_empty() {
        return None;
    }
    if v.contains("froid") || v.contains("cold") {
        // "warm then cold" mentions both; the warm phase comes first.
        let warm_first = v.contains("chaud") || v.contains("warm");
        let sequenced = v.contains("puis") || v.contains("then") || v.contains("followed");
        if warm_first && sequenced {
            return Some(StratificationKind::WarmThenCold);
        }
        return Some(StratificationKind::Cold);
    }
    if v.contains("chaud") || v.contains("warm") || v.contains("hot") {
        if v.contains("puis") || v.contains("then") || v.contains("followed") {
            return Some(StratificationKind::WarmThenCold);
        }
        return Some(StratificationKind::Warm);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> ScalarValue {
        ScalarValue::from(v)
    }

    #[test]
    fn float_accepts_comma_and_percent() {
        assert_eq!(parse_float(Some(&s("2,5"))), Some(2.5));
        assert_eq!(parse_float(Some(&s(" 85 % "))), Some(85.0));
        assert_eq!(parse_float(Some(&ScalarValue::from(3i64))), Some(3.0));
        assert_eq!(parse_float(Some(&s("beaucoup"))), None);
        assert_eq!(parse_float(None), None);
    }

    #[test]
    fn int_or_range_takes_upper_bound() {
        assert_eq!(parse_int_or_range(Some(&s("7-14"))), Some(14));
        assert_eq!(parse_int_or_range(Some(&s("30 - 60"))), Some(60));
        assert_eq!(parse_int_or_range(Some(&s("21"))), Some(21));
        assert_eq!(parse_int_or_range(Some(&s("-5"))), Some(-5));
        assert_eq!(parse_int_or_range(Some(&s("10.7"))), Some(10));
    }

    #[test]
    fn bool_vocabulary() {
        for yes in ["oui", "Yes", "x", "required", "1", "3"] {
            assert!(parse_bool(Some(&s(yes))), "{yes}");
        }
        for no in ["non", "N", "0", "", "false"] {
            assert!(!parse_bool(Some(&s(no))), "{no}");
        }
        assert!(!parse_bool(None));
        assert!(parse_bool(Some(&s("60 jours au froid"))));
    }

    #[test]
    fn dates() {
        assert_eq!(parse_date("2021"), NaiveDate::from_ymd_opt(2021, 1, 1));
        assert_eq!(parse_date("2021-09-15"), NaiveDate::from_ymd_opt(2021, 9, 15));
        assert_eq!(parse_date("15/09/2021"), NaiveDate::from_ymd_opt(2021, 9, 15));
        assert_eq!(parse_date("2021/09/15"), NaiveDate::from_ymd_opt(2021, 9, 15));
        assert_eq!(parse_date("15-09-2021"), NaiveDate::from_ymd_opt(2021, 9, 15));
        assert_eq!(parse_date("1850"), None);
        assert_eq!(parse_date("automne"), None);
    }

    #[test]
    fn units() {
        assert_eq!(parse_unit("Grammes"), SeedUnit::Grams);
        assert_eq!(parse_unit("s"), SeedUnit::Packet);
        assert_eq!(parse_unit("seeds"), SeedUnit::Seeds);
        assert_eq!(parse_unit(""), SeedUnit::Seeds);
    }

    #[test]
    fn stratification_kinds() {
        assert_eq!(parse_stratification_kind("Froide"), Some(StratificationKind::Cold));
        assert_eq!(parse_stratification_kind("warm"), Some(StratificationKind::Warm));
        assert_eq!(
            parse_stratification_kind("warm then cold"),
            Some(StratificationKind::WarmThenCold)
        );
        assert_eq!(
            parse_stratification_kind("chaude puis froide"),
            Some(StratificationKind::WarmThenCold)
        );
        assert_eq!(parse_stratification_kind(""), None);
        assert_eq!(parse_stratification_kind("?"), None);
    }
}
