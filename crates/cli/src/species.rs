//! `verger species show` and `verger columns`.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::json;
use verger_core::{FieldValue, SeedLot, SeedLotRepository, SpeciesField, SpeciesRecord};
use verger_io::{available_columns, load_rows, suggest_identity_columns, LoadOptions};
use verger_recon::{primary_source, IdentityInput, IdentityMatcher, Match};
use verger_store::SqliteRepository;

use crate::exit_codes;
use crate::{CliError, Globals};

const SHOWN_FIELDS: &[SpeciesField] = &[
    SpeciesField::Family,
    SpeciesField::Kingdom,
    SpeciesField::OrganismType,
    SpeciesField::WaterNeed,
    SpeciesField::SunNeed,
    SpeciesField::SoilTextures,
    SpeciesField::SoilPh,
    SpeciesField::HeightMax,
    SpeciesField::WidthMax,
    SpeciesField::GrowthRate,
    SpeciesField::NitrogenFixer,
    SpeciesField::EdibleParts,
    SpeciesField::Toxicity,
    SpeciesField::OtherUses,
    SpeciesField::Description,
];

pub fn cmd_columns(globals: &Globals, file: PathBuf, table: Option<String>) -> Result<(), CliError> {
    let options = match table {
        Some(table) => LoadOptions::with_table(table),
        None => LoadOptions::with_table(globals.settings.pfaf.table.clone()),
    };
    let rows = load_rows(&file, &options)?;
    let columns = available_columns(&rows);
    let candidates = suggest_identity_columns(&columns);

    if globals.json {
        let value = json!({
            "file": file.display().to_string(),
            "rows": rows.len(),
            "columns": columns,
            "identity_candidates": {
                "scientific": candidates.scientific,
                "common": candidates.common,
            },
        });
        println!("{}", to_json(&value)?);
        return Ok(());
    }

    println!("{} ({} rows, {} columns)", file.display(), rows.len(), columns.len());
    for column in &columns {
        println!("  {column}");
    }
    if !candidates.scientific.is_empty() {
        println!("scientific name candidates: {}", candidates.scientific.join(", "));
    }
    if !candidates.common.is_empty() {
        println!("common name candidates: {}", candidates.common.join(", "));
    }
    Ok(())
}

pub fn cmd_species_show(globals: &Globals, name: &str) -> Result<(), CliError> {
    let repo = open_existing(&globals.database)?;
    let matcher = IdentityMatcher::new(&repo);
    let input = IdentityInput::new(name, name);

    let record = match matcher.find(&input) {
        Ok(Match::Found(record)) => record,
        Ok(Match::NotFound) => {
            return Err(CliError {
                code: exit_codes::EXIT_NOT_FOUND,
                message: format!("no species matches '{name}'"),
                hint: Some("try the scientific name, or import a source first".to_string()),
            })
        }
        Err(e) => return Err(CliError::storage(e.to_string())),
    };

    let lots = match record.id {
        Some(id) => repo.seed_lots_for(id)?,
        None => Vec::new(),
    };

    if globals.json {
        let value = json!({
            "species": record,
            "primary_zone": record.primary_zone(),
            "seed_lots": lots,
        });
        println!("{}", to_json(&value)?);
    } else {
        print_species(&record, &lots);
    }
    Ok(())
}

fn open_existing(path: &Path) -> Result<SqliteRepository, CliError> {
    if !path.exists() {
        return Err(CliError {
            code: exit_codes::EXIT_NOT_FOUND,
            message: format!("database not found: {}", path.display()),
            hint: Some("run `verger import` first or pass --database".to_string()),
        });
    }
    Ok(SqliteRepository::open(path)?)
}

fn print_species(record: &SpeciesRecord, lots: &[SeedLot]) {
    println!("{}", record.display_name());

    if !record.hardiness_zones.is_empty() {
        let zones: Vec<String> = record
            .hardiness_zones
            .iter()
            .map(|z| format!("{} ({})", z.zone, z.source))
            .collect();
        println!("  {:<16} {}", "hardiness_zones", zones.join(", "));
        if let Some(primary) = record.primary_zone() {
            println!("  {:<16} {primary}", "primary_zone");
        }
    }

    for &field in SHOWN_FIELDS {
        let Some(text) = field_text(&record.get(field)) else {
            continue;
        };
        match primary_source(field.as_str()) {
            Some(source) => println!("  {:<16} {text}  [{source}]", field.as_str()),
            None => println!("  {:<16} {text}", field.as_str()),
        }
    }

    if !record.data_sources.is_empty() {
        let sources: Vec<&str> = record.data_sources.keys().map(String::as_str).collect();
        println!("  {:<16} {}", "sources", sources.join(", "));
    }

    if lots.is_empty() {
        return;
    }
    let today = Local::now().date_naive();
    println!("seed lots:");
    for lot in lots {
        println!("  {}", lot_line(lot, today));
    }
}

/// Display text of a field, `None` when unset.
fn field_text(value: &FieldValue) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let text = match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Number(n) => n.map(|n| n.to_string())?,
        FieldValue::List(items) => items.join(", "),
        FieldValue::Flag(b) => (if *b { "yes" } else { "no" }).to_string(),
        FieldValue::Kingdom(v) => v.map(|v| v.as_str().to_string())?,
        FieldValue::OrganismType(v) => v.map(|v| v.as_str().to_string())?,
        FieldValue::Water(v) => v.map(|v| v.as_str().to_string())?,
        FieldValue::Sun(v) => v.map(|v| v.as_str().to_string())?,
        FieldValue::Growth(v) => v.map(|v| v.as_str().to_string())?,
    };
    Some(text)
}

fn lot_line(lot: &SeedLot, today: chrono::NaiveDate) -> String {
    let mut parts = Vec::new();
    let label = match (lot.variety.is_empty(), lot.lot_reference.is_empty()) {
        (false, false) => format!("{} / {}", lot.variety, lot.lot_reference),
        (false, true) => lot.variety.clone(),
        (true, false) => lot.lot_reference.clone(),
        (true, true) => "(unlabelled)".to_string(),
    };
    parts.push(label);
    if let Some(quantity) = lot.quantity {
        parts.push(format!("{quantity} {}", lot.unit.as_str()));
    }
    if let Some(date) = lot.harvest_date {
        parts.push(format!("harvested {date}"));
    }
    if let Some(supplier) = &lot.supplier {
        parts.push(supplier.clone());
    }
    if lot.stratification_required {
        let kind = lot.stratification_kind.map(|k| k.as_str()).unwrap_or("required");
        match lot.stratification_days {
            Some(days) => parts.push(format!("stratification {kind} {days} d")),
            None => parts.push(format!("stratification {kind}")),
        }
    }
    if lot.is_possibly_expired(today) == Some(true) {
        parts.push("possibly expired".to_string());
    }
    parts.join(" · ")
}

fn to_json(value: &serde_json::Value) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::format(format!("cannot serialize output: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use verger_core::{OrganismType, SeedUnit, StratificationKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unset_fields_are_hidden() {
        assert_eq!(field_text(&FieldValue::Number(None)), None);
        assert_eq!(field_text(&FieldValue::Text(String::new())), None);
        assert_eq!(field_text(&FieldValue::OrganismType(None)), None);
        assert_eq!(
            field_text(&FieldValue::OrganismType(Some(OrganismType::FruitTree))),
            Some(OrganismType::FruitTree.as_str().to_string())
        );
        assert_eq!(
            field_text(&FieldValue::List(vec!["argile".into(), "loam".into()])),
            Some("argile, loam".to_string())
        );
    }

    #[test]
    fn lot_line_flags_expired_seed() {
        let lot = SeedLot {
            variety: "Dolgo".into(),
            lot_reference: "MD-01".into(),
            quantity: Some(40.0),
            unit: SeedUnit::Seeds,
            harvest_date: Some(date(2018, 9, 15)),
            viability_years: Some(3.0),
            stratification_required: true,
            stratification_days: Some(90),
            stratification_kind: Some(StratificationKind::Cold),
            ..SeedLot::default()
        };

        let line = lot_line(&lot, date(2026, 1, 1));
        assert!(line.starts_with("Dolgo / MD-01"));
        assert!(line.contains("40 graines"));
        assert!(line.contains("stratification froide 90 d"));
        assert!(line.ends_with("possibly expired"));

        let fresh = lot_line(&lot, date(2019, 1, 1));
        assert!(!fresh.contains("expired"));
    }
}
