//! Seed supplier catalogs: one species plus one seed lot per row.

use std::collections::BTreeMap;

use verger_core::{
    scalar_payload, FieldValue, Kingdom, OrganismType, Row, SeedLot, SeedLotRepository,
    SpeciesField, SpeciesRepository,
};
use verger_io::LoadOptions;

use crate::aliases::{row_value, row_value_raw, SEED_CATALOG};
use crate::error::RowError;
use crate::identity::IdentityInput;
use crate::merge::{MergeMode, SOURCE_SEED_CATALOG};
use crate::parse::{
    parse_bool, parse_date, parse_float, parse_int, parse_int_or_range, parse_stratification_kind,
    parse_unit,
};
use crate::report::SeedLotSummary;
use crate::source::{ExtractedFields, FieldExtractor, ImportSource, PersistContext, RecordClassifier};

/// Provenance key on a seed lot.
pub const LOT_PROVENANCE_KEY: &str = "import";

#[derive(Debug, Default)]
pub struct SeedCatalogSource {
    supplier: Option<String>,
    update_existing: bool,
    summary: SeedLotSummary,
}

impl SeedCatalogSource {
    pub fn new(supplier: Option<String>, update_existing: bool) -> Self {
        Self {
            supplier: supplier.filter(|s| !s.trim().is_empty()),
            update_existing,
            summary: SeedLotSummary::default(),
        }
    }

    pub fn summary(&self) -> &SeedLotSummary {
        &self.summary
    }
}

impl FieldExtractor for SeedCatalogSource {
    fn identity(&self, row: &Row) -> IdentityInput {
        IdentityInput::new(
            row_value(row, SEED_CATALOG.species.scientific_name, ""),
            row_value(row, SEED_CATALOG.species.common_name, ""),
        )
    }

    fn extract(&self, row: &Row) -> Result<ExtractedFields, RowError> {
        Ok(ExtractedFields {
            fields: vec![(
                SpeciesField::Family,
                FieldValue::Text(row_value(row, SEED_CATALOG.species.family, "")),
            )],
            creation_defaults: vec![(SpeciesField::Kingdom, FieldValue::Kingdom(Some(Kingdom::Plant)))],
            zone: String::new(),
            nitrogen_fixer: None,
        })
    }
}

impl RecordClassifier for SeedCatalogSource {
    fn classify(&self, _row: &Row) -> OrganismType {
        OrganismType::Perennial
    }
}

impl ImportSource for SeedCatalogSource {
    fn source_id(&self) -> &'static str {
        SOURCE_SEED_CATALOG
    }

    fn default_merge_mode(&self) -> MergeMode {
        MergeMode::FillGaps
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions::text_only()
    }

    fn after_persist<R>(&mut self, repo: &mut R, ctx: PersistContext<'_>) -> Result<(), RowError>
    where
        R: SpeciesRepository + SeedLotRepository,
    {
        let mut lot = seed_lot_from_row(ctx.row);
        lot.supplier = self.supplier.clone();

        let existing = match ctx.record.id {
            Some(species) => repo.find_seed_lot(species, &lot.variety, &lot.lot_reference)?,
            None => return Err(RowError::Invalid("species was not assigned an id".into())),
        };

        match existing {
            Some(_) if !self.update_existing => {
                self.summary.skipped_existing += 1;
                log::debug!(
                    "seed lot {} / {} already present, skipped",
                    ctx.record.display_name(),
                    display_or_dash(&lot.variety)
                );
            }
            Some(current) => {
                lot.id = current.id;
                lot.species_id = current.species_id;
                let payload = lot.data_sources.remove(LOT_PROVENANCE_KEY).unwrap_or_default();
                lot.data_sources = current.data_sources;
                lot.data_sources.insert(LOT_PROVENANCE_KEY.to_string(), payload);
                repo.update_seed_lot(&lot)?;
                self.summary.updated += 1;
            }
            None => {
                lot.species_id = ctx.record.id;
                repo.insert_seed_lot(lot)?;
                self.summary.created += 1;
            }
        }
        Ok(())
    }

    fn lot_summary(&self) -> Option<SeedLotSummary> {
        Some(self.summary.clone())
    }
}

fn display_or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// Seed lot described by one catalog row, not yet attached to a species.
pub fn seed_lot_from_row(row: &Row) -> SeedLot {
    let a = &SEED_CATALOG;
    let mut data_sources = BTreeMap::new();
    data_sources.insert(LOT_PROVENANCE_KEY.to_string(), scalar_payload(row));

    SeedLot {
        variety: row_value(row, a.variety, ""),
        lot_reference: row_value(row, a.lot_reference, ""),
        quantity: parse_float(row_value_raw(row, a.quantity)),
        unit: parse_unit(&row_value(row, a.unit, "")),
        harvest_date: parse_date(&row_value(row, a.harvest_date, "")),
        viability_years: parse_float(row_value_raw(row, a.viability_years)),
        germination_lab_pct: parse_float(row_value_raw(row, a.germination_pct)),
        stratification_required: parse_bool(row_value_raw(row, a.stratification_required)),
        stratification_days: parse_int_or_range(row_value_raw(row, a.stratification_days)),
        stratification_kind: parse_stratification_kind(&row_value(row, a.stratification_kind, "")),
        stratification_notes: row_value(row, a.stratification_notes, ""),
        germination_days_min: parse_int(row_value_raw(row, a.germination_days_min)),
        germination_days_max: parse_int_or_range(row_value_raw(row, a.germination_days_max)),
        temperature_optimal_min: parse_float(row_value_raw(row, a.temperature_min)),
        temperature_optimal_max: parse_float(row_value_raw(row, a.temperature_max)),
        pretreatment: row_value(row, a.pretreatment, ""),
        data_sources,
        ..SeedLot::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use verger_core::{MemoryRepository, ScalarValue, SeedUnit, SpeciesRecord, StratificationKind};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), ScalarValue::from(*v))).collect()
    }

    fn catalog_row() -> Row {
        row(&[
            ("latin_name", "Asclepias tuberosa"),
            ("common_name", "Asclépiade tubéreuse"),
            ("variete", "Hello Yellow"),
            ("lot", "AT-2023"),
            ("quantite", "1,5"),
            ("unite", "g"),
            ("date_recolte", "2023"),
            ("germination", "85%"),
            ("stratification", "oui"),
            ("stratification_days", "30-60"),
            ("stratification_type", "Cold moist"),
            ("germination_days", "7-21"),
        ])
    }

    #[test]
    fn lot_fields_use_tolerant_parsers() {
        let lot = seed_lot_from_row(&catalog_row());
        assert_eq!(lot.variety, "Hello Yellow");
        assert_eq!(lot.lot_reference, "AT-2023");
        assert_eq!(lot.quantity, Some(1.5));
        assert_eq!(lot.unit, SeedUnit::Grams);
        assert_eq!(lot.harvest_date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(lot.germination_lab_pct, Some(85.0));
        assert!(lot.stratification_required);
        assert_eq!(lot.stratification_days, Some(60));
        assert_eq!(lot.stratification_kind, Some(StratificationKind::Cold));
        assert_eq!(lot.germination_days_max, Some(21));
        assert!(lot.data_sources[LOT_PROVENANCE_KEY].contains_key("variete"));
    }

    fn persisted(repo: &mut MemoryRepository) -> SpeciesRecord {
        repo.insert_species(SpeciesRecord::new("Asclépiade tubéreuse", "Asclepias tuberosa"))
            .unwrap()
    }

    #[test]
    fn existing_lot_is_skipped_unless_updating() {
        let mut repo = MemoryRepository::new();
        let record = persisted(&mut repo);
        let r = catalog_row();

        let mut source = SeedCatalogSource::new(Some("Semences du Portage".into()), false);
        for _ in 0..2 {
            let ctx = PersistContext { record: &record, row: &r, created: false };
            source.after_persist(&mut repo, ctx).unwrap();
        }
        assert_eq!(source.summary().created, 1);
        assert_eq!(source.summary().skipped_existing, 1);

        let lots = repo.seed_lots_for(record.id.unwrap()).unwrap();
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].supplier.as_deref(), Some("Semences du Portage"));
    }

    #[test]
    fn update_existing_replaces_lot_fields() {
        let mut repo = MemoryRepository::new();
        let record = persisted(&mut repo);
        let mut source = SeedCatalogSource::new(None, true);

        let first = catalog_row();
        let ctx = PersistContext { record: &record, row: &first, created: false };
        source.after_persist(&mut repo, ctx).unwrap();

        let mut second = catalog_row();
        second.insert("quantite".into(), ScalarValue::from("3"));
        let ctx = PersistContext { record: &record, row: &second, created: false };
        source.after_persist(&mut repo, ctx).unwrap();

        let lots = repo.seed_lots_for(record.id.unwrap()).unwrap();
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].quantity, Some(3.0));
        assert_eq!(source.summary().updated, 1);
    }
}
