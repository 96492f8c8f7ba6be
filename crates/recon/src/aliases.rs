//! Column alias tables and first-non-empty value lookup.
//!
//! Rows reach this module with keys already normalized by
//! [`verger_io::normalize_key`], so every alias here is snake_case (or the
//! flattened camelCase of the tree registry).

use verger_core::{Row, ScalarValue};

/// Aliases for one logical field, highest priority first.
pub type AliasList = &'static [&'static str];

/// Logical species fields shared by the plant-oriented vocabularies.
#[derive(Debug, Clone, Copy)]
pub struct SpeciesAliases {
    pub scientific_name: AliasList,
    pub common_name: AliasList,
    pub family: AliasList,
    pub habit: AliasList,
    pub hardiness_zone: AliasList,
    pub height: AliasList,
    pub width: AliasList,
    pub sun: AliasList,
    pub water: AliasList,
    pub soil: AliasList,
    pub description: AliasList,
    pub habitat: AliasList,
    pub edible_parts: AliasList,
    pub uses: AliasList,
    pub toxicity: AliasList,
    pub nitrogen_fixer: AliasList,
}

/// Plants For A Future exports (official site, pfaf-data, custom sheets).
pub const PFAF: SpeciesAliases = SpeciesAliases {
    scientific_name: &[
        "latin_name", "nom_latin", "latin", "scientific_name", "scientificname", "sci_name",
        "binomial", "species", "scientific", "latinname", "latin_name_full",
    ],
    common_name: &[
        "common_name", "nom_commun", "commonname", "common", "name", "plant_name",
        "vernacular_name", "english_name", "vernacular", "english", "plantname",
    ],
    family: &["family", "famille", "familie"],
    habit: &["habit", "type", "growth_form"],
    hardiness_zone: &["zone_rusticite", "zone_min", "zone", "hardiness", "uk_hardiness", "hardiness_zone"],
    height: &["height", "hauteur", "height_m", "heightm"],
    width: &["width", "largeur", "spread", "width_m"],
    sun: &["sun", "light", "shade", "exposure", "exposition"],
    water: &["water", "moisture", "humidite", "water_requirement"],
    soil: &["soil", "sol", "soil_type"],
    description: &["description", "cultivation", "cultivation_details", "habit_description"],
    habitat: &["habitat", "range", "distribution", "range_s"],
    edible_parts: &["edible_parts", "edible_uses", "edibleuses", "parties_comestibles"],
    uses: &["uses", "usages", "uses_notes", "usages_autres", "medicinal", "other_uses"],
    toxicity: &["toxicite", "known_hazards", "knownhazards", "hazards"],
    nitrogen_fixer: &["nitrogen_fixer", "fixateur_azote", "nitrogenfixer"],
};

/// Hydro-Québec tree registry. The API speaks camelCase, which key
/// normalization flattens (`nomLatin` → `nomlatin`).
pub const HYDRO_QUEBEC: SpeciesAliases = SpeciesAliases {
    scientific_name: &["nomlatin", "nom_latin"],
    common_name: &["nomfrancais", "nom_francais", "nomcommun"],
    family: &["famille"],
    habit: &["formes"],
    hardiness_zone: &["zonerusticite", "zone_rusticite"],
    height: &["hauteur"],
    width: &["largeur"],
    sun: &["expositionslumiere"],
    water: &["solhumidites"],
    soil: &["soltextures"],
    description: &["remarquesfichecomplete"],
    habitat: &[],
    edible_parts: &[],
    uses: &["usages"],
    toxicity: &[],
    nitrogen_fixer: &[],
};

/// Registry-only columns without a PFAF counterpart.
pub mod registry {
    use super::AliasList;

    pub const SOIL_PH: AliasList = &["solphs"];
    pub const GROWTH: AliasList = &["croissance"];
    pub const LEAVES: AliasList = &["feuillesdescription"];
    pub const FLOWERS: AliasList = &["fleursdescription"];
    pub const FRUITS: AliasList = &["fruitsdescription"];
    pub const REMARKS: AliasList = &["remarquesfichecomplete"];
    pub const SHEET_NUMBER: AliasList = &["numerofiche"];
}

/// Seed catalog columns. Identity and family come from [`PFAF`].
#[derive(Debug, Clone, Copy)]
pub struct SeedAliases {
    pub species: SpeciesAliases,
    pub variety: AliasList,
    pub lot_reference: AliasList,
    pub quantity: AliasList,
    pub unit: AliasList,
    pub harvest_date: AliasList,
    pub viability_years: AliasList,
    pub germination_pct: AliasList,
    pub stratification_required: AliasList,
    pub stratification_days: AliasList,
    pub stratification_kind: AliasList,
    pub stratification_notes: AliasList,
    pub germination_days_min: AliasList,
    pub germination_days_max: AliasList,
    pub temperature_min: AliasList,
    pub temperature_max: AliasList,
    pub pretreatment: AliasList,
}

pub const SEED_CATALOG: SeedAliases = SeedAliases {
    species: PFAF,
    variety: &[
        "variete", "variety", "cultivar", "cultivar_name", "variety_name", "nom_variete",
        "nom_cultivar",
    ],
    lot_reference: &[
        "lot_reference", "lot_number", "lot", "batch", "numero_lot", "reference", "lot_no",
        "batch_number",
    ],
    quantity: &["quantite", "quantity", "count", "nombre", "seeds_count", "seed_count", "amount"],
    unit: &["unite", "unit", "units", "uom"],
    harvest_date: &[
        "date_recolte", "date_recolte_seeds", "harvest_date", "test_date", "date_test", "year",
        "annee", "packed_for",
    ],
    viability_years: &[
        "duree_vie_annees", "viability_years", "seed_life", "storage_life", "shelf_life",
        "durable_vie", "viability", "years_viable",
    ],
    germination_pct: &[
        "germination_lab_pct", "germination", "germination_pct", "germination_rate", "germ_pct",
        "germination_percent",
    ],
    stratification_required: &[
        "stratification_requise", "stratification", "stratification_required",
        "cold_stratification", "needs_stratification", "stratification_yes",
    ],
    stratification_days: &[
        "stratification_duree_jours", "stratification_days", "cold_strat_days", "strat_days",
        "stratification_period", "duree_stratification",
    ],
    stratification_kind: &[
        "stratification_temp", "stratification_type", "strat_type", "cold_warm",
        "temp_stratification",
    ],
    stratification_notes: &["stratification_notes", "strat_notes"],
    germination_days_min: &[
        "temps_germination_jours_min", "germination_days_min", "days_to_germinate_min",
        "duree_germination_min", "germ_days_min",
    ],
    germination_days_max: &[
        "temps_germination_jours_max", "germination_days", "germination_days_max",
        "days_to_germinate", "duree_germination", "germ_days", "germ_days_max",
    ],
    temperature_min: &["temperature_optimal_min", "temp_min", "germ_temp_min", "soil_temp_min"],
    temperature_max: &["temperature_optimal_max", "temp_max", "germ_temp_max", "soil_temp_max"],
    pretreatment: &[
        "pretraitement", "pretreatment", "scarification", "trempage", "soak", "soaking",
        "special_treatment",
    ],
};

/// First present, non-blank value among `aliases`, as trimmed text.
///
/// Numbers and booleans are returned in their text form, zero and `false`
/// included.
pub fn row_value(row: &Row, aliases: &[&str], default: &str) -> String {
    row_value_raw(row, aliases)
        .and_then(ScalarValue::to_text)
        .unwrap_or_else(|| default.to_string())
}

/// Like [`row_value`] but keeps the scalar type.
pub fn row_value_raw<'r>(row: &'r Row, aliases: &[&str]) -> Option<&'r ScalarValue> {
    aliases
        .iter()
        .filter_map(|key| row.get(*key))
        .find(|v| !v.is_blank())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, ScalarValue)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn first_alias_wins() {
        let r = row(&[
            ("scientific_name", "Malus sylvestris".into()),
            ("latin_name", "Malus domestica".into()),
        ]);
        assert_eq!(row_value(&r, PFAF.scientific_name, ""), "Malus domestica");
    }

    #[test]
    fn blank_values_fall_through() {
        let r = row(&[
            ("latin_name", "   ".into()),
            ("nom_latin", ScalarValue::Null),
            ("latin", " Corylus avellana ".into()),
        ]);
        assert_eq!(row_value(&r, PFAF.scientific_name, ""), "Corylus avellana");
    }

    #[test]
    fn zero_and_false_are_returned() {
        let r = row(&[("height", ScalarValue::from(0i64)), ("nitrogen_fixer", false.into())]);
        assert_eq!(row_value(&r, PFAF.height, "none"), "0");
        assert_eq!(row_value(&r, PFAF.nitrogen_fixer, "none"), "false");
    }

    #[test]
    fn default_when_absent() {
        let r = row(&[("zone", "".into())]);
        assert_eq!(row_value(&r, PFAF.hardiness_zone, "?"), "?");
        assert!(row_value_raw(&r, PFAF.hardiness_zone).is_none());
    }

    #[test]
    fn raw_keeps_type() {
        let r = row(&[("zone", ScalarValue::from(5i64))]);
        assert_eq!(row_value_raw(&r, PFAF.hardiness_zone).and_then(|v| v.as_f64()), Some(5.0));
    }

    #[test]
    fn seed_catalog_shares_identity_aliases() {
        let r = row(&[("common_name", "Tomate".into()), ("cultivar", "Roma".into())]);
        assert_eq!(row_value(&r, SEED_CATALOG.species.common_name, ""), "Tomate");
        assert_eq!(row_value(&r, SEED_CATALOG.variety, ""), "Roma");
    }
}
