// Database layout. Lists, zones and provenance are JSON text; name keys are
// lower-cased in Rust because SQLite's LOWER() only folds ASCII.

pub const SCHEMA_VERSION: &str = "1";

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS species (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    common_name TEXT NOT NULL DEFAULT '',
    common_name_key TEXT NOT NULL DEFAULT '',
    scientific_name TEXT NOT NULL DEFAULT '',
    scientific_name_key TEXT NOT NULL DEFAULT '',
    family TEXT NOT NULL DEFAULT '',
    kingdom TEXT,                             -- choice code, NULL = unset
    organism_type TEXT,
    water_need TEXT,
    sun_need TEXT,
    hardiness_zones TEXT NOT NULL DEFAULT '[]',  -- [{"zone","source"}]
    soil_textures TEXT NOT NULL DEFAULT '[]',
    soil_ph TEXT NOT NULL DEFAULT '[]',
    height_max REAL,
    width_max REAL,
    growth_rate TEXT,
    edible_parts TEXT NOT NULL DEFAULT '',
    toxicity TEXT NOT NULL DEFAULT '',
    other_uses TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    nitrogen_fixer INTEGER NOT NULL DEFAULT 0,
    data_sources TEXT NOT NULL DEFAULT '{}'      -- source -> {column: value}
);

CREATE INDEX IF NOT EXISTS species_scientific_key ON species (scientific_name_key);
CREATE INDEX IF NOT EXISTS species_common_key ON species (common_name_key);

CREATE TABLE IF NOT EXISTS seed_lots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    species_id INTEGER NOT NULL REFERENCES species (id),
    variety TEXT NOT NULL DEFAULT '',
    lot_reference TEXT NOT NULL DEFAULT '',
    supplier TEXT,
    quantity REAL,
    unit TEXT NOT NULL DEFAULT 'graines',
    harvest_date TEXT,                        -- YYYY-MM-DD
    viability_years REAL,
    germination_lab_pct REAL,
    stratification_required INTEGER NOT NULL DEFAULT 0,
    stratification_days INTEGER,
    stratification_kind TEXT,
    stratification_notes TEXT NOT NULL DEFAULT '',
    germination_days_min INTEGER,
    germination_days_max INTEGER,
    temperature_optimal_min REAL,
    temperature_optimal_max REAL,
    pretreatment TEXT NOT NULL DEFAULT '',
    data_sources TEXT NOT NULL DEFAULT '{}'
);

CREATE INDEX IF NOT EXISTS seed_lots_identity ON seed_lots (species_id, variety, lot_reference);
"#;

pub const SPECIES_COLUMNS: &str = "id, common_name, scientific_name, family, kingdom, \
    organism_type, water_need, sun_need, hardiness_zones, soil_textures, soil_ph, height_max, \
    width_max, growth_rate, edible_parts, toxicity, other_uses, description, nitrogen_fixer, \
    data_sources";

pub const SEED_LOT_COLUMNS: &str = "id, species_id, variety, lot_reference, supplier, quantity, \
    unit, harvest_date, viability_years, germination_lab_pct, stratification_required, \
    stratification_days, stratification_kind, stratification_notes, germination_days_min, \
    germination_days_max, temperature_optimal_min, temperature_optimal_max, pretreatment, \
    data_sources";

/// Comparison key for case-insensitive name lookups.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}
