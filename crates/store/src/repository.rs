use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use verger_core::{
    GrowthRate, Kingdom, OrganismType, SeedLot, SeedLotId, SeedLotRepository, SeedUnit,
    SpeciesId, SpeciesQuery, SpeciesRecord, SpeciesRepository, StoreError, StratificationKind,
    SunNeed, WaterNeed,
};

use crate::schema::{name_key, SCHEMA, SCHEMA_VERSION, SEED_LOT_COLUMNS, SPECIES_COLUMNS};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Species and seed lot store in one SQLite file.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Backend(format!("{}: {e}", parent.display())))?;
        }
        let conn = Connection::open(path).map_err(backend)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory().map_err(backend)?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(backend)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION],
        )
        .map_err(backend)?;
        Ok(Self { conn })
    }

    pub fn schema_version(&self) -> Result<Option<String>, StoreError> {
        self.conn
            .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |r| r.get(0))
            .optional()
            .map_err(backend)
    }

    fn species_where(&self, column: &str, value: &str) -> Result<Option<SpeciesRecord>, StoreError> {
        let sql = format!("SELECT {SPECIES_COLUMNS} FROM species WHERE {column} = ?1 ORDER BY id LIMIT 1");
        self.conn
            .query_row(&sql, params![value], StoredSpecies::read)
            .optional()
            .map_err(backend)?
            .map(StoredSpecies::into_record)
            .transpose()
    }
}

impl SpeciesQuery for SqliteRepository {
    fn species(&self, id: SpeciesId) -> Result<Option<SpeciesRecord>, StoreError> {
        let sql = format!("SELECT {SPECIES_COLUMNS} FROM species WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id.0], StoredSpecies::read)
            .optional()
            .map_err(backend)?
            .map(StoredSpecies::into_record)
            .transpose()
    }

    fn find_by_scientific_name(&self, name: &str) -> Result<Option<SpeciesRecord>, StoreError> {
        self.species_where("scientific_name_key", &name_key(name))
    }

    fn find_by_common_name(&self, name: &str) -> Result<Option<SpeciesRecord>, StoreError> {
        self.species_where("common_name_key", &name_key(name))
    }

    fn scientific_names(&self) -> Result<Vec<(SpeciesId, String)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, scientific_name FROM species ORDER BY id")
            .map_err(backend)?;
        let rows = stmt
            .query_map([], |r| Ok((SpeciesId(r.get(0)?), r.get(1)?)))
            .map_err(backend)?;
        let names = rows.collect::<Result<Vec<_>, _>>().map_err(backend);
        names
    }

    fn count_species(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM species", [], |r| r.get(0))
            .map_err(backend)?;
        Ok(n as usize)
    }
}

impl SpeciesRepository for SqliteRepository {
    fn insert_species(&mut self, mut record: SpeciesRecord) -> Result<SpeciesRecord, StoreError> {
        let v = SpeciesColumns::from_record(&record)?;
        self.conn
            .execute(
                "INSERT INTO species (common_name, common_name_key, scientific_name, \
                 scientific_name_key, family, kingdom, organism_type, water_need, sun_need, \
                 hardiness_zones, soil_textures, soil_ph, height_max, width_max, growth_rate, \
                 edible_parts, toxicity, other_uses, description, nitrogen_fixer, data_sources) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17, ?18, ?19, ?20, ?21)",
                params![
                    record.common_name,
                    name_key(&record.common_name),
                    record.scientific_name,
                    name_key(&record.scientific_name),
                    record.family,
                    v.kingdom,
                    v.organism_type,
                    v.water_need,
                    v.sun_need,
                    v.hardiness_zones,
                    v.soil_textures,
                    v.soil_ph,
                    record.height_max,
                    record.width_max,
                    v.growth_rate,
                    record.edible_parts,
                    record.toxicity,
                    record.other_uses,
                    record.description,
                    record.nitrogen_fixer,
                    v.data_sources,
                ],
            )
            .map_err(backend)?;
        record.id = Some(SpeciesId(self.conn.last_insert_rowid()));
        log::debug!("stored species {} as {:?}", record.display_name(), record.id);
        Ok(record)
    }

    fn update_species(&mut self, record: &SpeciesRecord) -> Result<(), StoreError> {
        let id = record
            .id
            .ok_or_else(|| StoreError::MissingRecord(record.display_name()))?;
        let v = SpeciesColumns::from_record(record)?;
        let changed = self
            .conn
            .execute(
                "UPDATE species SET common_name = ?2, common_name_key = ?3, scientific_name = ?4, \
                 scientific_name_key = ?5, family = ?6, kingdom = ?7, organism_type = ?8, \
                 water_need = ?9, sun_need = ?10, hardiness_zones = ?11, soil_textures = ?12, \
                 soil_ph = ?13, height_max = ?14, width_max = ?15, growth_rate = ?16, \
                 edible_parts = ?17, toxicity = ?18, other_uses = ?19, description = ?20, \
                 nitrogen_fixer = ?21, data_sources = ?22 WHERE id = ?1",
                params![
                    id.0,
                    record.common_name,
                    name_key(&record.common_name),
                    record.scientific_name,
                    name_key(&record.scientific_name),
                    record.family,
                    v.kingdom,
                    v.organism_type,
                    v.water_need,
                    v.sun_need,
                    v.hardiness_zones,
                    v.soil_textures,
                    v.soil_ph,
                    record.height_max,
                    record.width_max,
                    v.growth_rate,
                    record.edible_parts,
                    record.toxicity,
                    record.other_uses,
                    record.description,
                    record.nitrogen_fixer,
                    v.data_sources,
                ],
            )
            .map_err(backend)?;
        if changed == 0 {
            return Err(StoreError::MissingRecord(record.display_name()));
        }
        Ok(())
    }
}

impl SeedLotRepository for SqliteRepository {
    fn find_seed_lot(
        &self,
        species: SpeciesId,
        variety: &str,
        lot_reference: &str,
    ) -> Result<Option<SeedLot>, StoreError> {
        let sql = format!(
            "SELECT {SEED_LOT_COLUMNS} FROM seed_lots \
             WHERE species_id = ?1 AND variety = ?2 AND lot_reference = ?3 ORDER BY id LIMIT 1"
        );
        self.conn
            .query_row(&sql, params![species.0, variety, lot_reference], StoredSeedLot::read)
            .optional()
            .map_err(backend)?
            .map(StoredSeedLot::into_lot)
            .transpose()
    }

    fn insert_seed_lot(&mut self, mut lot: SeedLot) -> Result<SeedLot, StoreError> {
        let species = lot
            .species_id
            .ok_or_else(|| StoreError::MissingRecord("seed lot without species".into()))?;
        let v = SeedLotColumns::from_lot(&lot)?;
        self.conn
            .execute(
                "INSERT INTO seed_lots (species_id, variety, lot_reference, supplier, quantity, \
                 unit, harvest_date, viability_years, germination_lab_pct, \
                 stratification_required, stratification_days, stratification_kind, \
                 stratification_notes, germination_days_min, germination_days_max, \
                 temperature_optimal_min, temperature_optimal_max, pretreatment, data_sources) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
                 ?17, ?18, ?19)",
                params![
                    species.0,
                    lot.variety,
                    lot.lot_reference,
                    lot.supplier,
                    lot.quantity,
                    lot.unit.as_str(),
                    v.harvest_date,
                    lot.viability_years,
                    lot.germination_lab_pct,
                    lot.stratification_required,
                    lot.stratification_days,
                    v.stratification_kind,
                    lot.stratification_notes,
                    lot.germination_days_min,
                    lot.germination_days_max,
                    lot.temperature_optimal_min,
                    lot.temperature_optimal_max,
                    lot.pretreatment,
                    v.data_sources,
                ],
            )
            .map_err(backend)?;
        lot.id = Some(SeedLotId(self.conn.last_insert_rowid()));
        Ok(lot)
    }

    fn update_seed_lot(&mut self, lot: &SeedLot) -> Result<(), StoreError> {
        let id = lot
            .id
            .ok_or_else(|| StoreError::MissingRecord("seed lot without id".into()))?;
        let v = SeedLotColumns::from_lot(lot)?;
        let changed = self
            .conn
            .execute(
                "UPDATE seed_lots SET variety = ?2, lot_reference = ?3, supplier = ?4, \
                 quantity = ?5, unit = ?6, harvest_date = ?7, viability_years = ?8, \
                 germination_lab_pct = ?9, stratification_required = ?10, \
                 stratification_days = ?11, stratification_kind = ?12, \
                 stratification_notes = ?13, germination_days_min = ?14, \
                 germination_days_max = ?15, temperature_optimal_min = ?16, \
                 temperature_optimal_max = ?17, pretreatment = ?18, data_sources = ?19 \
                 WHERE id = ?1",
                params![
                    id.0,
                    lot.variety,
                    lot.lot_reference,
                    lot.supplier,
                    lot.quantity,
                    lot.unit.as_str(),
                    v.harvest_date,
                    lot.viability_years,
                    lot.germination_lab_pct,
                    lot.stratification_required,
                    lot.stratification_days,
                    v.stratification_kind,
                    lot.stratification_notes,
                    lot.germination_days_min,
                    lot.germination_days_max,
                    lot.temperature_optimal_min,
                    lot.temperature_optimal_max,
                    lot.pretreatment,
                    v.data_sources,
                ],
            )
            .map_err(backend)?;
        if changed == 0 {
            return Err(StoreError::MissingRecord(format!("seed lot {}", id.0)));
        }
        Ok(())
    }

    fn seed_lots_for(&self, species: SpeciesId) -> Result<Vec<SeedLot>, StoreError> {
        let sql = format!("SELECT {SEED_LOT_COLUMNS} FROM seed_lots WHERE species_id = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql).map_err(backend)?;
        let rows = stmt
            .query_map(params![species.0], StoredSeedLot::read)
            .map_err(backend)?;
        let lots = rows
            .map(|r| r.map_err(backend).and_then(StoredSeedLot::into_lot))
            .collect();
        lots
    }
}

// ---------------------------------------------------------------------------
// Column conversion
// ---------------------------------------------------------------------------

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(text: &str, column: &str) -> Result<T, StoreError> {
    serde_json::from_str(text).map_err(|e| StoreError::Serialization(format!("{column}: {e}")))
}

fn choice<T>(
    code: Option<String>,
    parse: fn(&str) -> Option<T>,
    column: &str,
) -> Result<Option<T>, StoreError> {
    match code {
        None => Ok(None),
        Some(code) => parse(&code)
            .map(Some)
            .ok_or_else(|| StoreError::Serialization(format!("{column}: unknown code '{code}'"))),
    }
}

/// Non-scalar species columns in their stored form.
struct SpeciesColumns {
    kingdom: Option<&'static str>,
    organism_type: Option<&'static str>,
    water_need: Option<&'static str>,
    sun_need: Option<&'static str>,
    growth_rate: Option<&'static str>,
    hardiness_zones: String,
    soil_textures: String,
    soil_ph: String,
    data_sources: String,
}

impl SpeciesColumns {
    fn from_record(r: &SpeciesRecord) -> Result<Self, StoreError> {
        Ok(Self {
            kingdom: r.kingdom.map(|c| c.as_str()),
            organism_type: r.organism_type.map(|c| c.as_str()),
            water_need: r.water_need.map(|c| c.as_str()),
            sun_need: r.sun_need.map(|c| c.as_str()),
            growth_rate: r.growth_rate.map(|c| c.as_str()),
            hardiness_zones: to_json(&r.hardiness_zones)?,
            soil_textures: to_json(&r.soil_textures)?,
            soil_ph: to_json(&r.soil_ph)?,
            data_sources: to_json(&r.data_sources)?,
        })
    }
}

/// A `species` row as read, before decoding.
struct StoredSpecies {
    id: i64,
    common_name: String,
    scientific_name: String,
    family: String,
    kingdom: Option<String>,
    organism_type: Option<String>,
    water_need: Option<String>,
    sun_need: Option<String>,
    hardiness_zones: String,
    soil_textures: String,
    soil_ph: String,
    height_max: Option<f64>,
    width_max: Option<f64>,
    growth_rate: Option<String>,
    edible_parts: String,
    toxicity: String,
    other_uses: String,
    description: String,
    nitrogen_fixer: bool,
    data_sources: String,
}

impl StoredSpecies {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            common_name: row.get(1)?,
            scientific_name: row.get(2)?,
            family: row.get(3)?,
            kingdom: row.get(4)?,
            organism_type: row.get(5)?,
            water_need: row.get(6)?,
            sun_need: row.get(7)?,
            hardiness_zones: row.get(8)?,
            soil_textures: row.get(9)?,
            soil_ph: row.get(10)?,
            height_max: row.get(11)?,
            width_max: row.get(12)?,
            growth_rate: row.get(13)?,
            edible_parts: row.get(14)?,
            toxicity: row.get(15)?,
            other_uses: row.get(16)?,
            description: row.get(17)?,
            nitrogen_fixer: row.get(18)?,
            data_sources: row.get(19)?,
        })
    }

    fn into_record(self) -> Result<SpeciesRecord, StoreError> {
        Ok(SpeciesRecord {
            id: Some(SpeciesId(self.id)),
            common_name: self.common_name,
            scientific_name: self.scientific_name,
            family: self.family,
            kingdom: choice(self.kingdom, Kingdom::from_code, "kingdom")?,
            organism_type: choice(self.organism_type, OrganismType::from_code, "organism_type")?,
            water_need: choice(self.water_need, WaterNeed::from_code, "water_need")?,
            sun_need: choice(self.sun_need, SunNeed::from_code, "sun_need")?,
            hardiness_zones: from_json(&self.hardiness_zones, "hardiness_zones")?,
            soil_textures: from_json(&self.soil_textures, "soil_textures")?,
            soil_ph: from_json(&self.soil_ph, "soil_ph")?,
            height_max: self.height_max,
            width_max: self.width_max,
            growth_rate: choice(self.growth_rate, GrowthRate::from_code, "growth_rate")?,
            edible_parts: self.edible_parts,
            toxicity: self.toxicity,
            other_uses: self.other_uses,
            description: self.description,
            nitrogen_fixer: self.nitrogen_fixer,
            data_sources: from_json(&self.data_sources, "data_sources")?,
        })
    }
}

struct SeedLotColumns {
    harvest_date: Option<String>,
    stratification_kind: Option<&'static str>,
    data_sources: String,
}

impl SeedLotColumns {
    fn from_lot(lot: &SeedLot) -> Result<Self, StoreError> {
        Ok(Self {
            harvest_date: lot.harvest_date.map(|d| d.format(DATE_FORMAT).to_string()),
            stratification_kind: lot.stratification_kind.map(|k| k.as_str()),
            data_sources: to_json(&lot.data_sources)?,
        })
    }
}

struct StoredSeedLot {
    id: i64,
    species_id: i64,
    variety: String,
    lot_reference: String,
    supplier: Option<String>,
    quantity: Option<f64>,
    unit: String,
    harvest_date: Option<String>,
    viability_years: Option<f64>,
    germination_lab_pct: Option<f64>,
    stratification_required: bool,
    stratification_days: Option<i64>,
    stratification_kind: Option<String>,
    stratification_notes: String,
    germination_days_min: Option<i64>,
    germination_days_max: Option<i64>,
    temperature_optimal_min: Option<f64>,
    temperature_optimal_max: Option<f64>,
    pretreatment: String,
    data_sources: String,
}

impl StoredSeedLot {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            species_id: row.get(1)?,
            variety: row.get(2)?,
            lot_reference: row.get(3)?,
            supplier: row.get(4)?,
            quantity: row.get(5)?,
            unit: row.get(6)?,
            harvest_date: row.get(7)?,
            viability_years: row.get(8)?,
            germination_lab_pct: row.get(9)?,
            stratification_required: row.get(10)?,
            stratification_days: row.get(11)?,
            stratification_kind: row.get(12)?,
            stratification_notes: row.get(13)?,
            germination_days_min: row.get(14)?,
            germination_days_max: row.get(15)?,
            temperature_optimal_min: row.get(16)?,
            temperature_optimal_max: row.get(17)?,
            pretreatment: row.get(18)?,
            data_sources: row.get(19)?,
        })
    }

    fn into_lot(self) -> Result<SeedLot, StoreError> {
        let harvest_date = match self.harvest_date {
            Some(text) => Some(
                NaiveDate::parse_from_str(&text, DATE_FORMAT)
                    .map_err(|e| StoreError::Serialization(format!("harvest_date '{text}': {e}")))?,
            ),
            None => None,
        };
        let unit = SeedUnit::from_code(&self.unit)
            .ok_or_else(|| StoreError::Serialization(format!("unit: unknown code '{}'", self.unit)))?;
        Ok(SeedLot {
            id: Some(SeedLotId(self.id)),
            species_id: Some(SpeciesId(self.species_id)),
            variety: self.variety,
            lot_reference: self.lot_reference,
            supplier: self.supplier,
            quantity: self.quantity,
            unit,
            harvest_date,
            viability_years: self.viability_years,
            germination_lab_pct: self.germination_lab_pct,
            stratification_required: self.stratification_required,
            stratification_days: self.stratification_days,
            stratification_kind: choice(
                self.stratification_kind,
                StratificationKind::from_code,
                "stratification_kind",
            )?,
            stratification_notes: self.stratification_notes,
            germination_days_min: self.germination_days_min,
            germination_days_max: self.germination_days_max,
            temperature_optimal_min: self.temperature_optimal_min,
            temperature_optimal_max: self.temperature_optimal_max,
            pretreatment: self.pretreatment,
            data_sources: from_json(&self.data_sources, "data_sources")?,
        })
    }
}
