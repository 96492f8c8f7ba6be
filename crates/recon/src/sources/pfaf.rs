//! Plants For A Future reference data.
//!
//! Exports vary a lot between the official site, the `pfaf-data` SQLite
//! dump and hand-made sheets, hence the wide alias tables and keyword
//! matching on free text.

use verger_core::{
    FieldValue, Kingdom, OrganismType, Row, ScalarValue, SpeciesField, SunNeed, WaterNeed,
};
use verger_io::LoadOptions;

use crate::aliases::{row_value, row_value_raw, PFAF};
use crate::error::RowError;
use crate::identity::IdentityInput;
use crate::merge::{MergeMode, SOURCE_PFAF};
use crate::parse::parse_float;
use crate::source::{ExtractedFields, FieldExtractor, ImportSource, RecordClassifier};

pub struct PfafSource {
    table: String,
}

impl PfafSource {
    /// Source reading `table` when given a SQLite database.
    pub fn new(table: impl Into<String>) -> Self {
        Self { table: table.into() }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Default for PfafSource {
    fn default() -> Self {
        Self::new(verger_io::DEFAULT_TABLE)
    }
}

impl FieldExtractor for PfafSource {
    fn identity(&self, row: &Row) -> IdentityInput {
        IdentityInput::new(
            row_value(row, PFAF.scientific_name, ""),
            row_value(row, PFAF.common_name, ""),
        )
    }

    fn extract(&self, row: &Row) -> Result<ExtractedFields, RowError> {
        let fields = vec![
            (SpeciesField::Family, FieldValue::Text(row_value(row, PFAF.family, ""))),
            (
                SpeciesField::SunNeed,
                FieldValue::Sun(sun_from_text(&row_value(row, PFAF.sun, ""))),
            ),
            (
                SpeciesField::WaterNeed,
                FieldValue::Water(water_from_text(&row_value(row, PFAF.water, ""))),
            ),
            (
                SpeciesField::HeightMax,
                FieldValue::Number(parse_float(row_value_raw(row, PFAF.height))),
            ),
            (
                SpeciesField::WidthMax,
                FieldValue::Number(parse_float(row_value_raw(row, PFAF.width))),
            ),
            (SpeciesField::Description, FieldValue::Text(describe(row))),
            (
                SpeciesField::EdibleParts,
                FieldValue::Text(row_value(row, PFAF.edible_parts, "")),
            ),
            (SpeciesField::OtherUses, FieldValue::Text(row_value(row, PFAF.uses, ""))),
            (SpeciesField::Toxicity, FieldValue::Text(row_value(row, PFAF.toxicity, ""))),
        ];

        Ok(ExtractedFields {
            fields,
            creation_defaults: vec![(SpeciesField::Kingdom, FieldValue::Kingdom(Some(Kingdom::Plant)))],
            zone: zone_text(row_value_raw(row, PFAF.hardiness_zone)),
            nitrogen_fixer: nitrogen_fixer(&row_value(row, PFAF.nitrogen_fixer, "")).then_some(true),
        })
    }
}

impl RecordClassifier for PfafSource {
    fn classify(&self, row: &Row) -> OrganismType {
        classify_habit(&row_value(row, PFAF.habit, ""))
    }
}

impl ImportSource for PfafSource {
    fn source_id(&self) -> &'static str {
        SOURCE_PFAF
    }

    fn default_merge_mode(&self) -> MergeMode {
        MergeMode::FillGaps
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions::with_table(self.table.clone())
    }
}

pub fn sun_from_text(text: &str) -> Option<SunNeed> {
    let sun = text.to_lowercase();
    if sun.is_empty() {
        return None;
    }
    if sun.contains("shade") && !sun.contains("sun") && !sun.contains("partial") {
        Some(SunNeed::Shade)
    } else if ["partial", "semi", "mi-ombre", "light shade"].iter().any(|k| sun.contains(k)) {
        Some(SunNeed::PartShade)
    } else if ["full", "sun", "soleil", "no shade"].iter().any(|k| sun.contains(k)) {
        Some(SunNeed::FullSun)
    } else {
        None
    }
}

pub fn water_from_text(text: &str) -> Option<WaterNeed> {
    let water = text.to_lowercase();
    if water.is_empty() {
        None
    } else if ["dry", "low", "faible"].iter().any(|k| water.contains(k)) {
        Some(WaterNeed::Low)
    } else if ["wet", "high", "eleve", "moist"].iter().any(|k| water.contains(k)) {
        Some(WaterNeed::High)
    } else {
        Some(WaterNeed::Medium)
    }
}

/// Organism type for a new record. Unknown habits are taken as perennials.
pub fn classify_habit(habit: &str) -> OrganismType {
    let habit = habit.to_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|k| habit.contains(k));
    if has(&["tree", "arbre"]) {
        OrganismType::OrnamentalTree
    } else if has(&["shrub", "arbuste"]) {
        OrganismType::Shrub
    } else if has(&["perennial", "vivace"]) {
        OrganismType::Perennial
    } else if has(&["annual", "annuelle"]) {
        OrganismType::Annual
    } else if has(&["climber", "grimpant", "vine"]) {
        OrganismType::Climber
    } else {
        OrganismType::Perennial
    }
}

/// Numeric zones lose their fraction (`5.0` → `"5"`); text is trimmed.
pub fn zone_text(value: Option<&ScalarValue>) -> String {
    match value {
        Some(ScalarValue::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(|z| z.to_string())
            .unwrap_or_default(),
        Some(other) => other.to_text().unwrap_or_default(),
        None => String::new(),
    }
}

/// Every non-empty description and habitat column, in alias order, one
/// paragraph each. Identical paragraphs are kept once.
pub fn describe(row: &Row) -> String {
    let mut parts: Vec<String> = Vec::new();
    for key in PFAF.description.iter().chain(PFAF.habitat) {
        let text = row_value(row, &[*key], "");
        if !text.is_empty() && !parts.contains(&text) {
            parts.push(text);
        }
    }
    parts.join("\n\n")
}

/// Loose yes marker. Nothing here ever reports "no".
pub fn nitrogen_fixer(text: &str) -> bool {
    let text = text.to_lowercase();
    ["y", "yes", "oui", "1"].iter().any(|k| text.contains(k))
}
