//! Hydro-Québec tree and shrub registry.
//!
//! Rows come from the registry API (`partiel` pages or single sheets) or a
//! saved copy of it. Keys arrive as flattened camelCase (`nomlatin`,
//! `fruitsdescription`); list-valued attributes arrive as JSON array text.

use std::collections::HashMap;

use verger_core::{
    FieldValue, GrowthRate, Kingdom, OrganismType, Row, SpeciesField, SunNeed, WaterNeed,
};
use verger_io::{Format, LoadOptions};

use crate::aliases::{registry, row_value, row_value_raw, AliasList, HYDRO_QUEBEC};
use crate::error::RowError;
use crate::identity::IdentityInput;
use crate::merge::{MergeMode, SOURCE_HYDRO_QUEBEC};
use crate::parse::parse_float;
use crate::source::{ExtractedFields, FieldExtractor, ImportSource, RecordClassifier};

/// Descriptive keys that the list endpoint sometimes leaves null.
pub const DESCRIPTION_KEYS: [&str; 3] = ["feuillesdescription", "fleursdescription", "fruitsdescription"];

/// Keys copied from a registry record onto a saved row that lacks them.
const INHERITED_KEYS: &[&str] = &[
    "famille",
    "hauteur",
    "largeur",
    "croissance",
    "soltextures",
    "solphs",
    "expositionslumiere",
    "solhumidites",
    "formes",
    "usages",
];

const FRUIT_GENERA: &[&str] = &["malus", "pyrus", "prunus", "vaccinium", "ribes", "sambucus"];
const TREE_FRUIT_GENERA: &[&str] = &["malus", "pyrus", "prunus"];
const NUT_GENERA: &[&str] = &["juglans", "corylus", "carya", "castanea"];

/// Fetches one complete registry sheet by number. `None` on any failure.
pub trait DetailFetcher {
    fn fetch_detail(&self, sheet_number: &str) -> Option<Row>;
}

#[derive(Default)]
pub struct HydroQuebecSource {
    fetcher: Option<Box<dyn DetailFetcher>>,
    details_merged: usize,
}

impl HydroQuebecSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete rows missing leaf, flower or fruit descriptions from the
    /// detail endpoint before import.
    pub fn with_detail_fetcher(fetcher: Box<dyn DetailFetcher>) -> Self {
        Self { fetcher: Some(fetcher), details_merged: 0 }
    }

    /// Rows whose descriptions were completed from a detail sheet.
    pub fn details_merged(&self) -> usize {
        self.details_merged
    }
}

impl FieldExtractor for HydroQuebecSource {
    fn identity(&self, row: &Row) -> IdentityInput {
        IdentityInput::new(
            row_value(row, HYDRO_QUEBEC.scientific_name, ""),
            row_value(row, HYDRO_QUEBEC.common_name, ""),
        )
    }

    fn extract(&self, row: &Row) -> Result<ExtractedFields, RowError> {
        let fruits = row_value(row, registry::FRUITS, "");
        let toxicity = extract_fruit_toxicity(&fruits);
        let edible_parts = derive_edible_parts(&fruits, !toxicity.is_empty());

        let uses = list(row, HYDRO_QUEBEC.uses).join(", ");
        // A registry sheet is authoritative for every field it covers: under
        // overwrite an absent value clears the stored one.
        let fields = vec![
            (SpeciesField::Family, FieldValue::Text(row_value(row, HYDRO_QUEBEC.family, ""))),
            (
                SpeciesField::WaterNeed,
                FieldValue::Water(Some(water_from_moisture(&list(row, HYDRO_QUEBEC.water)))),
            ),
            (
                SpeciesField::SunNeed,
                FieldValue::Sun(Some(sun_from_light(&list(row, HYDRO_QUEBEC.sun)))),
            ),
            (SpeciesField::SoilTextures, FieldValue::List(list(row, HYDRO_QUEBEC.soil))),
            (SpeciesField::SoilPh, FieldValue::List(list(row, registry::SOIL_PH))),
            (
                SpeciesField::HeightMax,
                FieldValue::Number(parse_float(row_value_raw(row, HYDRO_QUEBEC.height))),
            ),
            (
                SpeciesField::WidthMax,
                FieldValue::Number(parse_float(row_value_raw(row, HYDRO_QUEBEC.width))),
            ),
            (
                SpeciesField::GrowthRate,
                FieldValue::Growth(growth_from_text(&row_value(row, registry::GROWTH, ""))),
            ),
            (SpeciesField::Description, FieldValue::Text(describe(row))),
            (SpeciesField::OtherUses, FieldValue::Text(uses)),
            (SpeciesField::Toxicity, FieldValue::Text(toxicity)),
            (SpeciesField::EdibleParts, FieldValue::Text(edible_parts)),
        ];

        Ok(ExtractedFields {
            fields,
            creation_defaults: vec![(SpeciesField::Kingdom, FieldValue::Kingdom(Some(Kingdom::Plant)))],
            zone: row_value(row, HYDRO_QUEBEC.hardiness_zone, ""),
            nitrogen_fixer: None,
        })
    }
}

impl RecordClassifier for HydroQuebecSource {
    fn classify(&self, row: &Row) -> OrganismType {
        classify_tree(
            &list(row, HYDRO_QUEBEC.habit),
            &row_value(row, registry::FRUITS, ""),
            &row_value(row, HYDRO_QUEBEC.scientific_name, ""),
        )
    }
}

impl ImportSource for HydroQuebecSource {
    fn source_id(&self) -> &'static str {
        SOURCE_HYDRO_QUEBEC
    }

    fn default_merge_mode(&self) -> MergeMode {
        MergeMode::Overwrite
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions { formats: vec![Format::Json], ..LoadOptions::default() }
    }

    fn classification_is_mergeable(&self) -> bool {
        true
    }

    fn prepare_row(&mut self, mut row: Row) -> Row {
        let Some(fetcher) = &self.fetcher else {
            return row;
        };
        let sheet = row_value(&row, registry::SHEET_NUMBER, "");
        if sheet.is_empty() || !needs_details(&row) {
            return row;
        }
        match fetcher.fetch_detail(&sheet) {
            Some(detail) => {
                if merge_details(&mut row, &detail) > 0 {
                    self.details_merged += 1;
                    log::debug!("sheet {sheet}: descriptions completed from detail record");
                }
            }
            None => log::debug!("sheet {sheet}: detail fetch failed, keeping row as-is"),
        }
        row
    }
}

fn list(row: &Row, aliases: AliasList) -> Vec<String> {
    row_value_raw(row, aliases)
        .map(|v| v.list_items())
        .unwrap_or_default()
}

fn is_missing(row: &Row, key: &str) -> bool {
    row.get(key)
        .map_or(true, |v| v.is_blank() || v.list_items().is_empty())
}

/// Whether any leaf/flower/fruit description is missing.
pub fn needs_details(row: &Row) -> bool {
    DESCRIPTION_KEYS.iter().any(|k| is_missing(row, k))
}

/// Fill missing descriptions from a detail sheet. Returns keys filled.
pub fn merge_details(row: &mut Row, detail: &Row) -> usize {
    copy_missing(row, detail, &DESCRIPTION_KEYS)
}

fn copy_missing(row: &mut Row, from: &Row, keys: &[&str]) -> usize {
    let mut filled = 0;
    for key in keys {
        if !is_missing(row, key) || is_missing(from, key) {
            continue;
        }
        if let Some(value) = from.get(*key) {
            row.insert(key.to_string(), value.clone());
            filled += 1;
        }
    }
    filled
}

/// Species part of a cultivar name: `"Cotoneaster dammeri 'Coral Beauty'"`
/// → `Cotoneaster dammeri`.
pub fn cultivar_base(scientific: &str) -> &str {
    let before_quote = scientific.split('\'').next().unwrap_or_default();
    before_quote.split('(').next().unwrap_or_default().trim()
}

/// Complete saved rows from full registry records, matched by sheet number,
/// else inherited from a documented record of the same base species.
/// Returns the number of description fields filled.
pub fn enrich_from_registry(rows: &mut [Row], registry_rows: &[Row]) -> usize {
    let mut by_sheet: HashMap<String, &Row> = HashMap::new();
    for full in registry_rows {
        let sheet = row_value(full, registry::SHEET_NUMBER, "");
        if !sheet.is_empty() {
            by_sheet.insert(sheet, full);
        }
    }

    let mut by_species: HashMap<String, &Row> = HashMap::new();
    for full in registry_rows {
        let documented = !is_missing(full, "feuillesdescription") || !is_missing(full, "fruitsdescription");
        if !documented {
            continue;
        }
        let scientific = row_value(full, HYDRO_QUEBEC.scientific_name, "");
        let base = cultivar_base(&scientific);
        if !base.is_empty() {
            by_species.entry(base.to_string()).or_insert(full);
        }
    }

    let mut filled = 0;
    for row in rows.iter_mut() {
        let sheet = row_value(row, registry::SHEET_NUMBER, "");
        let full = by_sheet.get(&sheet).copied().or_else(|| {
            let scientific = row_value(row, HYDRO_QUEBEC.scientific_name, "");
            by_species.get(cultivar_base(&scientific)).copied()
        });
        let Some(full) = full else {
            continue;
        };
        filled += copy_missing(row, full, &DESCRIPTION_KEYS);
        copy_missing(row, full, INHERITED_KEYS);
    }
    filled
}

pub fn water_from_moisture(moisture: &[String]) -> WaterNeed {
    let text = moisture.join(" ").to_lowercase();
    if text.contains("élevée") || text.contains("humide") {
        WaterNeed::High
    } else if text.contains("faible") || text.contains("sec") {
        WaterNeed::Low
    } else {
        WaterNeed::Medium
    }
}

pub fn sun_from_light(light: &[String]) -> SunNeed {
    let text = light.join(" ").to_lowercase();
    if text.contains("soleil") {
        SunNeed::FullSun
    } else if text.contains("mi-ombre") {
        SunNeed::PartShade
    } else if text.contains("ombre") {
        SunNeed::Shade
    } else {
        SunNeed::FullSun
    }
}

pub fn growth_from_text(text: &str) -> Option<GrowthRate> {
    let text = text.to_lowercase();
    if text.contains("lente") {
        Some(GrowthRate::Slow)
    } else if text.contains("rapide") {
        Some(GrowthRate::Fast)
    } else if text.contains("moyenne") {
        Some(GrowthRate::Medium)
    } else {
        None
    }
}

/// Paragraphs of the fruit description that warn about toxicity.
pub fn extract_fruit_toxicity(fruits: &str) -> String {
    if !fruits.to_lowercase().contains("toxique") {
        return String::new();
    }
    fruits
        .split("\n\n")
        .map(str::trim)
        .filter(|seg| {
            let lower = seg.to_lowercase();
            !seg.is_empty() && (lower.contains("toxique") || lower.contains("potentiellement"))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn derive_edible_parts(fruits: &str, toxic: bool) -> String {
    let fd = fruits.to_lowercase();
    let has_fruit = ["baie", "fruit", "drupe", "cône"].iter().any(|k| fd.contains(k));
    match (has_fruit, toxic) {
        (false, _) => String::new(),
        (true, true) => "Fruits (baies) : non comestibles, toxiques. Voir toxicité.".to_string(),
        (true, false) => "Fruits (baies)".to_string(),
    }
}

/// Leaves, flowers, fruits and remarks as labelled paragraphs.
pub fn describe(row: &Row) -> String {
    let parts: [(&str, AliasList); 4] = [
        ("Feuilles", registry::LEAVES),
        ("Fleurs", registry::FLOWERS),
        ("Fruits", registry::FRUITS),
        ("Remarques", registry::REMARKS),
    ];
    parts
        .iter()
        .filter_map(|&(label, aliases)| {
            let text = row_value(row, aliases, "");
            (!text.is_empty()).then(|| format!("{label}: {text}"))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Organism type from growth forms, fruit description and genus.
pub fn classify_tree(forms: &[String], fruit_description: &str, scientific: &str) -> OrganismType {
    let fd = fruit_description.to_lowercase();
    let genus = scientific.to_lowercase();

    let not_toxic = !fd.contains("toxique");
    let mut edible_fruit = not_toxic
        && ["baie", "fruit", "drupe", "pomme", "poire", "cerise", "prune", "pêche", "abricot"]
            .iter()
            .any(|k| fd.contains(k));
    let mut nuts = not_toxic
        && ["noix", "noisette", "châtaigne", "amande", "caryer", "pignon", "pécan"]
            .iter()
            .any(|k| fd.contains(k));

    if !edible_fruit && !nuts {
        edible_fruit = FRUIT_GENERA.iter().any(|g| genus.contains(g));
        nuts = NUT_GENERA.iter().any(|g| genus.contains(g));
    }

    let mut form = forms.join(" ").to_lowercase();
    if form.contains("shrub") && !form.contains("arbuste") {
        form.push_str(" arbuste");
    }

    if form.trim().is_empty() {
        return if nuts {
            OrganismType::NutTree
        } else if edible_fruit && TREE_FRUIT_GENERA.iter().any(|g| genus.contains(g)) {
            OrganismType::FruitTree
        } else if edible_fruit {
            OrganismType::BerryShrub
        } else {
            OrganismType::OrnamentalTree
        };
    }

    let pick = |nut, fruit, other| {
        if nuts {
            nut
        } else if edible_fruit {
            fruit
        } else {
            other
        }
    };

    if form.contains("grand arbre") || form.contains("moyen arbre") {
        pick(OrganismType::NutTree, OrganismType::FruitTree, OrganismType::OrnamentalTree)
    } else if form.contains("petit arbre") || form.contains("arbrisseau") {
        pick(OrganismType::NutTree, OrganismType::FruitShrub, OrganismType::Shrub)
    } else if form.contains("arbuste") {
        pick(OrganismType::NutTree, OrganismType::BerryShrub, OrganismType::Shrub)
    } else if form.contains("grimpant") {
        OrganismType::Climber
    } else {
        pick(OrganismType::NutTree, OrganismType::FruitTree, OrganismType::OrnamentalTree)
    }
}
