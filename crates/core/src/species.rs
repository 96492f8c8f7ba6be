use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scalar::ScalarValue;
use crate::zone::{primary_zone, ZoneEntry};

// ---------------------------------------------------------------------------
// Choice enums
// ---------------------------------------------------------------------------

/// Declares a closed choice set whose persisted form is a short code.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $code)] $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant, )+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $code, )+
                }
            }

            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    pub enum Kingdom {
        Plant => "plante",
        Fungus => "champignon",
        Moss => "mousse",
    }
}

choice_enum! {
    /// Cultivation-oriented organism category.
    pub enum OrganismType {
        FruitTree => "arbre_fruitier",
        NutTree => "arbre_noix",
        OrnamentalTree => "arbre_ornement",
        TimberTree => "arbre_bois",
        FruitShrub => "arbuste_fruitier",
        BerryShrub => "arbuste_baies",
        Shrub => "arbuste",
        Perennial => "vivace",
        Annual => "annuelle",
        Biennial => "bisannuelle",
        AromaticHerb => "herbe_aromatique",
        Vegetable => "legume",
        Climber => "grimpante",
        GroundCover => "couvre_sol",
        EdibleMushroom => "champignon_comestible",
        MycorrhizalFungus => "champignon_mycorhize",
        Moss => "mousse",
    }
}

choice_enum! {
    pub enum WaterNeed {
        VeryLow => "tres_faible",
        Low => "faible",
        Medium => "moyen",
        High => "eleve",
        VeryHigh => "tres_eleve",
    }
}

choice_enum! {
    pub enum SunNeed {
        FullShade => "ombre_complete",
        Shade => "ombre",
        PartShade => "mi_ombre",
        PartSun => "soleil_partiel",
        FullSun => "plein_soleil",
    }
}

choice_enum! {
    pub enum GrowthRate {
        VerySlow => "tres_lente",
        Slow => "lente",
        Medium => "moyenne",
        Fast => "rapide",
        VeryFast => "tres_rapide",
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesId(pub i64);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Canonical entry for one taxon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    /// `None` until the record has been persisted.
    pub id: Option<SpeciesId>,
    pub common_name: String,
    pub scientific_name: String,
    pub family: String,
    pub kingdom: Option<Kingdom>,
    pub organism_type: Option<OrganismType>,
    pub water_need: Option<WaterNeed>,
    pub sun_need: Option<SunNeed>,
    pub hardiness_zones: Vec<ZoneEntry>,
    pub soil_textures: Vec<String>,
    pub soil_ph: Vec<String>,
    pub height_max: Option<f64>,
    pub width_max: Option<f64>,
    pub growth_rate: Option<GrowthRate>,
    pub edible_parts: String,
    pub toxicity: String,
    pub other_uses: String,
    pub description: String,
    pub nitrogen_fixer: bool,
    /// source id → raw payload last imported from that source.
    pub data_sources: BTreeMap<String, BTreeMap<String, ScalarValue>>,
}

impl SpeciesRecord {
    pub fn new(common_name: impl Into<String>, scientific_name: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            scientific_name: scientific_name.into(),
            ..Self::default()
        }
    }

    /// Coldest zone claimed by any source.
    pub fn primary_zone(&self) -> Option<&str> {
        primary_zone(&self.hardiness_zones)
    }

    pub fn zones_by_source(&self, source: &str) -> Vec<&str> {
        self.hardiness_zones
            .iter()
            .filter(|z| z.source == source && !z.zone.is_empty())
            .map(|z| z.zone.as_str())
            .collect()
    }

    pub fn display_name(&self) -> String {
        if self.scientific_name.is_empty() {
            self.common_name.clone()
        } else {
            format!("{} ({})", self.common_name, self.scientific_name)
        }
    }

    pub fn get(&self, field: SpeciesField) -> FieldValue {
        match field {
            SpeciesField::CommonName => FieldValue::Text(self.common_name.clone()),
            SpeciesField::Family => FieldValue::Text(self.family.clone()),
            SpeciesField::Kingdom => FieldValue::Kingdom(self.kingdom),
            SpeciesField::OrganismType => FieldValue::OrganismType(self.organism_type),
            SpeciesField::WaterNeed => FieldValue::Water(self.water_need),
            SpeciesField::SunNeed => FieldValue::Sun(self.sun_need),
            SpeciesField::SoilTextures => FieldValue::List(self.soil_textures.clone()),
            SpeciesField::SoilPh => FieldValue::List(self.soil_ph.clone()),
            SpeciesField::HeightMax => FieldValue::Number(self.height_max),
            SpeciesField::WidthMax => FieldValue::Number(self.width_max),
            SpeciesField::GrowthRate => FieldValue::Growth(self.growth_rate),
            SpeciesField::EdibleParts => FieldValue::Text(self.edible_parts.clone()),
            SpeciesField::Toxicity => FieldValue::Text(self.toxicity.clone()),
            SpeciesField::OtherUses => FieldValue::Text(self.other_uses.clone()),
            SpeciesField::Description => FieldValue::Text(self.description.clone()),
            SpeciesField::NitrogenFixer => FieldValue::Flag(self.nitrogen_fixer),
        }
    }

    /// Write one field. Fails when the value variant does not fit the field.
    pub fn set(&mut self, field: SpeciesField, value: FieldValue) -> Result<(), FieldError> {
        match (field, value) {
            (SpeciesField::CommonName, FieldValue::Text(v)) => self.common_name = v,
            (SpeciesField::Family, FieldValue::Text(v)) => self.family = v,
            (SpeciesField::Kingdom, FieldValue::Kingdom(v)) => self.kingdom = v,
            (SpeciesField::OrganismType, FieldValue::OrganismType(v)) => self.organism_type = v,
            (SpeciesField::WaterNeed, FieldValue::Water(v)) => self.water_need = v,
            (SpeciesField::SunNeed, FieldValue::Sun(v)) => self.sun_need = v,
            (SpeciesField::SoilTextures, FieldValue::List(v)) => self.soil_textures = v,
            (SpeciesField::SoilPh, FieldValue::List(v)) => self.soil_ph = v,
            (SpeciesField::HeightMax, FieldValue::Number(v)) => self.height_max = v,
            (SpeciesField::WidthMax, FieldValue::Number(v)) => self.width_max = v,
            (SpeciesField::GrowthRate, FieldValue::Growth(v)) => self.growth_rate = v,
            (SpeciesField::EdibleParts, FieldValue::Text(v)) => self.edible_parts = v,
            (SpeciesField::Toxicity, FieldValue::Text(v)) => self.toxicity = v,
            (SpeciesField::OtherUses, FieldValue::Text(v)) => self.other_uses = v,
            (SpeciesField::Description, FieldValue::Text(v)) => self.description = v,
            (SpeciesField::NitrogenFixer, FieldValue::Flag(v)) => self.nitrogen_fixer = v,
            (field, value) => {
                return Err(FieldError { field, found: value.kind() });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Field addressing
// ---------------------------------------------------------------------------

/// Mergeable record attributes. Identity, zones and provenance are not
/// listed: they follow their own rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesField {
    CommonName,
    Family,
    Kingdom,
    OrganismType,
    WaterNeed,
    SunNeed,
    SoilTextures,
    SoilPh,
    HeightMax,
    WidthMax,
    GrowthRate,
    EdibleParts,
    Toxicity,
    OtherUses,
    Description,
    NitrogenFixer,
}

impl SpeciesField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommonName => "common_name",
            Self::Family => "family",
            Self::Kingdom => "kingdom",
            Self::OrganismType => "organism_type",
            Self::WaterNeed => "water_need",
            Self::SunNeed => "sun_need",
            Self::SoilTextures => "soil_textures",
            Self::SoilPh => "soil_ph",
            Self::HeightMax => "height_max",
            Self::WidthMax => "width_max",
            Self::GrowthRate => "growth_rate",
            Self::EdibleParts => "edible_parts",
            Self::Toxicity => "toxicity",
            Self::OtherUses => "other_uses",
            Self::Description => "description",
            Self::NitrogenFixer => "nitrogen_fixer",
        }
    }
}

impl fmt::Display for SpeciesField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value for one [`SpeciesField`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Option<f64>),
    List(Vec<String>),
    Flag(bool),
    Kingdom(Option<Kingdom>),
    OrganismType(Option<OrganismType>),
    Water(Option<WaterNeed>),
    Sun(Option<SunNeed>),
    Growth(Option<GrowthRate>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Empty = unset choice, null number, blank text or empty list.
    /// Numbers (zero included) and flags are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(n) => n.is_none(),
            Self::List(items) => items.is_empty(),
            Self::Flag(_) => false,
            Self::Kingdom(v) => v.is_none(),
            Self::OrganismType(v) => v.is_none(),
            Self::Water(v) => v.is_none(),
            Self::Sun(v) => v.is_none(),
            Self::Growth(v) => v.is_none(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::List(_) => "list",
            Self::Flag(_) => "flag",
            Self::Kingdom(_) => "kingdom",
            Self::OrganismType(_) => "organism_type",
            Self::Water(_) => "water_need",
            Self::Sun(_) => "sun_need",
            Self::Growth(_) => "growth_rate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: SpeciesField,
    pub found: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}' cannot hold a {} value", self.field, self.found)
    }
}

impl std::error::Error for FieldError {}
