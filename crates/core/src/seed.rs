use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::scalar::ScalarValue;
use crate::species::SpeciesId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeedLotId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeedUnit {
    #[default]
    #[serde(rename = "graines")]
    Seeds,
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "ml")]
    Millilitres,
    #[serde(rename = "sachet")]
    Packet,
}

impl SeedUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeds => "graines",
            Self::Grams => "g",
            Self::Millilitres => "ml",
            Self::Packet => "sachet",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "graines" => Some(Self::Seeds),
            "g" => Some(Self::Grams),
            "ml" => Some(Self::Millilitres),
            "sachet" => Some(Self::Packet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StratificationKind {
    #[serde(rename = "froide")]
    Cold,
    #[serde(rename = "chaude")]
    Warm,
    #[serde(rename = "chaude_puis_froide")]
    WarmThenCold,
}

impl StratificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cold => "froide",
            Self::Warm => "chaude",
            Self::WarmThenCold => "chaude_puis_froide",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "froide" => Some(Self::Cold),
            "chaude" => Some(Self::Warm),
            "chaude_puis_froide" => Some(Self::WarmThenCold),
            _ => None,
        }
    }
}

/// A seed lot in inventory, attached to one species.
///
/// Identity within a species is `(variety, lot_reference)`; both may be blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedLot {
    pub id: Option<SeedLotId>,
    pub species_id: Option<SpeciesId>,
    pub variety: String,
    pub lot_reference: String,
    pub supplier: Option<String>,
    pub quantity: Option<f64>,
    pub unit: SeedUnit,
    pub harvest_date: Option<NaiveDate>,
    pub viability_years: Option<f64>,
    pub germination_lab_pct: Option<f64>,
    pub stratification_required: bool,
    pub stratification_days: Option<i64>,
    pub stratification_kind: Option<StratificationKind>,
    pub stratification_notes: String,
    pub germination_days_min: Option<i64>,
    pub germination_days_max: Option<i64>,
    pub temperature_optimal_min: Option<f64>,
    pub temperature_optimal_max: Option<f64>,
    pub pretreatment: String,
    pub data_sources: BTreeMap<String, BTreeMap<String, ScalarValue>>,
}

impl SeedLot {
    /// Whether `harvest_date + viability_years` is already behind `today`.
    ///
    /// `None` when either input is missing or the date cannot be computed.
    pub fn is_possibly_expired(&self, today: NaiveDate) -> Option<bool> {
        let harvested = self.harvest_date?;
        let years = self.viability_years? as i32;
        let expiry = harvested
            .with_year(harvested.year().checked_add(years)?)
            // Feb 29 harvests roll to Mar 1 on non-leap expiry years.
            .or_else(|| NaiveDate::from_ymd_opt(harvested.year() + years, 3, 1))?;
        Some(today > expiry)
    }
}
