//! Field merge policy, zone-list merge and provenance replacement.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use verger_core::{FieldError, FieldValue, ScalarValue, SpeciesField, SpeciesRecord, ZoneEntry};

pub const SOURCE_HYDRO_QUEBEC: &str = "hydroquebec";
pub const SOURCE_PFAF: &str = "pfaf";
pub const SOURCE_SEED_CATALOG: &str = "seed_catalog";

/// Field written to the zone list rather than through [`SpeciesField`].
pub const HARDINESS_ZONES: &str = "hardiness_zones";

/// Which source is preferred per field when several supply it.
///
/// The registry wins for climate and soil, the plant reference for prose.
/// Unlisted fields go to whichever source fills them first.
pub const FIELD_PRIMARY_SOURCE: &[(&str, &str)] = &[
    (HARDINESS_ZONES, SOURCE_HYDRO_QUEBEC),
    ("water_need", SOURCE_HYDRO_QUEBEC),
    ("sun_need", SOURCE_HYDRO_QUEBEC),
    ("soil_textures", SOURCE_HYDRO_QUEBEC),
    ("soil_ph", SOURCE_HYDRO_QUEBEC),
    ("family", SOURCE_HYDRO_QUEBEC),
    ("description", SOURCE_PFAF),
    ("other_uses", SOURCE_PFAF),
    ("edible_parts", SOURCE_PFAF),
    ("toxicity", SOURCE_PFAF),
];

pub fn primary_source(field: &str) -> Option<&'static str> {
    FIELD_PRIMARY_SOURCE
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, source)| *source)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Every supplied field replaces the stored value.
    Overwrite,
    /// A field is written only when its stored value is empty.
    FillGaps,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::FillGaps => "fill_gaps",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "fill_gaps" => Ok(Self::FillGaps),
            other => Err(format!("unknown merge mode '{other}' (expected overwrite or fill_gaps)")),
        }
    }
}

/// Apply `fields` under `mode`. Returns the fields actually written.
pub fn apply_fields(
    record: &mut SpeciesRecord,
    fields: &[(SpeciesField, FieldValue)],
    mode: MergeMode,
) -> Result<Vec<SpeciesField>, FieldError> {
    let mut written = Vec::new();
    for (field, value) in fields {
        let writable = match mode {
            MergeMode::Overwrite => true,
            MergeMode::FillGaps => record.get(*field).is_empty(),
        };
        if writable {
            record.set(*field, value.clone())?;
            written.push(*field);
        }
    }
    Ok(written)
}

/// Record `zone` as `source`'s claim. Replaces that source's previous entry,
/// leaves other sources alone, and ignores a blank zone.
pub fn merge_zone(zones: &mut Vec<ZoneEntry>, zone: &str, source: &str) {
    let zone = zone.trim();
    if zone.is_empty() {
        return;
    }
    match zones.iter().position(|z| z.source == source) {
        Some(idx) => {
            zones[idx].zone = zone.to_string();
            let mut seen = false;
            zones.retain(|z| {
                if z.source != source {
                    return true;
                }
                let keep = !seen;
                seen = true;
                keep
            });
        }
        None => zones.push(ZoneEntry::new(zone, source)),
    }
}

/// Replace `source`'s provenance block, keeping every other source's.
pub fn replace_provenance(
    record: &mut SpeciesRecord,
    source: &str,
    payload: BTreeMap<String, ScalarValue>,
) {
    record.data_sources.insert(source.to_string(), payload);
}
