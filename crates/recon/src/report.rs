use std::fmt;

use serde::Serialize;

/// Diagnostics emitted when the first row carries no identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentityHint {
    pub columns: Vec<String>,
    pub scientific_candidates: Vec<String>,
    pub common_candidates: Vec<String>,
}

/// Seed lot counters, reported by the seed catalog source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedLotSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped_existing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub source: String,
    pub merge_mode: String,
    pub dry_run: bool,
    pub rows: usize,
    pub created: usize,
    pub updated: usize,
    /// `skipped_empty_identity + skipped_errors`.
    pub skipped: usize,
    pub skipped_empty_identity: usize,
    pub skipped_errors: usize,
    pub error_samples: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_hint: Option<IdentityHint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_lots: Option<SeedLotSummary>,
}

impl ImportReport {
    pub fn new(source: &str, merge_mode: &str, dry_run: bool) -> Self {
        Self {
            source: source.to_string(),
            merge_mode: merge_mode.to_string(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn record_empty_identity(&mut self) {
        self.skipped += 1;
        self.skipped_empty_identity += 1;
    }

    /// Count an error skip; keep the message while under `sample_limit`.
    pub fn record_error(&mut self, message: String, sample_limit: usize) -> bool {
        self.skipped += 1;
        self.skipped_errors += 1;
        if self.error_samples.len() < sample_limit {
            self.error_samples.push(message);
            true
        } else {
            false
        }
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.dry_run { "(dry run) " } else { "" };
        writeln!(f, "{prefix}{} import ({}, {} rows)", self.source, self.merge_mode, self.rows)?;
        writeln!(f, "  created: {}", self.created)?;
        writeln!(f, "  updated: {}", self.updated)?;
        write!(
            f,
            "  skipped: {} ({} empty identity, {} errors)",
            self.skipped, self.skipped_empty_identity, self.skipped_errors
        )?;
        if let Some(lots) = &self.seed_lots {
            write!(
                f,
                "\n  seed lots: {} created, {} updated, {} already present",
                lots.created, lots.updated, lots.skipped_existing
            )?;
        }
        Ok(())
    }
}
