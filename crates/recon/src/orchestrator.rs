//! Generic row-by-row import driver.

use std::path::Path;

use verger_core::{
    FieldValue, Row, SeedLotRepository, SpeciesField, SpeciesRecord, SpeciesRepository,
    StagedRepository,
};
use verger_io::{available_columns, load_rows, suggest_identity_columns};

use crate::error::{ImportError, RowError};
use crate::identity::{IdentityInput, IdentityMatcher, Resolution};
use crate::merge::{apply_fields, merge_zone, replace_provenance, MergeMode};
use crate::report::{IdentityHint, ImportReport};
use crate::source::{ImportSource, PersistContext};

/// Keys shown when logging a row without identity.
const LOGGED_COLUMNS: usize = 10;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Import into a discarded overlay; the repository is left untouched.
    pub dry_run: bool,
    /// Error messages kept in the report.
    pub error_sample_limit: usize,
    /// Empty-identity rows logged with their columns.
    pub empty_identity_sample_limit: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            error_sample_limit: 5,
            empty_identity_sample_limit: 3,
        }
    }
}

pub struct ImportOrchestrator<S: ImportSource> {
    source: S,
}

impl<S: ImportSource> ImportOrchestrator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load `path` with the source's accepted formats and import it.
    /// `limit == 0` imports every row.
    pub fn import_from_file<R>(
        &mut self,
        repo: &mut R,
        path: &Path,
        merge_mode: MergeMode,
        limit: usize,
        options: &ImportOptions,
    ) -> Result<ImportReport, ImportError>
    where
        R: SpeciesRepository + SeedLotRepository,
    {
        let rows = load_rows(path, &self.source.load_options())?;
        Ok(self.import_rows(repo, rows, merge_mode, limit, options))
    }

    /// Import `rows` into `repo`. A dry run writes into a [`StagedRepository`]
    /// over `repo` instead, so its counts match those of a real run.
    pub fn import_rows<R>(
        &mut self,
        repo: &mut R,
        rows: Vec<Row>,
        merge_mode: MergeMode,
        limit: usize,
        options: &ImportOptions,
    ) -> ImportReport
    where
        R: SpeciesRepository + SeedLotRepository,
    {
        if !options.dry_run {
            return self.import_into(repo, rows, merge_mode, limit, options);
        }
        let mut staged = StagedRepository::new(&*repo);
        let report = self.import_into(&mut staged, rows, merge_mode, limit, options);
        log::debug!(
            "{}: dry run, {} staged species writes discarded",
            self.source.source_id(),
            staged.staged_species()
        );
        report
    }

    fn import_into<R>(
        &mut self,
        repo: &mut R,
        mut rows: Vec<Row>,
        merge_mode: MergeMode,
        limit: usize,
        options: &ImportOptions,
    ) -> ImportReport
    where
        R: SpeciesRepository + SeedLotRepository,
    {
        let source_id = self.source.source_id();
        let mut report = ImportReport::new(source_id, merge_mode.as_str(), options.dry_run);

        if limit > 0 {
            rows.truncate(limit);
        }
        report.rows = rows.len();
        if rows.is_empty() {
            log::warn!("{source_id}: no rows to import");
            return report;
        }
        log::info!(
            "{source_id}: importing {} rows (merge={merge_mode}{})",
            rows.len(),
            if options.dry_run { ", dry run" } else { "" }
        );

        report.identity_hint = self.identity_hint(&rows);

        for (idx, row) in rows.into_iter().enumerate() {
            let line = idx + 1;
            let row = self.source.prepare_row(row);
            let identity = self.source.identity(&row);

            if identity.is_empty() {
                report.record_empty_identity();
                if report.skipped_empty_identity <= options.empty_identity_sample_limit {
                    log::warn!(
                        "{source_id}: row {line} skipped, no scientific or common name (columns: {})",
                        preview_columns(&row)
                    );
                }
                continue;
            }

            match self.import_row(repo, &row, &identity, merge_mode) {
                Ok(true) => {
                    report.created += 1;
                    log::debug!("{source_id}: created {}", identity.label());
                }
                Ok(false) => {
                    report.updated += 1;
                    log::debug!("{source_id}: updated {}", identity.label());
                }
                Err(e) => {
                    let message = format!("row {line} ({}): {e}", identity.label());
                    if report.record_error(message.clone(), options.error_sample_limit) {
                        log::warn!("{source_id}: {message}");
                    }
                }
            }
        }

        report.seed_lots = self.source.lot_summary();
        log::info!(
            "{source_id}: {} created, {} updated, {} skipped ({} empty identity, {} errors)",
            report.created,
            report.updated,
            report.skipped,
            report.skipped_empty_identity,
            report.skipped_errors
        );
        report
    }

    /// Resolve, merge and persist one row. Returns whether a record was created.
    fn import_row<R>(
        &mut self,
        repo: &mut R,
        row: &Row,
        identity: &IdentityInput,
        mode: MergeMode,
    ) -> Result<bool, RowError>
    where
        R: SpeciesRepository + SeedLotRepository,
    {
        let source_id = self.source.source_id();
        let extracted = self.source.extract(row)?;
        let organism_type = (
            SpeciesField::OrganismType,
            FieldValue::OrganismType(Some(self.source.classify(row))),
        );

        let Resolution { mut record, created } =
            IdentityMatcher::new(&*repo).resolve_or_create(identity, SpeciesRecord::default())?;

        if created {
            apply_fields(&mut record, &extracted.creation_defaults, MergeMode::Overwrite)?;
            apply_fields(&mut record, std::slice::from_ref(&organism_type), MergeMode::Overwrite)?;
            apply_fields(&mut record, &extracted.fields, MergeMode::Overwrite)?;
        } else {
            if self.source.classification_is_mergeable() {
                apply_fields(&mut record, std::slice::from_ref(&organism_type), mode)?;
            }
            apply_fields(&mut record, &extracted.fields, mode)?;
        }

        if extracted.nitrogen_fixer == Some(true) {
            record.nitrogen_fixer = true;
        }
        merge_zone(&mut record.hardiness_zones, &extracted.zone, source_id);
        replace_provenance(&mut record, source_id, self.source.provenance(row));

        if created {
            record = repo.insert_species(record)?;
        } else {
            repo.update_species(&record)?;
        }

        self.source
            .after_persist(repo, PersistContext { record: &record, row, created })?;
        Ok(created)
    }

    fn identity_hint(&self, rows: &[Row]) -> Option<IdentityHint> {
        let first = rows.first()?;
        if !self.source.identity(first).is_empty() {
            return None;
        }
        let columns = available_columns(rows);
        let candidates = suggest_identity_columns(&columns);
        log::warn!(
            "{}: first row has neither scientific nor common name; columns: {}",
            self.source.source_id(),
            columns.join(", ")
        );
        if !candidates.scientific.is_empty() {
            log::warn!("  scientific name candidates: {}", candidates.scientific.join(", "));
        }
        if !candidates.common.is_empty() {
            log::warn!("  common name candidates: {}", candidates.common.join(", "));
        }
        Some(IdentityHint {
            columns,
            scientific_candidates: candidates.scientific,
            common_candidates: candidates.common,
        })
    }
}

fn preview_columns(row: &Row) -> String {
    let keys: Vec<&str> = row.keys().take(LOGGED_COLUMNS).map(String::as_str).collect();
    let more = if row.len() > LOGGED_COLUMNS { ", ..." } else { "" };
    format!("{}{more}", keys.join(", "))
}
