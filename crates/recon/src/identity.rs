//! Species identity resolution.
//!
//! Given a scientific and/or common name, find the stored record it refers
//! to, tolerating cultivar quotes, rank markers, punctuation, accents and
//! case. Strategies run in a fixed order and the first hit wins; within a
//! strategy the first record in store order wins.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use verger_core::{SpeciesQuery, SpeciesRecord, StoreError};

use crate::error::IdentityError;

/// Names supplied by one import row. Both trimmed; either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityInput {
    pub scientific: String,
    pub common: String,
}

impl IdentityInput {
    pub fn new(scientific: impl Into<String>, common: impl Into<String>) -> Self {
        Self {
            scientific: scientific.into().trim().to_string(),
            common: common.into().trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scientific.is_empty() && self.common.is_empty()
    }

    /// Label for logs: common name if present, else scientific.
    pub fn label(&self) -> &str {
        if self.common.is_empty() {
            &self.scientific
        } else {
            &self.common
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Match {
    Found(SpeciesRecord),
    NotFound,
}

type Strategy<Q> = fn(&Q, &IdentityInput) -> Result<Option<SpeciesRecord>, StoreError>;

/// Ordered identity lookup over a read-only store.
pub struct IdentityMatcher<'q, Q: SpeciesQuery> {
    query: &'q Q,
}

impl<'q, Q: SpeciesQuery> IdentityMatcher<'q, Q> {
    pub fn new(query: &'q Q) -> Self {
        Self { query }
    }

    fn strategies() -> [(&'static str, Strategy<Q>); 4] {
        [
            ("exact scientific", exact_scientific::<Q>),
            ("wildcard scientific", wildcard_scientific::<Q>),
            ("all words scientific", words_scientific::<Q>),
            ("exact common", exact_common::<Q>),
        ]
    }

    pub fn find(&self, input: &IdentityInput) -> Result<Match, IdentityError> {
        if input.is_empty() {
            return Err(IdentityError::MissingIdentity);
        }
        for (name, strategy) in Self::strategies() {
            if let Some(record) = strategy(self.query, input)? {
                log::debug!("'{}' matched {} by {name}", input.label(), record.display_name());
                return Ok(Match::Found(record));
            }
        }
        Ok(Match::NotFound)
    }

    /// Resolve to a stored record or a fresh, unsaved one built on `defaults`.
    ///
    /// A found record gets its scientific name backfilled when the stored one
    /// is empty, or is a shorter spelling of the same normalized name.
    pub fn resolve_or_create(
        &self,
        input: &IdentityInput,
        defaults: SpeciesRecord,
    ) -> Result<Resolution, IdentityError> {
        match self.find(input)? {
            Match::Found(mut record) => {
                backfill_scientific_name(&mut record, input);
                Ok(Resolution { record, created: false })
            }
            Match::NotFound => Ok(Resolution {
                record: new_record(input, defaults)?,
                created: true,
            }),
        }
    }
}

/// Outcome of [`IdentityMatcher::resolve_or_create`].
#[derive(Debug, Clone)]
pub struct Resolution {
    pub record: SpeciesRecord,
    /// `true` when no stored record matched; `record.id` is then `None`.
    pub created: bool,
}

fn exact_scientific<Q: SpeciesQuery>(
    q: &Q,
    input: &IdentityInput,
) -> Result<Option<SpeciesRecord>, StoreError> {
    if input.scientific.is_empty() {
        return Ok(None);
    }
    q.find_by_scientific_name(&input.scientific)
}

fn wildcard_scientific<Q: SpeciesQuery>(
    q: &Q,
    input: &IdentityInput,
) -> Result<Option<SpeciesRecord>, StoreError> {
    let normalized = normalize_scientific_name(&input.scientific);
    if normalized.is_empty() {
        return Ok(None);
    }
    let segments: Vec<&str> = normalized.split(' ').collect();
    first_stored(q, |stored| {
        wildcard_match(&segments, &normalize_scientific_name(stored))
    })
}

fn words_scientific<Q: SpeciesQuery>(
    q: &Q,
    input: &IdentityInput,
) -> Result<Option<SpeciesRecord>, StoreError> {
    let normalized = normalize_scientific_name(&input.scientific);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    if words.len() < 2 {
        return Ok(None);
    }
    first_stored(q, |stored| {
        let stored = stored.to_lowercase();
        words.iter().all(|w| stored.contains(w))
    })
}

fn exact_common<Q: SpeciesQuery>(
    q: &Q,
    input: &IdentityInput,
) -> Result<Option<SpeciesRecord>, StoreError> {
    if !input.scientific.is_empty() || input.common.is_empty() {
        return Ok(None);
    }
    q.find_by_common_name(&input.common)
}

fn first_stored<Q: SpeciesQuery>(
    q: &Q,
    pred: impl Fn(&str) -> bool,
) -> Result<Option<SpeciesRecord>, StoreError> {
    let hit = q
        .scientific_names()?
        .into_iter()
        .find(|(_, name)| !name.trim().is_empty() && pred(name));
    match hit {
        Some((id, _)) => q.species(id),
        None => Ok(None),
    }
}

/// `segments` must appear in `haystack` in order (SQL `LIKE '%a%b%'`).
fn wildcard_match(segments: &[&str], haystack: &str) -> bool {
    let mut rest = haystack;
    for seg in segments {
        match rest.find(seg) {
            Some(pos) => rest = &rest[pos + seg.len()..],
            None => return false,
        }
    }
    true
}

const RANK_MARKERS: &[&str] = &["var.", "subsp.", "ssp.", "cv.", "f."];
const QUOTES: &[char] = &['\'', '"', '‘', '’', '“', '”', '`', '´'];

/// Comparison form of a scientific name.
///
/// `"Malus 'Dolgo'"` → `malus dolgo`, `"Acer saccharum subsp. nigrum"` →
/// `acer saccharum nigrum`, `"Sorbus × hybrida"` → `sorbus hybrida`.
pub fn normalize_scientific_name(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !QUOTES.contains(c))
        .collect();

    let mut words = Vec::new();
    for token in folded.split_whitespace() {
        if RANK_MARKERS.contains(&token) {
            continue;
        }
        let cleaned: String = token
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        words.extend(cleaned.split_whitespace().map(str::to_string));
    }
    words.join(" ")
}

fn new_record(input: &IdentityInput, defaults: SpeciesRecord) -> Result<SpeciesRecord, IdentityError> {
    if input.is_empty() {
        return Err(IdentityError::MissingIdentity);
    }
    let scientific = if input.scientific.is_empty() { &input.common } else { &input.scientific };
    let common = if input.common.is_empty() { &input.scientific } else { &input.common };
    Ok(SpeciesRecord {
        id: None,
        scientific_name: scientific.clone(),
        common_name: common.clone(),
        ..defaults
    })
}

fn backfill_scientific_name(record: &mut SpeciesRecord, input: &IdentityInput) {
    let supplied = input.scientific.as_str();
    if supplied.is_empty() {
        return;
    }
    let stored = record.scientific_name.trim();
    let richer_spelling = supplied.chars().count() > stored.chars().count()
        && normalize_scientific_name(supplied) == normalize_scientific_name(stored);
    if stored.is_empty() || richer_spelling {
        log::debug!("backfill scientific name '{stored}' -> '{supplied}'");
        record.scientific_name = supplied.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verger_core::{MemoryRepository, SpeciesRepository};

    fn repo_with(names: &[(&str, &str)]) -> MemoryRepository {
        let mut repo = MemoryRepository::new();
        for (common, sci) in names {
            repo.insert_species(SpeciesRecord::new(*common, *sci)).unwrap();
        }
        repo
    }

    fn found_name(m: Match) -> String {
        match m {
            Match::Found(r) => r.scientific_name,
            Match::NotFound => panic!("expected a match"),
        }
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_scientific_name("Malus 'Dolgo'"), "malus dolgo");
        assert_eq!(normalize_scientific_name("Malus ‘Dolgo’"), "malus dolgo");
        assert_eq!(normalize_scientific_name("Acer saccharum subsp. nigrum"), "acer saccharum nigrum");
        assert_eq!(normalize_scientific_name("Rosa rugosa var. alba"), "rosa rugosa alba");
        assert_eq!(normalize_scientific_name("Hydrangea  cv. 'Annabelle'"), "hydrangea annabelle");
        assert_eq!(normalize_scientific_name("Sorbus × hybrida"), "sorbus hybrida");
        assert_eq!(normalize_scientific_name("Crataegus crus-galli"), "crataegus crus galli");
        assert_eq!(normalize_scientific_name("Érable à sucre"), "erable a sucre");
        assert_eq!(normalize_scientific_name("  '  "), "");
    }

    #[test]
    fn exact_match_ignores_case() {
        let repo = repo_with(&[("Pommetier Dolgo", "Malus dolgo")]);
        let m = IdentityMatcher::new(&repo).find(&IdentityInput::new("MALUS DOLGO", "")).unwrap();
        assert_eq!(found_name(m), "Malus dolgo");
    }

    #[test]
    fn cultivar_quotes_match_plain_name() {
        let repo = repo_with(&[("Pommetier Dolgo", "Malus dolgo")]);
        let m = IdentityMatcher::new(&repo).find(&IdentityInput::new("Malus 'Dolgo'", "")).unwrap();
        assert_eq!(found_name(m), "Malus dolgo");
    }

    #[test]
    fn plain_name_matches_quoted_store() {
        let repo = repo_with(&[("Pommetier Dolgo", "Malus 'Dolgo'")]);
        let m = IdentityMatcher::new(&repo).find(&IdentityInput::new("malus dolgo", "")).unwrap();
        assert_eq!(found_name(m), "Malus 'Dolgo'");
    }

    #[test]
    fn reordered_words_match() {
        let repo = repo_with(&[("Argousier", "Hippophae rhamnoides")]);
        let m = IdentityMatcher::new(&repo)
            .find(&IdentityInput::new("rhamnoides Hippophae", ""))
            .unwrap();
        assert_eq!(found_name(m), "Hippophae rhamnoides");
    }

    #[test]
    fn fuzzy_first_in_store_order() {
        let repo = repo_with(&[
            ("Pommier A", "Malus dolgo 'Red'"),
            ("Pommier B", "Malus dolgo"),
        ]);
        // Exact beats fuzzy; fuzzy takes the first stored hit.
        let m = IdentityMatcher::new(&repo).find(&IdentityInput::new("Malus dolgo", "")).unwrap();
        assert_eq!(found_name(m), "Malus dolgo");
        let m = IdentityMatcher::new(&repo).find(&IdentityInput::new("Malus 'Dolgo'", "")).unwrap();
        assert_eq!(found_name(m), "Malus dolgo 'Red'");
    }

    #[test]
    fn common_name_only_when_no_scientific() {
        let repo = repo_with(&[("Sureau", "Sambucus canadensis")]);
        let matcher = IdentityMatcher::new(&repo);
        assert_eq!(
            found_name(matcher.find(&IdentityInput::new("", "sureau")).unwrap()),
            "Sambucus canadensis"
        );
        // A scientific name that matches nothing does not fall back to common.
        assert_eq!(
            matcher.find(&IdentityInput::new("Sambucus nigra", "Sureau")).unwrap(),
            Match::NotFound
        );
    }

    #[test]
    fn empty_identity_is_an_error() {
        let repo = MemoryRepository::new();
        let err = IdentityMatcher::new(&repo).find(&IdentityInput::new(" ", "")).unwrap_err();
        assert!(matches!(err, IdentityError::MissingIdentity));
    }

    #[test]
    fn create_uses_identity_fallbacks() {
        let repo = MemoryRepository::new();
        let matcher = IdentityMatcher::new(&repo);

        let r = matcher
            .resolve_or_create(&IdentityInput::new("Corylus avellana", ""), SpeciesRecord::default())
            .unwrap();
        assert!(r.created);
        assert_eq!(r.record.common_name, "Corylus avellana");

        let r = matcher
            .resolve_or_create(&IdentityInput::new("", "Noisetier"), SpeciesRecord::default())
            .unwrap();
        assert_eq!(r.record.scientific_name, "Noisetier");
        assert!(r.record.id.is_none());
    }

    #[test]
    fn create_keeps_defaults() {
        let repo = MemoryRepository::new();
        let defaults = SpeciesRecord { family: "Rosaceae".into(), ..SpeciesRecord::default() };
        let r = IdentityMatcher::new(&repo)
            .resolve_or_create(&IdentityInput::new("Malus dolgo", "Pommetier"), defaults)
            .unwrap();
        assert_eq!(r.record.family, "Rosaceae");
        assert_eq!(r.record.common_name, "Pommetier");
    }

    #[test]
    fn backfill_richer_scientific_name() {
        let repo = repo_with(&[("Pommetier Dolgo", "Malus dolgo")]);
        let matcher = IdentityMatcher::new(&repo);
        let r = matcher
            .resolve_or_create(&IdentityInput::new("Malus 'Dolgo'", ""), SpeciesRecord::default())
            .unwrap();
        assert!(!r.created);
        assert_eq!(r.record.scientific_name, "Malus 'Dolgo'");
    }

    #[test]
    fn backfill_never_shortens() {
        let repo = repo_with(&[("Pommetier Dolgo", "Malus 'Dolgo'")]);
        let r = IdentityMatcher::new(&repo)
            .resolve_or_create(&IdentityInput::new("Malus dolgo", ""), SpeciesRecord::default())
            .unwrap();
        assert_eq!(r.record.scientific_name, "Malus 'Dolgo'");
    }

    #[test]
    fn fuzzy_match_of_another_taxon_keeps_its_name() {
        let repo = repo_with(&[("Rosier rugueux", "Rosa rugosa albana")]);
        let matcher = IdentityMatcher::new(&repo);
        let input = IdentityInput::new("Rosa rugosa subsp. 'Alba'", "");

        let r = matcher.resolve_or_create(&input, SpeciesRecord::default()).unwrap();
        assert!(!r.created);
        assert_eq!(r.record.scientific_name, "Rosa rugosa albana");

        // The stored record stays reachable under its own name.
        let again = matcher.find(&IdentityInput::new("Rosa rugosa albana", "")).unwrap();
        assert_eq!(found_name(again), "Rosa rugosa albana");
    }

    #[test]
    fn common_name_match_keeps_stored_scientific() {
        let mut repo = MemoryRepository::new();
        repo.insert_species(SpeciesRecord::new("Sureau", "")).unwrap();
        let r = IdentityMatcher::new(&repo)
            .resolve_or_create(&IdentityInput::new("", "Sureau"), SpeciesRecord::default())
            .unwrap();
        assert!(!r.created);
        assert_eq!(r.record.scientific_name, "");
    }
}
