//! Write overlay on top of a read-only repository.
//!
//! Inserts and updates land in the overlay; reads see the overlay first and
//! fall through to the base. Dry runs import into one so that later rows of
//! the same file resolve against records staged by earlier rows, exactly as
//! they would against the real store.
//!
//! Staged inserts get negative ids so they can never collide with stored rows.

use std::collections::BTreeMap;

use crate::repo::{SeedLotRepository, SpeciesQuery, SpeciesRepository, StoreError};
use crate::seed::{SeedLot, SeedLotId};
use crate::species::{SpeciesId, SpeciesRecord};

pub struct StagedRepository<'r, R> {
    base: &'r R,
    updated: BTreeMap<SpeciesId, SpeciesRecord>,
    inserted: Vec<SpeciesRecord>,
    updated_lots: BTreeMap<SeedLotId, SeedLot>,
    inserted_lots: Vec<SeedLot>,
}

impl<'r, R> StagedRepository<'r, R>
where
    R: SpeciesQuery + SeedLotRepository,
{
    pub fn new(base: &'r R) -> Self {
        Self {
            base,
            updated: BTreeMap::new(),
            inserted: Vec::new(),
            updated_lots: BTreeMap::new(),
            inserted_lots: Vec::new(),
        }
    }

    /// Number of species writes held in the overlay.
    pub fn staged_species(&self) -> usize {
        self.updated.len() + self.inserted.len()
    }

    fn staged(&self, id: SpeciesId) -> Option<&SpeciesRecord> {
        self.updated
            .get(&id)
            .or_else(|| self.inserted.iter().find(|r| r.id == Some(id)))
    }

    fn with_lot_override(&self, lot: SeedLot) -> SeedLot {
        match lot.id.and_then(|id| self.updated_lots.get(&id)) {
            Some(staged) => staged.clone(),
            None => lot,
        }
    }
}

impl<R> SpeciesQuery for StagedRepository<'_, R>
where
    R: SpeciesQuery + SeedLotRepository,
{
    fn species(&self, id: SpeciesId) -> Result<Option<SpeciesRecord>, StoreError> {
        match self.staged(id) {
            Some(record) => Ok(Some(record.clone())),
            None => self.base.species(id),
        }
    }

    fn find_by_scientific_name(&self, name: &str) -> Result<Option<SpeciesRecord>, StoreError> {
        let needle = name.to_lowercase();
        for (id, stored) in self.scientific_names()? {
            if stored.to_lowercase() == needle {
                return self.species(id);
            }
        }
        Ok(None)
    }

    fn find_by_common_name(&self, name: &str) -> Result<Option<SpeciesRecord>, StoreError> {
        let needle = name.to_lowercase();
        let matches = |r: &SpeciesRecord| r.common_name.to_lowercase() == needle;

        if let Some(hit) = self.base.find_by_common_name(name)? {
            match hit.id.and_then(|id| self.updated.get(&id)) {
                None => return Ok(Some(hit)),
                Some(staged) if matches(staged) => return Ok(Some(staged.clone())),
                // Renamed in the overlay; look further.
                Some(_) => {}
            }
        }
        Ok(self
            .updated
            .values()
            .chain(&self.inserted)
            .find(|r| matches(r))
            .cloned())
    }

    fn scientific_names(&self) -> Result<Vec<(SpeciesId, String)>, StoreError> {
        let mut names: Vec<(SpeciesId, String)> = self
            .base
            .scientific_names()?
            .into_iter()
            .map(|(id, name)| match self.updated.get(&id) {
                Some(staged) => (id, staged.scientific_name.clone()),
                None => (id, name),
            })
            .collect();
        names.extend(
            self.inserted
                .iter()
                .filter_map(|r| r.id.map(|id| (id, r.scientific_name.clone()))),
        );
        Ok(names)
    }

    fn count_species(&self) -> Result<usize, StoreError> {
        Ok(self.base.count_species()? + self.inserted.len())
    }
}

impl<R> SpeciesRepository for StagedRepository<'_, R>
where
    R: SpeciesQuery + SeedLotRepository,
{
    fn insert_species(&mut self, mut record: SpeciesRecord) -> Result<SpeciesRecord, StoreError> {
        record.id = Some(SpeciesId(-(self.inserted.len() as i64) - 1));
        self.inserted.push(record.clone());
        Ok(record)
    }

    fn update_species(&mut self, record: &SpeciesRecord) -> Result<(), StoreError> {
        let id = record
            .id
            .ok_or_else(|| StoreError::MissingRecord(record.display_name()))?;
        if let Some(slot) = self.inserted.iter_mut().find(|r| r.id == Some(id)) {
            *slot = record.clone();
            return Ok(());
        }
        if !self.updated.contains_key(&id) && self.base.species(id)?.is_none() {
            return Err(StoreError::MissingRecord(record.display_name()));
        }
        self.updated.insert(id, record.clone());
        Ok(())
    }
}

impl<R> SeedLotRepository for StagedRepository<'_, R>
where
    R: SpeciesQuery + SeedLotRepository,
{
    fn find_seed_lot(
        &self,
        species: SpeciesId,
        variety: &str,
        lot_reference: &str,
    ) -> Result<Option<SeedLot>, StoreError> {
        if let Some(hit) = self.base.find_seed_lot(species, variety, lot_reference)? {
            return Ok(Some(self.with_lot_override(hit)));
        }
        Ok(self
            .inserted_lots
            .iter()
            .find(|l| {
                l.species_id == Some(species)
                    && l.variety == variety
                    && l.lot_reference == lot_reference
            })
            .cloned())
    }

    fn insert_seed_lot(&mut self, mut lot: SeedLot) -> Result<SeedLot, StoreError> {
        lot.id = Some(SeedLotId(-(self.inserted_lots.len() as i64) - 1));
        self.inserted_lots.push(lot.clone());
        Ok(lot)
    }

    fn update_seed_lot(&mut self, lot: &SeedLot) -> Result<(), StoreError> {
        let id = lot
            .id
            .ok_or_else(|| StoreError::MissingRecord("seed lot without id".into()))?;
        if let Some(slot) = self.inserted_lots.iter_mut().find(|l| l.id == Some(id)) {
            *slot = lot.clone();
        } else {
            self.updated_lots.insert(id, lot.clone());
        }
        Ok(())
    }

    fn seed_lots_for(&self, species: SpeciesId) -> Result<Vec<SeedLot>, StoreError> {
        let mut lots: Vec<SeedLot> = self
            .base
            .seed_lots_for(species)?
            .into_iter()
            .map(|l| self.with_lot_override(l))
            .collect();
        lots.extend(
            self.inserted_lots
                .iter()
                .filter(|l| l.species_id == Some(species))
                .cloned(),
        );
        Ok(lots)
    }
}
