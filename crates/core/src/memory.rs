use crate::repo::{SeedLotRepository, SpeciesQuery, SpeciesRepository, StoreError};
use crate::seed::{SeedLot, SeedLotId};
use crate::species::{SpeciesId, SpeciesRecord};

/// In-process repository. Insertion order is id order.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    species: Vec<SpeciesRecord>,
    seed_lots: Vec<SeedLot>,
    next_species: i64,
    next_lot: i64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all_species(&self) -> &[SpeciesRecord] {
        &self.species
    }

    pub fn all_seed_lots(&self) -> &[SeedLot] {
        &self.seed_lots
    }

    fn first_where(&self, pred: impl Fn(&SpeciesRecord) -> bool) -> Option<SpeciesRecord> {
        self.species.iter().find(|r| pred(r)).cloned()
    }
}

impl SpeciesQuery for MemoryRepository {
    fn species(&self, id: SpeciesId) -> Result<Option<SpeciesRecord>, StoreError> {
        Ok(self.first_where(|r| r.id == Some(id)))
    }

    fn find_by_scientific_name(&self, name: &str) -> Result<Option<SpeciesRecord>, StoreError> {
        let needle = name.to_lowercase();
        Ok(self.first_where(|r| r.scientific_name.to_lowercase() == needle))
    }

    fn find_by_common_name(&self, name: &str) -> Result<Option<SpeciesRecord>, StoreError> {
        let needle = name.to_lowercase();
        Ok(self.first_where(|r| r.common_name.to_lowercase() == needle))
    }

    fn scientific_names(&self) -> Result<Vec<(SpeciesId, String)>, StoreError> {
        Ok(self
            .species
            .iter()
            .filter_map(|r| r.id.map(|id| (id, r.scientific_name.clone())))
            .collect())
    }

    fn count_species(&self) -> Result<usize, StoreError> {
        Ok(self.species.len())
    }
}

impl SpeciesRepository for MemoryRepository {
    fn insert_species(&mut self, mut record: SpeciesRecord) -> Result<SpeciesRecord, StoreError> {
        self.next_species += 1;
        record.id = Some(SpeciesId(self.next_species));
        self.species.push(record.clone());
        Ok(record)
    }

    fn update_species(&mut self, record: &SpeciesRecord) -> Result<(), StoreError> {
        let slot = self
            .species
            .iter_mut()
            .find(|r| r.id.is_some() && r.id == record.id)
            .ok_or_else(|| StoreError::MissingRecord(record.display_name()))?;
        *slot = record.clone();
        Ok(())
    }
}

impl SeedLotRepository for MemoryRepository {
    fn find_seed_lot(
        &self,
        species: SpeciesId,
        variety: &str,
        lot_reference: &str,
    ) -> Result<Option<SeedLot>, StoreError> {
        Ok(self
            .seed_lots
            .iter()
            .find(|l| {
                l.species_id == Some(species)
                    && l.variety == variety
                    && l.lot_reference == lot_reference
            })
            .cloned())
    }

    fn insert_seed_lot(&mut self, mut lot: SeedLot) -> Result<SeedLot, StoreError> {
        self.next_lot += 1;
        lot.id = Some(SeedLotId(self.next_lot));
        self.seed_lots.push(lot.clone());
        Ok(lot)
    }

    fn update_seed_lot(&mut self, lot: &SeedLot) -> Result<(), StoreError> {
        let slot = self
            .seed_lots
            .iter_mut()
            .find(|l| l.id.is_some() && l.id == lot.id)
            .ok_or_else(|| StoreError::MissingRecord(format!("seed lot {:?}", lot.id)))?;
        *slot = lot.clone();
        Ok(())
    }

    fn seed_lots_for(&self, species: SpeciesId) -> Result<Vec<SeedLot>, StoreError> {
        Ok(self
            .seed_lots
            .iter()
            .filter(|l| l.species_id == Some(species))
            .cloned()
            .collect())
    }
}
