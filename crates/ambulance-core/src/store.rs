//! Arena-style record store.
//!
//! Records live in insertion order in a `Vec`, with a `BTreeMap` from id to
//! slot for lookups. Listing is therefore stable for the life of the
//! process, which the first-available ambulance policy and the active
//! patient lookup both rely on. Records are replaced in place on save and
//! never removed.

use std::collections::BTreeMap;

use ambulance_types::{Ambulance, AmbulanceId, Hospital, HospitalId, Patient, PatientId};

/// A record that can be stored in an [`Arena`].
pub trait Record: Clone {
    /// Identifier type.
    type Id: Copy + Ord;

    /// The record's identifier.
    fn id(&self) -> Self::Id;
}

impl Record for Patient {
    type Id = PatientId;

    fn id(&self) -> PatientId {
        self.id
    }
}

impl Record for Ambulance {
    type Id = AmbulanceId;

    fn id(&self) -> AmbulanceId {
        self.id
    }
}

impl Record for Hospital {
    type Id = HospitalId;

    fn id(&self) -> HospitalId {
        self.id
    }
}

/// Insertion-ordered storage for one record type.
#[derive(Debug, Clone)]
pub struct Arena<R: Record> {
    slots: Vec<R>,
    index: BTreeMap<R::Id, usize>,
}

impl<R: Record> Default for Arena<R> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: BTreeMap::new(),
        }
    }
}

impl<R: Record> Arena<R> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record by id.
    pub fn get(&self, id: R::Id) -> Option<&R> {
        self.index.get(&id).and_then(|&slot| self.slots.get(slot))
    }

    /// Look up a record by id for in-place mutation.
    pub fn get_mut(&mut self, id: R::Id) -> Option<&mut R> {
        let slot = *self.index.get(&id)?;
        self.slots.get_mut(slot)
    }

    /// Insert a new record or replace the existing one with the same id.
    ///
    /// Replacing keeps the record's original position in list order.
    pub fn save(&mut self, record: R) {
        let id = record.id();
        if let Some(existing) = self.get_mut(id) {
            *existing = record;
        } else {
            self.index.insert(id, self.slots.len());
            self.slots.push(record);
        }
    }

    /// Iterate over all records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.slots.iter()
    }

    /// Iterate mutably over all records in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut R> {
        self.slots.iter_mut()
    }

    /// All identifiers in insertion order.
    pub fn ids(&self) -> Vec<R::Id> {
        self.slots.iter().map(Record::id).collect()
    }

    /// Clone every record, in insertion order.
    pub fn list(&self) -> Vec<R> {
        self.slots.clone()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the arena holds no records.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// The authoritative simulation state for patients, ambulances, and
/// hospitals.
///
/// Exactly one owner mutates a `Store` at a time; in a running engine that
/// owner is the dispatch service task.
#[derive(Debug, Clone, Default)]
pub struct Store {
    /// Patients in intake order.
    pub patients: Arena<Patient>,
    /// Ambulances in fleet order.
    pub ambulances: Arena<Ambulance>,
    /// Hospitals in registration order.
    pub hospitals: Arena<Hospital>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with a fleet and hospitals.
    pub fn with_fleet(
        ambulances: impl IntoIterator<Item = Ambulance>,
        hospitals: impl IntoIterator<Item = Hospital>,
    ) -> Self {
        let mut store = Self::new();
        for ambulance in ambulances {
            store.ambulances.save(ambulance);
        }
        for hospital in hospitals {
            store.hospitals.save(hospital);
        }
        store
    }
}
