//! # Archetype Store
//!
//! Arena of archetypes addressed by [`ArchetypeId`] handles. One archetype per
//! distinct signature. Retired slots stay empty so a handle never comes to
//! denote a different composition.

use std::collections::HashMap;

use tracing::debug;

use super::archetype::{Archetype, ArchetypeId, ArchetypeSignature};

/// Default number of entities per chunk.
pub const DEFAULT_CHUNK_CAPACITY: usize = 128;

/// Arena of archetypes.
#[derive(Debug)]
pub struct ArchetypeStore {
    /// Slots indexed by handle. `None` once retired.
    slots: Vec<Option<Archetype>>,
    /// Signature to live handle.
    by_signature: HashMap<ArchetypeSignature, ArchetypeId>,
    /// Entities per chunk for new archetypes.
    chunk_capacity: usize,
}

impl Default for ArchetypeStore {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_CAPACITY)
    }
}

impl ArchetypeStore {
    /// Creates an empty store.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_capacity` is zero.
    #[must_use]
    pub fn new(chunk_capacity: usize) -> Self {
        assert!(chunk_capacity > 0, "Chunk capacity must be greater than zero");
        Self {
            slots: Vec::new(),
            by_signature: HashMap::new(),
            chunk_capacity,
        }
    }

    /// Returns the archetype for `signature`, creating it on first sight.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` archetypes are ever created.
    pub fn get_or_insert(&mut self, signature: ArchetypeSignature) -> ArchetypeId {
        if let Some(&id) = self.by_signature.get(&signature) {
            return id;
        }

        let raw = u32::try_from(self.slots.len()).expect("archetype handle space exhausted");
        let id = ArchetypeId::new(raw);
        debug!(archetype = %id, components = signature.len(), "created archetype");
        self.by_signature.insert(signature.clone(), id);
        self.slots.push(Some(Archetype::new(id, signature, self.chunk_capacity)));
        id
    }

    /// Looks up the live archetype for `signature`.
    #[must_use]
    pub fn find(&self, signature: &ArchetypeSignature) -> Option<ArchetypeId> {
        self.by_signature.get(signature).copied()
    }

    /// Gets a live archetype.
    #[inline]
    #[must_use]
    pub fn get(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.slots.get(id.index())?.as_ref()
    }

    /// Gets a live archetype mutably.
    #[inline]
    pub fn get_mut(&mut self, id: ArchetypeId) -> Option<&mut Archetype> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Removes an archetype. Its handle is never handed out again.
    ///
    /// A later `get_or_insert` with the same signature creates a new archetype
    /// under a new handle.
    pub fn retire(&mut self, id: ArchetypeId) -> Option<Archetype> {
        let archetype = self.slots.get_mut(id.index())?.take()?;
        self.by_signature.remove(archetype.signature());
        debug!(archetype = %id, "retired archetype");
        Some(archetype)
    }

    /// Number of live archetypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_signature.len()
    }

    /// Checks if no archetype is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_signature.is_empty()
    }

    /// Iterates over live archetypes in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}
