//! # Chunks
//!
//! Fixed-capacity runs of entities belonging to one archetype. Query results
//! walk chunks; the archetype-level filter never looks inside them.

use super::archetype::ArchetypeId;
use super::entity::EntityId;

/// A run of entities that share one archetype.
#[derive(Clone, Debug)]
pub struct Chunk {
    archetype: ArchetypeId,
    entities: Vec<EntityId>,
    capacity: usize,
}

impl Chunk {
    /// Creates an empty chunk for `archetype`.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(archetype: ArchetypeId, capacity: usize) -> Self {
        assert!(capacity > 0, "Chunk capacity must be greater than zero");
        Self {
            archetype,
            entities: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Creates a chunk holding exactly `entities`.
    #[must_use]
    pub fn with_entities(archetype: ArchetypeId, entities: Vec<EntityId>) -> Self {
        let capacity = entities.len().max(1);
        Self {
            archetype,
            entities,
            capacity,
        }
    }

    /// Opens a chunk whose first entity is `first`.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    pub(crate) fn starting_with(archetype: ArchetypeId, capacity: usize, first: EntityId) -> Self {
        let mut chunk = Self::new(archetype, capacity);
        chunk.entities.push(first);
        chunk
    }

    /// The archetype every entity in this chunk belongs to.
    #[inline]
    #[must_use]
    pub fn archetype(&self) -> ArchetypeId {
        self.archetype
    }

    /// Entities stored in this chunk, in insertion order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Number of entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Checks if empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Checks if no more entities fit.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entities.len() >= self.capacity
    }

    /// Appends an entity, handing it back if the chunk is full.
    pub(crate) fn try_push(&mut self, entity: EntityId) -> Result<(), EntityId> {
        if self.is_full() {
            return Err(entity);
        }
        self.entities.push(entity);
        Ok(())
    }
}
