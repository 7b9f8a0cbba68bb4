//! # Query World
//!
//! Owns the component registry, the archetype arena and the one
//! [`MatchCache`] every query of this world shares. Separate worlds never see
//! each other's cache entries.

use std::sync::Arc;

use tessera_core::{
    ArchetypeId, ArchetypeSignature, ArchetypeStore, ArchetypeView, ComponentRegistry, EntityId,
};
use tracing::debug;

use crate::cache::MatchCache;
use crate::config::QueryConfig;
use crate::error::BuildResult;
use crate::query::{Query, QueryBuilder};
use crate::result::QueryResult;

/// A set of archetypes plus the shared cache queries run against.
#[derive(Debug)]
pub struct World {
    registry: ComponentRegistry,
    archetypes: ArchetypeStore,
    cache: Arc<MatchCache>,
    config: QueryConfig,
    next_entity: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::with_valid_config(QueryConfig::default())
    }
}

impl World {
    /// Creates an empty world.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`](crate::QueryError::Config) if `config`
    /// has a zero chunk capacity.
    pub fn new(config: QueryConfig) -> BuildResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: QueryConfig) -> Self {
        Self {
            registry: ComponentRegistry::new(),
            archetypes: ArchetypeStore::new(config.chunk_capacity),
            cache: Arc::new(MatchCache::new()),
            config,
            next_entity: 0,
        }
    }

    /// The component registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// The component registry, for registering types.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// The archetype arena.
    #[must_use]
    pub fn archetypes(&self) -> &ArchetypeStore {
        &self.archetypes
    }

    /// The cache shared by this world's queries.
    #[must_use]
    pub fn cache(&self) -> &Arc<MatchCache> {
        &self.cache
    }

    /// The configuration this world was created with.
    #[must_use]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// A query builder carrying this world's configuration.
    #[must_use]
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new().with_config(self.config.clone())
    }

    /// Places a new entity into the archetype for `signature`.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` entities are spawned.
    pub fn spawn_into(&mut self, signature: ArchetypeSignature) -> EntityId {
        let entity = EntityId::new(self.next_entity, 0);
        self.next_entity = self
            .next_entity
            .checked_add(1)
            .expect("entity index space exhausted");

        let archetype = self.archetypes.get_or_insert(signature);
        if let Some(archetype) = self.archetypes.get_mut(archetype) {
            archetype.push_entity(entity);
        }
        entity
    }

    /// Archetypes `query` matches, in handle order.
    pub fn matching_archetypes(&self, query: &Query) -> Vec<ArchetypeId> {
        self.archetypes
            .iter()
            .filter(|archetype| query.matches(*archetype))
            .map(ArchetypeView::id)
            .collect()
    }

    /// Runs `query` over every archetype and returns the matching chunks.
    pub fn run<'a>(&'a self, query: &'a Query) -> QueryResult<'a> {
        let chunks = self
            .archetypes
            .iter()
            .filter(|archetype| query.matches(*archetype))
            .flat_map(|archetype| archetype.chunks());
        query.result(chunks)
    }

    /// Destroys an archetype and evicts its shared cache entries.
    ///
    /// Returns whether the archetype existed.
    pub fn retire_archetype(&mut self, id: ArchetypeId) -> bool {
        let Some(archetype) = self.archetypes.retire(id) else {
            return false;
        };
        self.cache.evict(id);
        debug!(archetype = %id, entities = archetype.len(), "retired archetype from world");
        true
    }
}
