//! # Tessera Core
//!
//! The ECS collaborators the query engine is built on:
//! - Component types with stable numeric ids
//! - Immutable-composition archetypes with O(1) `has`
//! - Chunks of entity ids for result iteration
//!
//! ## Architecture Rules
//!
//! 1. **Archetypes never change composition** - a new composition is a new archetype
//! 2. **Handles, not references** - archetypes are addressed by [`ArchetypeId`]
//! 3. **Ids are stable** - a component id or archetype handle never changes meaning
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{ArchetypeStore, ComponentRegistry};
//!
//! let mut registry = ComponentRegistry::new();
//! let pos = registry.register::<Position>("Position")?;
//! let mut store = ArchetypeStore::default();
//! let id = store.get_or_insert([pos.id()].into_iter().collect());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;

pub use ecs::{
    Archetype, ArchetypeId, ArchetypeSignature, ArchetypeStore, ArchetypeView, Chunk,
    Component, ComponentKind, ComponentMask, ComponentRegistry, ComponentType, ComponentTypeId,
    EntityId, DEFAULT_CHUNK_CAPACITY, MAX_COMPONENT_TYPES,
};
pub use error::{RegistryError, RegistryResult};
