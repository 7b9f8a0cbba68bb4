//! # Entity Component System Primitives
//!
//! The pieces of the ECS the query layer talks to:
//!
//! - Component types and the registry that numbers them
//! - Archetypes, their signatures and the arena that owns them
//! - Entity ids and the chunks that hold them

pub mod archetype;
mod chunk;
mod component;
mod entity;
mod registry;
mod store;

pub use archetype::{Archetype, ArchetypeId, ArchetypeSignature, ArchetypeView, ComponentMask};
pub use chunk::Chunk;
pub use component::{Component, ComponentKind, ComponentType, ComponentTypeId};
pub use entity::EntityId;
pub use registry::{ComponentRegistry, MAX_COMPONENT_TYPES};
pub use store::{ArchetypeStore, DEFAULT_CHUNK_CAPACITY};
