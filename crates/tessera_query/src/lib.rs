//! # Tessera Query
//!
//! Archetype filters with a two-level match cache.
//!
//! A query lists component types in three groups:
//! - **All**: every type must be present
//! - **Any**: at least one type must be present
//! - **None**: no type may be present
//!
//! Deciding whether an archetype qualifies runs every tick for every
//! archetype, so answers are cached twice:
//!
//! 1. **Per query** - archetype -> verdict
//! 2. **Per world** - archetype -> group -> component-set key -> outcome,
//!    shared by every query asking about the same set
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_query::{Query, World};
//!
//! let mut world = World::default();
//! let pos = world.registry_mut().register::<Position>("Position")?;
//! let vel = world.registry_mut().register::<Velocity>("Velocity")?;
//! let frozen = world.registry_mut().register::<Frozen>("Frozen")?;
//!
//! let movers = Query::all([pos, vel]).none([frozen]).build(world.cache());
//! for entity in world.run(&movers).iter() {
//!     // ...
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod cache;
pub mod clause;
pub mod config;
pub mod error;
pub mod item;
pub mod key;
pub mod parse;
pub mod query;
pub mod result;
pub mod world;

pub use cache::{CacheStats, MatchCache};
pub use clause::{ClauseId, ClauseMembership, FilterClause};
pub use config::{QueryConfig, Validation};
pub use error::{BuildResult, QueryError};
pub use item::{Bundle, BundleId, QueryItem};
pub use key::{CacheKey, ConstraintGroup, KEY_SEPARATOR};
pub use query::{Query, QueryBuilder};
pub use result::QueryResult;
pub use world::World;
