//! # Constraint Groups and Cache Keys
//!
//! A cache key names the *set* of component ids in one constraint group:
//!
//! ```text
//! [Velocity#4, Position#1, Velocity#4]  ->  ",1,4"
//! [Position#1, Velocity#4]              ->  ",1,4"
//! ```
//!
//! Ids are sorted numerically and deduplicated, then each is prefixed with the
//! separator. The key says nothing about which group produced it.

use std::fmt;
use std::sync::Arc;

use tessera_core::ComponentTypeId;

/// Separator placed before every id in a key.
pub const KEY_SEPARATOR: char = ',';

/// Which constraint list an item was placed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintGroup {
    /// At least one listed type must be present.
    Any,
    /// Every listed type must be present.
    All,
    /// No listed type may be present.
    None,
}

impl fmt::Display for ConstraintGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Any => "Any",
            Self::All => "All",
            Self::None => "None",
        })
    }
}

/// Order- and duplicate-independent name for a set of component ids.
///
/// Immutable once built; clones share the same allocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Arc<str>);

impl CacheKey {
    /// Derives the key for a set of ids.
    ///
    /// Returns `None` for an empty set: a group without component types has
    /// no key.
    #[must_use]
    pub fn from_ids<I>(ids: I) -> Option<Self>
    where
        I: IntoIterator<Item = ComponentTypeId>,
    {
        let mut ids: Vec<u32> = ids.into_iter().map(ComponentTypeId::raw).collect();
        if ids.is_empty() {
            return None;
        }
        ids.sort_unstable();
        ids.dedup();

        let mut key = String::with_capacity(ids.len() * 4);
        for id in ids {
            key.push(KEY_SEPARATOR);
            key.push_str(&id.to_string());
        }
        Some(Self(key.into()))
    }

    /// The key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
