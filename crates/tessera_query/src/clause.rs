//! # Filter Clauses
//!
//! Per-entity predicates that go beyond archetype membership. The archetype
//! filter only records which group a clause was placed in; the clause itself
//! runs later, when a [`QueryResult`](crate::QueryResult) walks its chunks.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tessera_core::{Chunk, ComponentType, EntityId};

use crate::key::ConstraintGroup;

static NEXT_CLAUSE_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a clause. Clones of a clause share it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClauseId(u64);

impl ClauseId {
    fn next() -> Self {
        Self(NEXT_CLAUSE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which groups a clause was placed into by the query that owns it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClauseMembership {
    /// Placed in the Any group.
    pub any: bool,
    /// Placed in the All group.
    pub all: bool,
    /// Placed in the None group.
    pub none: bool,
}

impl ClauseMembership {
    /// Records placement into `group`.
    pub fn mark(&mut self, group: ConstraintGroup) {
        match group {
            ConstraintGroup::Any => self.any = true,
            ConstraintGroup::All => self.all = true,
            ConstraintGroup::None => self.none = true,
        }
    }
}

type Predicate = dyn Fn(EntityId, &Chunk) -> bool + Send + Sync;

/// A named, reusable per-entity predicate.
///
/// A clause is moved (or cloned) into a query when it is listed; the query
/// sets its membership flags, so every query works on its own copy.
#[derive(Clone)]
pub struct FilterClause {
    id: ClauseId,
    name: Arc<str>,
    dependencies: Vec<ComponentType>,
    predicate: Arc<Predicate>,
    membership: ClauseMembership,
}

impl FilterClause {
    /// Creates a clause from a predicate.
    pub fn new<F>(name: impl Into<Arc<str>>, predicate: F) -> Self
    where
        F: Fn(EntityId, &Chunk) -> bool + Send + Sync + 'static,
    {
        Self {
            id: ClauseId::next(),
            name: name.into(),
            dependencies: Vec::new(),
            predicate: Arc::new(predicate),
            membership: ClauseMembership::default(),
        }
    }

    /// Declares component types this clause depends on.
    ///
    /// A clause with dependencies is read as a bundle when listed in a query:
    /// its types join the group and the predicate is not attached.
    #[must_use]
    pub fn with_dependencies<I>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = ComponentType>,
    {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    /// Identity shared by clones.
    #[must_use]
    pub fn id(&self) -> ClauseId {
        self.id
    }

    /// Name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared dependencies, if any.
    #[must_use]
    pub fn dependencies(&self) -> Option<&[ComponentType]> {
        if self.dependencies.is_empty() {
            None
        } else {
            Some(&self.dependencies)
        }
    }

    /// Groups this clause was placed into.
    #[must_use]
    pub fn membership(&self) -> ClauseMembership {
        self.membership
    }

    /// True if placed in the Any group.
    #[must_use]
    pub fn belongs_to_any(&self) -> bool {
        self.membership.any
    }

    /// True if placed in the All group.
    #[must_use]
    pub fn belongs_to_all(&self) -> bool {
        self.membership.all
    }

    /// True if placed in the None group.
    #[must_use]
    pub fn belongs_to_none(&self) -> bool {
        self.membership.none
    }

    pub(crate) fn mark(&mut self, group: ConstraintGroup) {
        self.membership.mark(group);
    }

    /// Runs the predicate for one entity.
    #[inline]
    #[must_use]
    pub fn test(&self, entity: EntityId, chunk: &Chunk) -> bool {
        (self.predicate)(entity, chunk)
    }
}

impl fmt::Debug for FilterClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterClause")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("membership", &self.membership)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::ArchetypeId;

    #[test]
    fn test_clones_share_identity() {
        let clause = FilterClause::new("even", |e, _| e.index() % 2 == 0);
        let copy = clause.clone();
        let other = FilterClause::new("even", |e, _| e.index() % 2 == 0);
        assert_eq!(clause.id(), copy.id());
        assert_ne!(clause.id(), other.id());
    }

    #[test]
    fn test_membership_flags() {
        let mut clause = FilterClause::new("any", |_, _| true);
        assert_eq!(clause.membership(), ClauseMembership::default());

        clause.mark(ConstraintGroup::All);
        clause.mark(ConstraintGroup::None);
        assert!(clause.belongs_to_all());
        assert!(clause.belongs_to_none());
        assert!(!clause.belongs_to_any());
    }

    #[test]
    fn test_predicate_runs() {
        let chunk = Chunk::with_entities(ArchetypeId::new(0), vec![EntityId::new(2, 0)]);
        let clause = FilterClause::new("even", |e, _| e.index() % 2 == 0);
        assert!(clause.test(EntityId::new(2, 0), &chunk));
        assert!(!clause.test(EntityId::new(3, 0), &chunk));
        assert_eq!(clause.dependencies(), None);
    }
}
