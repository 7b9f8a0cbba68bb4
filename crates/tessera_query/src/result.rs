//! # Query Results
//!
//! The chunks of every archetype a query matched, plus the query's clauses.
//! Archetype filtering is already done by the time one of these exists; what
//! is left is running clauses per entity.

use tessera_core::{Chunk, EntityId};

use crate::clause::FilterClause;

/// Entities selected by a query.
#[derive(Clone, Debug)]
pub struct QueryResult<'a> {
    chunks: Vec<&'a Chunk>,
    clauses: Option<&'a [FilterClause]>,
}

impl<'a> QueryResult<'a> {
    /// Pairs chunks with the clauses that filter their entities.
    #[must_use]
    pub fn new(chunks: Vec<&'a Chunk>, clauses: Option<&'a [FilterClause]>) -> Self {
        Self { chunks, clauses }
    }

    /// The chunks being walked.
    #[must_use]
    pub fn chunks(&self) -> &[&'a Chunk] {
        &self.chunks
    }

    /// The clauses applied per entity, if the query had any.
    #[must_use]
    pub fn clauses(&self) -> Option<&'a [FilterClause]> {
        self.clauses
    }

    /// Whether one entity passes the clauses.
    ///
    /// Every All clause must pass, no None clause may pass, and if there are
    /// Any clauses at least one must pass.
    fn admits(&self, entity: EntityId, chunk: &Chunk) -> bool {
        let Some(clauses) = self.clauses else {
            return true;
        };

        let mut has_any = false;
        let mut any_passed = false;
        for clause in clauses {
            let membership = clause.membership();
            if !(membership.all || membership.none || membership.any) {
                continue;
            }
            let passed = clause.test(entity, chunk);
            if membership.all && !passed {
                return false;
            }
            if membership.none && passed {
                return false;
            }
            if membership.any {
                has_any = true;
                any_passed |= passed;
            }
        }
        !has_any || any_passed
    }

    /// Iterates over selected entities, chunk by chunk.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.chunks.iter().flat_map(move |chunk| {
            chunk
                .entities()
                .iter()
                .copied()
                .filter(move |&entity| self.admits(entity, chunk))
        })
    }

    /// Number of selected entities. Runs every clause.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Checks if no entity is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ConstraintGroup;
    use tessera_core::ArchetypeId;

    fn chunk(range: std::ops::Range<u32>) -> Chunk {
        Chunk::with_entities(ArchetypeId::new(0), range.map(|i| EntityId::new(i, 0)).collect())
    }

    fn flagged(name: &str, group: ConstraintGroup, predicate: fn(EntityId) -> bool) -> FilterClause {
        let mut clause = FilterClause::new(name, move |e, _| predicate(e));
        clause.mark(group);
        clause
    }

    fn indices(result: &QueryResult<'_>) -> Vec<u32> {
        result.iter().map(EntityId::index).collect()
    }

    #[test]
    fn test_no_clauses_yields_everything() {
        let a = chunk(0..3);
        let b = chunk(10..12);
        let result = QueryResult::new(vec![&a, &b], None);
        assert_eq!(indices(&result), vec![0, 1, 2, 10, 11]);
        assert_eq!(result.chunks().len(), 2);
    }

    #[test]
    fn test_all_and_none_clauses() {
        let c = chunk(0..10);
        let clauses = vec![
            flagged("even", ConstraintGroup::All, |e| e.index() % 2 == 0),
            flagged("div4", ConstraintGroup::None, |e| e.index() % 4 == 0),
        ];
        let result = QueryResult::new(vec![&c], Some(clauses.as_slice()));
        assert_eq!(indices(&result), vec![2, 6]);
    }

    #[test]
    fn test_any_clauses_need_one_pass() {
        let c = chunk(0..10);
        let clauses = vec![
            flagged("is3", ConstraintGroup::Any, |e| e.index() == 3),
            flagged("is7", ConstraintGroup::Any, |e| e.index() == 7),
        ];
        let result = QueryResult::new(vec![&c], Some(clauses.as_slice()));
        assert_eq!(indices(&result), vec![3, 7]);
        assert_eq!(result.len(), 2);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_empty_chunks() {
        let result = QueryResult::new(Vec::new(), None);
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
    }
}
