//! # Queries
//!
//! A [`Query`] is built once, usually kept by the system that owns it, and
//! asked about many archetypes over its lifetime.
//!
//! ## Matching
//!
//! ```text
//! matches(archetype)
//!   ├─ local cache hit?            -> answer
//!   ├─ None group: any listed type present?   -> false
//!   ├─ Any group:  no listed type present?    -> false
//!   ├─ All group:  every listed type present? -> answer
//!   └─ no group has a key                     -> true
//! ```
//!
//! Each group outcome comes from the shared [`MatchCache`] when some query
//! already asked about the same component set on the same archetype; the
//! archetype is only scanned on a miss.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tessera_core::{ArchetypeId, ArchetypeView, Chunk, ComponentTypeId};
use tracing::debug;

use crate::cache::MatchCache;
use crate::clause::FilterClause;
use crate::config::QueryConfig;
use crate::error::BuildResult;
use crate::item::QueryItem;
use crate::key::{CacheKey, ConstraintGroup};
use crate::parse::{parse_group, parse_group_lenient, ParsedGroup};
use crate::result::QueryResult;

/// Accumulates constraint lists until [`QueryBuilder::build`].
///
/// Each of `all`/`any`/`none` replaces the list for its group.
#[derive(Clone, Debug, Default)]
pub struct QueryBuilder {
    all: Vec<QueryItem>,
    any: Vec<QueryItem>,
    none: Vec<QueryItem>,
    config: QueryConfig,
}

impl QueryBuilder {
    /// Creates a builder with no constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the items every matching archetype must have.
    #[must_use]
    pub fn all<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<QueryItem>,
    {
        self.all = items.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the items of which a matching archetype needs at least one.
    #[must_use]
    pub fn any<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<QueryItem>,
    {
        self.any = items.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the items no matching archetype may have.
    #[must_use]
    pub fn none<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<QueryItem>,
    {
        self.none = items.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the configuration queries are built with.
    #[must_use]
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds a query against `cache`, dropping unusable entries.
    ///
    /// Every call yields an independent query.
    #[must_use]
    pub fn build(&self, cache: &Arc<MatchCache>) -> Query {
        let mut clauses = Vec::new();
        let any = parse_group_lenient(&self.any, ConstraintGroup::Any, &mut clauses);
        let all = parse_group_lenient(&self.all, ConstraintGroup::All, &mut clauses);
        let none = parse_group_lenient(&self.none, ConstraintGroup::None, &mut clauses);
        self.finish(cache, all, any, none, clauses)
    }

    /// Builds a query against `cache`, honoring the configured validation.
    ///
    /// # Errors
    ///
    /// With [`Validation::Strict`](crate::Validation::Strict), returns
    /// [`QueryError::UnrecognizedEntry`](crate::QueryError::UnrecognizedEntry)
    /// for the first entry lenient parsing would have dropped.
    pub fn try_build(&self, cache: &Arc<MatchCache>) -> BuildResult<Query> {
        let validation = self.config.validation;
        let mut clauses = Vec::new();
        let any = parse_group(&self.any, ConstraintGroup::Any, validation, &mut clauses)?;
        let all = parse_group(&self.all, ConstraintGroup::All, validation, &mut clauses)?;
        let none = parse_group(&self.none, ConstraintGroup::None, validation, &mut clauses)?;
        Ok(self.finish(cache, all, any, none, clauses))
    }

    fn finish(
        &self,
        cache: &Arc<MatchCache>,
        all: ParsedGroup,
        any: ParsedGroup,
        none: ParsedGroup,
        clauses: Vec<FilterClause>,
    ) -> Query {

        debug!(
            all = ?all.key,
            any = ?any.key,
            none = ?none.key,
            clauses = clauses.len(),
            "built query"
        );

        Query {
            all,
            any,
            none,
            clauses,
            cache: Arc::clone(cache),
            local: RwLock::new(LocalVerdicts {
                epoch: cache.epoch(),
                verdicts: HashMap::new(),
            }),
            reuse_all_results_for_any: self.config.reuse_all_results_for_any,
            local_cache: self.config.local_cache,
        }
    }
}

/// Verdicts of one query, valid while the shared cache stays at `epoch`.
#[derive(Debug)]
struct LocalVerdicts {
    epoch: u64,
    verdicts: HashMap<ArchetypeId, bool>,
}

/// An archetype filter with a two-level match cache.
///
/// Immutable after construction except for its local cache. The local cache
/// is dropped whenever the shared cache evicts, so verdicts for retired
/// archetypes do not outlive them.
///
/// # Preconditions
///
/// Archetypes passed to [`Query::matches`] must never change composition
/// under the same [`ArchetypeId`]. Violating this yields stale answers; it is
/// not detected.
#[derive(Debug)]
pub struct Query {
    all: ParsedGroup,
    any: ParsedGroup,
    none: ParsedGroup,
    clauses: Vec<FilterClause>,
    cache: Arc<MatchCache>,
    local: RwLock<LocalVerdicts>,
    reuse_all_results_for_any: bool,
    local_cache: bool,
}

impl Query {
    /// Starts a builder with an All list.
    pub fn all<I>(items: I) -> QueryBuilder
    where
        I: IntoIterator,
        I::Item: Into<QueryItem>,
    {
        QueryBuilder::new().all(items)
    }

    /// Starts a builder with an Any list.
    pub fn any<I>(items: I) -> QueryBuilder
    where
        I: IntoIterator,
        I::Item: Into<QueryItem>,
    {
        QueryBuilder::new().any(items)
    }

    /// Starts a builder with a None list.
    pub fn none<I>(items: I) -> QueryBuilder
    where
        I: IntoIterator,
        I::Item: Into<QueryItem>,
    {
        QueryBuilder::new().none(items)
    }

    fn group(&self, group: ConstraintGroup) -> &ParsedGroup {
        match group {
            ConstraintGroup::Any => &self.any,
            ConstraintGroup::All => &self.all,
            ConstraintGroup::None => &self.none,
        }
    }

    /// Cache key of a group, `None` if it lists no component types.
    #[must_use]
    pub fn key(&self, group: ConstraintGroup) -> Option<&CacheKey> {
        self.group(group).key.as_ref()
    }

    /// Distinct component ids of a group in first-listed order.
    #[must_use]
    pub fn types(&self, group: ConstraintGroup) -> &[ComponentTypeId] {
        &self.group(group).types
    }

    /// Clauses from all three groups, flagged with their membership.
    #[must_use]
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    /// The shared cache this query reads and fills.
    #[must_use]
    pub fn cache(&self) -> &Arc<MatchCache> {
        &self.cache
    }

    /// Forgets every locally cached verdict. The shared cache is untouched.
    pub fn invalidate_local_cache(&self) {
        self.local.write().verdicts.clear();
    }

    /// Number of archetypes with a locally cached verdict.
    #[must_use]
    pub fn local_cache_len(&self) -> usize {
        self.sync_local();
        self.local.read().verdicts.len()
    }

    /// Drops local verdicts recorded before the latest eviction and returns
    /// the current epoch.
    fn sync_local(&self) -> u64 {
        let epoch = self.cache.epoch();
        if self.local.read().epoch < epoch {
            let mut local = self.local.write();
            if local.epoch < epoch {
                local.verdicts.clear();
                local.epoch = epoch;
            }
        }
        epoch
    }

    /// Whether `archetype` satisfies this query.
    ///
    /// None is checked first and always wins. When an All group exists its
    /// outcome is the verdict. A query with no component constraints matches
    /// every archetype.
    pub fn matches<A>(&self, archetype: &A) -> bool
    where
        A: ArchetypeView + ?Sized,
    {
        let id = archetype.id();
        let epoch = if self.local_cache {
            let epoch = self.sync_local();
            if let Some(&verdict) = self.local.read().verdicts.get(&id) {
                return verdict;
            }
            epoch
        } else {
            0
        };

        self.cache.bootstrap(id);

        if let Some(key) = &self.none.key {
            let valid = self.cache.get_or_compute(id, ConstraintGroup::None, key, || {
                !self.none.types.iter().any(|&ty| archetype.has(ty))
            });
            if !valid {
                return self.remember(id, epoch, false);
            }
        }

        if let Some(key) = &self.any.key {
            let valid = self.cache.get_or_compute(id, ConstraintGroup::Any, key, || {
                // Every type of a set present implies some type of it present.
                let all_known_valid = self.reuse_all_results_for_any
                    && self.cache.lookup(id, ConstraintGroup::All, key) == Some(true);
                all_known_valid || self.any.types.iter().any(|&ty| archetype.has(ty))
            });
            if !valid {
                return self.remember(id, epoch, false);
            }
        }

        if let Some(key) = &self.all.key {
            let valid = self.cache.get_or_compute(id, ConstraintGroup::All, key, || {
                self.all.types.iter().all(|&ty| archetype.has(ty))
            });
            return self.remember(id, epoch, valid);
        }

        self.remember(id, epoch, true)
    }

    fn remember(&self, archetype: ArchetypeId, epoch: u64, verdict: bool) -> bool {
        if self.local_cache {
            let mut local = self.local.write();
            // An eviction landed mid-match; the archetype may be gone.
            if local.epoch == epoch {
                local.verdicts.insert(archetype, verdict);
            }
        }
        verdict
    }

    /// Wraps `chunks` together with this query's clauses for iteration.
    ///
    /// The chunks are expected to come from archetypes this query matched.
    pub fn result<'a, I>(&'a self, chunks: I) -> QueryResult<'a>
    where
        I: IntoIterator<Item = &'a Chunk>,
    {
        let clauses = if self.clauses.is_empty() {
            None
        } else {
            Some(self.clauses.as_slice())
        };
        QueryResult::new(chunks.into_iter().collect(), clauses)
    }
}
