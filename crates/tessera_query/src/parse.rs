//! # Constraint Parsing
//!
//! Turns one constraint list into a deduplicated id list plus its cache key,
//! and moves any clauses into the query's shared clause list.
//!
//! Per entry, first matching shape wins:
//!
//! 1. data component type  -> recorded
//! 2. anything carrying component types (bundle, wrapper, clause with
//!    dependencies) -> its data types recorded
//! 3. clause -> membership flag set, appended to the clause list
//!
//! Entries already seen in the same list are skipped. Nothing here looks at
//! archetypes.

use std::collections::HashSet;
use std::convert::Infallible;
use std::marker::PhantomData;

use tessera_core::{ComponentType, ComponentTypeId};
use tracing::warn;

use crate::clause::{ClauseId, FilterClause};
use crate::config::Validation;
use crate::error::{BuildResult, QueryError};
use crate::item::{BundleId, QueryItem};
use crate::key::{CacheKey, ConstraintGroup};

/// Identity of a list entry for duplicate detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Seen {
    Component(ComponentTypeId),
    Bundle(BundleId),
    Clause(ClauseId),
}

/// The parsed form of one constraint group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedGroup {
    /// Distinct component ids in first-seen order.
    pub types: Vec<ComponentTypeId>,
    /// Key over `types`; `None` when the group has no component types.
    pub key: Option<CacheKey>,
}

/// How a parser reacts to an entry it cannot use.
trait Policy {
    /// `Infallible` for policies that only drop.
    type Error;

    fn reject(group: ConstraintGroup, reason: String) -> Result<(), Self::Error>;
}

/// Drops the entry and logs a warning.
struct Lenient;

impl Policy for Lenient {
    type Error = Infallible;

    fn reject(group: ConstraintGroup, reason: String) -> Result<(), Infallible> {
        warn!(%group, %reason, "dropping constraint entry");
        Ok(())
    }
}

/// Fails the parse.
struct Strict;

impl Policy for Strict {
    type Error = QueryError;

    fn reject(group: ConstraintGroup, reason: String) -> BuildResult<()> {
        Err(QueryError::UnrecognizedEntry { group, reason })
    }
}

struct GroupParser<'a, P> {
    group: ConstraintGroup,
    seen: HashSet<Seen>,
    types: Vec<ComponentTypeId>,
    clauses: &'a mut Vec<FilterClause>,
    policy: PhantomData<P>,
}

impl<'a, P: Policy> GroupParser<'a, P> {
    fn new(group: ConstraintGroup, capacity: usize, clauses: &'a mut Vec<FilterClause>) -> Self {
        Self {
            group,
            seen: HashSet::with_capacity(capacity),
            types: Vec::with_capacity(capacity),
            clauses,
            policy: PhantomData,
        }
    }

    fn record(&mut self, id: ComponentTypeId) {
        if self.seen.insert(Seen::Component(id)) {
            self.types.push(id);
        }
    }

    /// Records the data types among `dependencies`; anything else is rejected.
    fn record_dependencies(&mut self, owner: &str, dependencies: &[ComponentType]) -> Result<(), P::Error> {
        for ty in dependencies {
            if ty.is_component_type_tag() {
                self.record(ty.id());
            } else {
                P::reject(self.group, format!("{owner} lists non-data component type {ty}"))?;
            }
        }
        Ok(())
    }

    fn attach(&mut self, clause: &FilterClause) {
        // A clause listed in several groups is one clause with several flags.
        let group = self.group;
        match self.clauses.iter().position(|c| c.id() == clause.id()) {
            Some(index) => self.clauses[index].mark(group),
            None => {
                let mut clause = clause.clone();
                clause.mark(group);
                self.clauses.push(clause);
            }
        }
    }

    fn item(&mut self, item: &QueryItem) -> Result<(), P::Error> {
        match item {
            QueryItem::Component(ty) if ty.is_component_type_tag() => self.record(ty.id()),
            QueryItem::Component(ty) => {
                if !self.seen.insert(Seen::Component(ty.id())) {
                    return Ok(());
                }
                match ty.wrapped() {
                    Some(wraps) => self.record(wraps),
                    None => P::reject(self.group, format!("component type {ty} has no data component"))?,
                }
            }
            QueryItem::Bundle(bundle) => {
                if self.seen.insert(Seen::Bundle(bundle.id())) {
                    self.record_dependencies(bundle.name(), bundle.types())?;
                }
            }
            QueryItem::Clause(clause) => {
                if !self.seen.insert(Seen::Clause(clause.id())) {
                    return Ok(());
                }
                match clause.dependencies() {
                    Some(dependencies) => self.record_dependencies(clause.name(), dependencies)?,
                    None => self.attach(clause),
                }
            }
        }
        Ok(())
    }

    fn parse(mut self, items: &[QueryItem]) -> Result<ParsedGroup, P::Error> {
        for item in items {
            self.item(item)?;
        }
        let key = CacheKey::from_ids(self.types.iter().copied());
        Ok(ParsedGroup {
            types: self.types,
            key,
        })
    }
}

/// Parses one constraint list, dropping entries it cannot use.
///
/// Clauses in `items` are cloned into `clauses` with their flag for `group`
/// set.
pub fn parse_group_lenient(
    items: &[QueryItem],
    group: ConstraintGroup,
    clauses: &mut Vec<FilterClause>,
) -> ParsedGroup {
    match GroupParser::<Lenient>::new(group, items.len(), clauses).parse(items) {
        Ok(parsed) => parsed,
        Err(never) => match never {},
    }
}

/// Parses one constraint list under `validation`.
///
/// Clauses in `items` are cloned into `clauses` with their flag for `group`
/// set.
///
/// # Errors
///
/// Only with [`Validation::Strict`], when an entry would have been dropped.
pub fn parse_group(
    items: &[QueryItem],
    group: ConstraintGroup,
    validation: Validation,
    clauses: &mut Vec<FilterClause>,
) -> BuildResult<ParsedGroup> {
    match validation {
        Validation::Lenient => Ok(parse_group_lenient(items, group, clauses)),
        Validation::Strict => GroupParser::<Strict>::new(group, items.len(), clauses).parse(items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Bundle;
    use bytemuck::{Pod, Zeroable};
    use tessera_core::{Component, ComponentRegistry};

    #[allow(dead_code)]
    #[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
    #[repr(C)]
    struct A(u32);
    impl Component for A {}

    #[allow(dead_code)]
    #[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
    #[repr(C)]
    struct B(u32);
    impl Component for B {}

    #[allow(dead_code)]
    #[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
    #[repr(C)]
    struct C(u32);
    impl Component for C {}

    struct Fixture {
        a: ComponentType,
        b: ComponentType,
        c: ComponentType,
        a_ref: ComponentType,
    }

    fn fixture() -> Fixture {
        let mut registry = ComponentRegistry::new();
        let a = registry.register::<A>("A").unwrap();
        let b = registry.register::<B>("B").unwrap();
        let c = registry.register::<C>("C").unwrap();
        let a_ref = registry.register_wrapper("ARef", a.id()).unwrap();
        Fixture { a, b, c, a_ref }
    }

    fn lenient(items: &[QueryItem]) -> (ParsedGroup, Vec<FilterClause>) {
        let mut clauses = Vec::new();
        let parsed = parse_group_lenient(items, ConstraintGroup::All, &mut clauses);
        (parsed, clauses)
    }

    #[test]
    fn test_duplicates_collapse() {
        let f = fixture();
        let (parsed, clauses) = lenient(&[f.b.into(), f.a.into(), f.b.into()]);
        assert_eq!(parsed.types, vec![f.b.id(), f.a.id()]);
        assert_eq!(parsed.key.unwrap().as_str(), ",0,1");
        assert!(clauses.is_empty());
    }

    #[test]
    fn test_empty_list_has_no_key() {
        let (parsed, _) = lenient(&[]);
        assert_eq!(parsed, ParsedGroup::default());
    }

    #[test]
    fn test_bundle_contributes_its_types() {
        let f = fixture();
        let bundle = Bundle::new("ab", [f.a, f.b]);
        let (parsed, _) = lenient(&[f.b.into(), bundle.clone().into(), bundle.into(), f.c.into()]);
        assert_eq!(parsed.types, vec![f.b.id(), f.a.id(), f.c.id()]);
    }

    #[test]
    fn test_wrapper_resolves_to_wrapped_type() {
        let f = fixture();
        let (parsed, _) = lenient(&[f.a_ref.into(), f.a.into()]);
        assert_eq!(parsed.types, vec![f.a.id()]);
    }

    #[test]
    fn test_clause_attached_with_flag() {
        let f = fixture();
        let clause = FilterClause::new("odd", |e, _| e.index() % 2 == 1);
        let (parsed, clauses) = lenient(&[f.a.into(), clause.clone().into(), clause.into()]);
        assert_eq!(parsed.types, vec![f.a.id()]);
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].belongs_to_all());
        assert!(!clauses[0].belongs_to_any());
    }

    #[test]
    fn test_clause_in_two_groups_is_one_entry() {
        let clause = FilterClause::new("odd", |e, _| e.index() % 2 == 1);
        let mut clauses = Vec::new();
        parse_group_lenient(&[clause.clone().into()], ConstraintGroup::Any, &mut clauses);
        parse_group(&[clause.into()], ConstraintGroup::None, Validation::Lenient, &mut clauses).unwrap();
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].belongs_to_any());
        assert!(clauses[0].belongs_to_none());
    }

    #[test]
    fn test_clause_with_dependencies_reads_as_bundle() {
        let f = fixture();
        let clause = FilterClause::new("needs_c", |_, _| true).with_dependencies([f.c]);
        let (parsed, clauses) = lenient(&[clause.into()]);
        assert_eq!(parsed.types, vec![f.c.id()]);
        assert!(clauses.is_empty());
    }

    #[test]
    fn test_wrapper_inside_bundle_dropped_when_lenient() {
        let f = fixture();
        let bundle = Bundle::new("mixed", [f.a_ref, f.b]);
        let (parsed, _) = lenient(&[bundle.into()]);
        assert_eq!(parsed.types, vec![f.b.id()]);
    }

    #[test]
    fn test_wrapper_inside_bundle_rejected_when_strict() {
        let f = fixture();
        let bundle = Bundle::new("mixed", [f.a_ref, f.b]);
        let mut clauses = Vec::new();
        let err = parse_group(&[bundle.into()], ConstraintGroup::None, Validation::Strict, &mut clauses)
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::UnrecognizedEntry { group: ConstraintGroup::None, .. }
        ));
    }

    #[test]
    fn test_strict_accepts_what_it_can_use() {
        let f = fixture();
        let clause = FilterClause::new("odd", |e, _| e.index() % 2 == 1);
        let items: [QueryItem; 3] = [f.a_ref.into(), Bundle::new("bc", [f.b, f.c]).into(), clause.into()];

        let mut strict_clauses = Vec::new();
        let strict = parse_group(&items, ConstraintGroup::Any, Validation::Strict, &mut strict_clauses).unwrap();
        let mut lenient_clauses = Vec::new();
        let lenient = parse_group_lenient(&items, ConstraintGroup::Any, &mut lenient_clauses);

        assert_eq!(strict, lenient);
        assert_eq!(strict.types, vec![f.a.id(), f.b.id(), f.c.id()]);
        assert_eq!(strict_clauses.len(), 1);
        assert!(strict_clauses[0].belongs_to_any());
    }
}
