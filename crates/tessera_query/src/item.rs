//! # Constraint Items
//!
//! What callers put into `all`/`any`/`none` lists. The shape of every entry is
//! fixed by its variant when the list is built, not discovered while parsing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tessera_core::ComponentType;

use crate::clause::FilterClause;

static NEXT_BUNDLE_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a bundle. Clones of a bundle share it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BundleId(u64);

/// A named group of component types listed as one item.
#[derive(Clone, Debug)]
pub struct Bundle {
    id: BundleId,
    name: Arc<str>,
    types: Arc<[ComponentType]>,
}

impl Bundle {
    /// Creates a bundle over `types`.
    pub fn new<I>(name: impl Into<Arc<str>>, types: I) -> Self
    where
        I: IntoIterator<Item = ComponentType>,
    {
        Self {
            id: BundleId(NEXT_BUNDLE_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            types: types.into_iter().collect(),
        }
    }

    /// Identity shared by clones.
    #[must_use]
    pub fn id(&self) -> BundleId {
        self.id
    }

    /// Name given at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Component types in listing order.
    #[must_use]
    pub fn types(&self) -> &[ComponentType] {
        &self.types
    }
}

/// One entry of a constraint list.
#[derive(Clone, Debug)]
pub enum QueryItem {
    /// A single component type.
    Component(ComponentType),
    /// A per-entity predicate.
    Clause(FilterClause),
    /// Several component types listed together.
    Bundle(Bundle),
}

impl From<ComponentType> for QueryItem {
    fn from(ty: ComponentType) -> Self {
        Self::Component(ty)
    }
}

impl From<FilterClause> for QueryItem {
    fn from(clause: FilterClause) -> Self {
        Self::Clause(clause)
    }
}

impl From<Bundle> for QueryItem {
    fn from(bundle: Bundle) -> Self {
        Self::Bundle(bundle)
    }
}
