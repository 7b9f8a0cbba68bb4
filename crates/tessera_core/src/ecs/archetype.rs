//! # Archetypes
//!
//! An archetype is the group of all entities sharing one exact set of
//! component types. Its composition never changes: adding or removing a
//! component moves the entity to a different archetype. Everything that
//! caches per-archetype answers relies on that.
//!
//! ```text
//! Archetype #0 {Position, Velocity}:   [chunk][chunk][chunk]
//! Archetype #1 {Position}:             [chunk]
//! Archetype #2 {Position, Health}:     [chunk][chunk]
//! ```

use std::fmt;

use super::chunk::Chunk;
use super::component::ComponentTypeId;
use super::entity::EntityId;

// ============================================================================
// COMPONENT MASK - O(1) membership
// ============================================================================

/// Bitset over component ids. 64 ids per word.
///
/// ## Performance
///
/// - Contains: O(1)
/// - Insert: O(1) amortized
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComponentMask {
    bits: Vec<u64>,
}

impl ComponentMask {
    /// Creates an empty mask.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bit for `id`.
    #[inline]
    pub fn insert(&mut self, id: ComponentTypeId) {
        let word = id.index() / 64;
        let bit = id.index() % 64;
        if word >= self.bits.len() {
            self.bits.resize(word + 1, 0);
        }
        self.bits[word] |= 1u64 << bit;
    }

    /// Checks the bit for `id`.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ComponentTypeId) -> bool {
        let word = id.index() / 64;
        let bit = id.index() % 64;
        (self.bits.get(word).copied().unwrap_or(0) >> bit) & 1 == 1
    }

    /// Number of set bits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over set ids in ascending order.
    ///
    /// Uses `trailing_zeros` to skip empty regions.
    pub fn iter(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.bits.iter().enumerate().flat_map(|(word_idx, &word)| {
            let mut current = word;
            std::iter::from_fn(move || {
                if current == 0 {
                    return None;
                }
                let bit = current.trailing_zeros() as usize;
                current &= current - 1;
                // Ids are u32 by construction.
                #[allow(clippy::cast_possible_truncation)]
                Some(ComponentTypeId::new((word_idx * 64 + bit) as u32))
            })
        })
    }
}

impl FromIterator<ComponentTypeId> for ComponentMask {
    fn from_iter<I: IntoIterator<Item = ComponentTypeId>>(iter: I) -> Self {
        let mut mask = Self::new();
        for id in iter {
            mask.insert(id);
        }
        mask
    }
}

// ============================================================================
// SIGNATURE
// ============================================================================

/// Signature of an archetype - which components it contains.
///
/// Uses a sorted, deduplicated list of ids so that equal compositions hash
/// and compare equal regardless of the order they were listed in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ArchetypeSignature {
    components: Vec<ComponentTypeId>,
}

impl ArchetypeSignature {
    /// Creates a new archetype signature from component types.
    #[must_use]
    pub fn new(mut components: Vec<ComponentTypeId>) -> Self {
        components.sort_unstable();
        components.dedup();
        Self { components }
    }

    /// The signature with no components.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Checks if this signature contains a component type.
    #[must_use]
    pub fn contains(&self, id: ComponentTypeId) -> bool {
        self.components.binary_search(&id).is_ok()
    }

    /// Sorted component ids.
    #[must_use]
    pub fn components(&self) -> &[ComponentTypeId] {
        &self.components
    }

    /// Returns the number of component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Checks if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl FromIterator<ComponentTypeId> for ArchetypeSignature {
    fn from_iter<I: IntoIterator<Item = ComponentTypeId>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ============================================================================
// ARCHETYPE
// ============================================================================

/// Handle to an archetype in an [`ArchetypeStore`](super::ArchetypeStore).
///
/// Stable for the archetype's whole lifetime and never reused afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ArchetypeId(u32);

impl ArchetypeId {
    /// Creates a handle from its raw index.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "archetype#{}", self.0)
    }
}

/// What the query layer needs from an archetype.
///
/// Implementations must answer `has` the same way for the archetype's whole
/// lifetime; match caches are keyed on [`ArchetypeView::id`] and never
/// re-check.
pub trait ArchetypeView {
    /// Stable handle of this archetype.
    fn id(&self) -> ArchetypeId;

    /// Whether entities of this archetype carry `component`.
    fn has(&self, component: ComponentTypeId) -> bool;
}

/// A group of entities with an identical component composition.
#[derive(Debug)]
pub struct Archetype {
    id: ArchetypeId,
    signature: ArchetypeSignature,
    mask: ComponentMask,
    chunks: Vec<Chunk>,
    chunk_capacity: usize,
}

impl Archetype {
    pub(crate) fn new(id: ArchetypeId, signature: ArchetypeSignature, chunk_capacity: usize) -> Self {
        let mask = signature.components().iter().copied().collect();
        Self {
            id,
            signature,
            mask,
            chunks: Vec::new(),
            chunk_capacity,
        }
    }

    /// Returns the signature of this archetype.
    #[must_use]
    pub fn signature(&self) -> &ArchetypeSignature {
        &self.signature
    }

    /// Chunks holding this archetype's entities.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Total entities across all chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    /// Checks if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(Chunk::is_empty)
    }

    /// Appends an entity to the last chunk, opening a new one when full.
    pub fn push_entity(&mut self, entity: EntityId) {
        let pending = match self.chunks.last_mut() {
            Some(chunk) => chunk.try_push(entity),
            None => Err(entity),
        };
        if let Err(entity) = pending {
            self.chunks
                .push(Chunk::starting_with(self.id, self.chunk_capacity, entity));
        }
    }
}

impl ArchetypeView for Archetype {
    #[inline]
    fn id(&self) -> ArchetypeId {
        self.id
    }

    #[inline]
    fn has(&self, component: ComponentTypeId) -> bool {
        self.mask.contains(component)
    }
}
