//! # Component Types
//!
//! Components are pure data containers with no behavior. Queries never look at
//! component values; they only look at the stable numeric id the registry
//! hands out for each component kind.

use std::fmt;

use bytemuck::{Pod, Zeroable};

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Copy`: No heap allocations, bitwise copyable
/// - `Pod`: Plain old data, safe to transmute
/// - `Zeroable`: Can be safely zeroed
/// - `Default`: Must have a default value for pre-allocation
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Default, Pod, Zeroable)]
/// #[repr(C)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {}
/// ```
pub trait Component: Copy + Pod + Zeroable + Default + Send + Sync + 'static {}

/// Stable identifier of a component kind.
///
/// Assigned densely by [`ComponentRegistry`](super::ComponentRegistry) in
/// registration order and never reused for the lifetime of the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentTypeId(u32);

impl ComponentTypeId {
    /// Creates an id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the id as an index into dense per-component arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a registered component type denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A plain data component stored in archetypes.
    Data,
    /// A client-facing type that only references a data component.
    Wrapper {
        /// The data component this type stands for.
        wraps: ComponentTypeId,
    },
}

/// A registered component type.
///
/// Cheap to copy; equality is by id.
#[derive(Clone, Copy, Debug)]
pub struct ComponentType {
    id: ComponentTypeId,
    name: &'static str,
    kind: ComponentKind,
}

impl ComponentType {
    pub(crate) const fn new(id: ComponentTypeId, name: &'static str, kind: ComponentKind) -> Self {
        Self { id, name, kind }
    }

    /// Returns the stable id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ComponentTypeId {
        self.id
    }

    /// Returns the registered name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the kind of this type.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// True for plain data components.
    #[inline]
    #[must_use]
    pub const fn is_component_type_tag(&self) -> bool {
        matches!(self.kind, ComponentKind::Data)
    }

    /// True for types that merely reference a data component.
    #[inline]
    #[must_use]
    pub const fn is_wrapper_type(&self) -> bool {
        matches!(self.kind, ComponentKind::Wrapper { .. })
    }

    /// The data component a wrapper stands for, if this is a wrapper.
    #[inline]
    #[must_use]
    pub const fn wrapped(&self) -> Option<ComponentTypeId> {
        match self.kind {
            ComponentKind::Data => None,
            ComponentKind::Wrapper { wraps } => Some(wraps),
        }
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl std::hash::Hash for ComponentType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_flags() {
        let data = ComponentType::new(ComponentTypeId::new(3), "Position", ComponentKind::Data);
        assert!(data.is_component_type_tag());
        assert!(!data.is_wrapper_type());
        assert_eq!(data.wrapped(), None);

        let wrapper = ComponentType::new(
            ComponentTypeId::new(4),
            "PositionRef",
            ComponentKind::Wrapper { wraps: data.id() },
        );
        assert!(!wrapper.is_component_type_tag());
        assert!(wrapper.is_wrapper_type());
        assert_eq!(wrapper.wrapped(), Some(ComponentTypeId::new(3)));
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = ComponentType::new(ComponentTypeId::new(1), "A", ComponentKind::Data);
        let b = ComponentType::new(ComponentTypeId::new(1), "B", ComponentKind::Data);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "A#1");
    }
}
