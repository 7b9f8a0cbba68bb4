//! # Component Registry
//!
//! Hands out stable, dense ids for component kinds. Ids are assigned in
//! registration order and live as long as the registry.

use std::any::TypeId;
use std::collections::HashMap;

use tracing::debug;

use super::component::{Component, ComponentKind, ComponentType, ComponentTypeId};
use crate::error::{RegistryError, RegistryResult};

/// Maximum number of component types a registry can hold.
pub const MAX_COMPONENT_TYPES: usize = 4096;

/// Registry of every component type known to a world.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    /// Registered types, indexed by id.
    types: Vec<ComponentType>,
    /// Rust type to id, for data components.
    by_type_id: HashMap<TypeId, ComponentTypeId>,
    /// Name to id, for every registered type.
    by_name: HashMap<&'static str, ComponentTypeId>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a data component.
    ///
    /// Registering the same Rust type twice returns the existing entry.
    ///
    /// # Errors
    ///
    /// Fails if `name` is taken by another type or the id space is full.
    pub fn register<C: Component>(&mut self, name: &'static str) -> RegistryResult<ComponentType> {
        if let Some(id) = self.by_type_id.get(&TypeId::of::<C>()) {
            return Ok(self.types[id.index()]);
        }
        let ty = self.push(name, ComponentKind::Data)?;
        self.by_type_id.insert(TypeId::of::<C>(), ty.id());
        Ok(ty)
    }

    /// Registers a wrapper type that stands for the data component `of`.
    ///
    /// # Errors
    ///
    /// Fails if `of` is unknown or itself a wrapper, if `name` is taken, or if
    /// the id space is full.
    pub fn register_wrapper(
        &mut self,
        name: &'static str,
        of: ComponentTypeId,
    ) -> RegistryResult<ComponentType> {
        let target = self.by_id(of).ok_or(RegistryError::UnknownComponent(of))?;
        if target.is_wrapper_type() {
            return Err(RegistryError::WrapperOfWrapper { name, target: of });
        }
        self.push(name, ComponentKind::Wrapper { wraps: of })
    }

    fn push(&mut self, name: &'static str, kind: ComponentKind) -> RegistryResult<ComponentType> {
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateName(name));
        }
        if self.types.len() >= MAX_COMPONENT_TYPES {
            return Err(RegistryError::TooManyComponents {
                limit: MAX_COMPONENT_TYPES,
            });
        }

        // Bounded by MAX_COMPONENT_TYPES above.
        #[allow(clippy::cast_possible_truncation)]
        let id = ComponentTypeId::new(self.types.len() as u32);
        let ty = ComponentType::new(id, name, kind);
        self.types.push(ty);
        self.by_name.insert(name, id);
        debug!(component = name, id = id.raw(), "registered component type");
        Ok(ty)
    }

    /// Looks up the data component registered for `C`.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<ComponentType> {
        let id = self.by_type_id.get(&TypeId::of::<C>())?;
        self.by_id(*id)
    }

    /// Looks up a type by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<ComponentType> {
        let id = self.by_name.get(name)?;
        self.by_id(*id)
    }

    /// Looks up a type by id.
    #[inline]
    #[must_use]
    pub fn by_id(&self, id: ComponentTypeId) -> Option<ComponentType> {
        self.types.get(id.index()).copied()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Checks if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates over all registered types in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentType> {
        self.types.iter()
    }
}
