//! # Core Error Types
//!
//! Errors raised while registering component types or building archetypes.

use thiserror::Error;

use crate::ecs::ComponentTypeId;

/// Errors that can occur in the component registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A different type is already registered under this name.
    #[error("component name already registered: {0}")]
    DuplicateName(&'static str),

    /// The id does not belong to this registry.
    #[error("unknown component type id: {0}")]
    UnknownComponent(ComponentTypeId),

    /// Wrappers must reference a data component, not another wrapper.
    #[error("wrapper {name} cannot wrap another wrapper ({target})")]
    WrapperOfWrapper {
        /// Name of the wrapper being registered.
        name: &'static str,
        /// The wrapper it tried to wrap.
        target: ComponentTypeId,
    },

    /// The id space is exhausted.
    #[error("too many component types: limit is {limit}")]
    TooManyComponents {
        /// Maximum number of component types.
        limit: usize,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
