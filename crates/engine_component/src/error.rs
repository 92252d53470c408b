//! Registry error types.

use crate::entity::Entity;

/// Errors raised by the registry, its pools and its system table.
///
/// Every variant is a programming or configuration mistake; none of them is
/// transient, so callers are expected to propagate rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// More distinct component types were registered than a signature can hold.
    #[error("cannot register component `{name}`: signature width of {max} component types exhausted")]
    TooManyComponentTypes {
        /// The signature width.
        max: usize,
        /// The type that did not fit.
        name: &'static str,
    },

    /// A raw component id does not fit in a signature.
    #[error("component id {id} is out of range (signatures hold {max} component types)")]
    ComponentIdOutOfRange {
        /// The offending id.
        id: u8,
        /// The signature width.
        max: usize,
    },

    /// The entity id is beyond the registry's signature table.
    #[error("entity id {id} is out of range (registry holds {len} entity slots)")]
    EntityOutOfRange {
        /// The offending id.
        id: u32,
        /// Number of slots in the signature table.
        len: usize,
    },

    /// The handle refers to a killed entity, or to an older generation of its slot.
    #[error("{0} is no longer alive")]
    StaleEntity(Entity),

    /// The entity's signature does not include the requested component.
    #[error("{entity} has no `{component}` component")]
    MissingComponent {
        /// The entity that was queried.
        entity: Entity,
        /// Name of the requested component type.
        component: &'static str,
    },

    /// A pool slot was read while empty.
    #[error("slot {index} of the `{component}` pool is empty")]
    EmptySlot {
        /// The slot index (entity id).
        index: usize,
        /// Name of the pool's component type.
        component: &'static str,
    },

    /// A type-erased pool did not downcast to the expected component type.
    #[error("pool registered for `{component}` holds a different component type")]
    PoolTypeMismatch {
        /// Name of the expected component type.
        component: &'static str,
    },

    /// No system of the requested type is registered.
    #[error("system `{0}` is not registered")]
    SystemNotFound(&'static str),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = EcsError> = std::result::Result<T, E>;
