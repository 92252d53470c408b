//! Core [`Component`] trait and the per-registry component type table.
//!
//! ## Dense Type Identity
//!
//! A [`ComponentTypeId`] is a small dense integer, handed out the first time a
//! registry sees a component type and never reused afterwards. The id doubles
//! as the bit position in a [`Signature`](crate::Signature) and as the index of
//! the type's pool, so at most [`MAX_COMPONENTS`] types fit in one registry.
//!
//! The table lives inside each [`Registry`](crate::Registry) rather than in a
//! global, which keeps independent registries (one per test, say) from
//! observing each other's ids.

use std::any::TypeId;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, Result};
use crate::signature::MAX_COMPONENTS;

/// Dense identifier of a component type within one registry.
///
/// Always below [`MAX_COMPONENTS`]: ids come from [`ComponentTypes`] or from
/// the checked [`TryFrom<u8>`] conversion, so one id maps to exactly one
/// signature bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ComponentTypeId(pub(crate) u8);

impl ComponentTypeId {
    /// Returns the id as a table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for ComponentTypeId {
    type Error = EcsError;

    fn try_from(id: u8) -> Result<Self> {
        if usize::from(id) >= MAX_COMPONENTS {
            return Err(EcsError::ComponentIdOutOfRange {
                id,
                max: MAX_COMPONENTS,
            });
        }
        Ok(Self(id))
    }
}

impl From<ComponentTypeId> for u8 {
    fn from(id: ComponentTypeId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The core component trait.
///
/// Components are plain data. Any `'static` type can be one; the trait only
/// exists so component types are declared on purpose and can override the
/// name shown in logs and errors.
///
/// # Examples
///
/// ```rust
/// use engine_component::Component;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str {
///         "Health"
///     }
/// }
/// ```
pub trait Component: 'static {
    /// A human-readable name for this component type.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Interns component types into dense [`ComponentTypeId`]s.
#[derive(Debug, Default)]
pub struct ComponentTypes {
    by_type: HashMap<TypeId, ComponentTypeId>,
    names: Vec<&'static str>,
}

impl ComponentTypes {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `T`, assigning the next free id on first use.
    ///
    /// Fails once [`MAX_COMPONENTS`] distinct types are registered.
    pub fn id_of<T: Component>(&mut self) -> Result<ComponentTypeId> {
        self.intern(TypeId::of::<T>(), T::type_name())
    }

    /// Returns the id of `T` if it has been registered.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<ComponentTypeId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the registered name for `id`.
    #[must_use]
    pub fn name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.names.get(id.index()).copied()
    }

    /// Number of registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no type has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub(crate) fn contains(&self, type_id: TypeId) -> bool {
        self.by_type.contains_key(&type_id)
    }

    pub(crate) fn intern(&mut self, type_id: TypeId, name: &'static str) -> Result<ComponentTypeId> {
        if let Some(&id) = self.by_type.get(&type_id) {
            return Ok(id);
        }
        if self.names.len() >= MAX_COMPONENTS {
            return Err(EcsError::TooManyComponentTypes {
                max: MAX_COMPONENTS,
                name,
            });
        }
        let id = ComponentTypeId(self.names.len() as u8);
        self.by_type.insert(type_id, id);
        self.names.push(name);
        tracing::trace!(component = name, id = id.0, "registered component type");
        Ok(id)
    }
}
