//! Systems and their cached entity membership.
//!
//! A system is any type implementing [`System`]. It embeds a [`SystemCore`]
//! holding the components it requires and the entities that currently have
//! all of them. The registry keeps that list up to date in
//! [`Registry::update`](crate::Registry::update); the system's own logic runs
//! outside the registry and only reads [`SystemCore::entities`].

use std::any::{Any, TypeId};

use crate::component::{Component, ComponentTypes};
use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::signature::{MAX_COMPONENTS, Signature};

/// Downcasting support for trait objects.
///
/// Blanket-implemented for every `'static` type, so implementors of
/// [`System`] never write these by hand.
pub trait AsAny: Any {
    /// Upcast to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Upcast to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Upcast an owned box to `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A unit of game logic that operates on every entity matching its signature.
///
/// # Examples
///
/// ```rust
/// use engine_component::{Component, System, SystemCore};
///
/// struct Position(f32);
/// impl Component for Position {}
///
/// struct Gravity {
///     core: SystemCore,
/// }
///
/// impl Gravity {
///     fn new() -> Self {
///         let mut core = SystemCore::new();
///         core.require_component::<Position>();
///         Self { core }
///     }
/// }
///
/// impl System for Gravity {
///     fn core(&self) -> &SystemCore {
///         &self.core
///     }
///     fn core_mut(&mut self) -> &mut SystemCore {
///         &mut self.core
///     }
/// }
/// ```
pub trait System: AsAny {
    /// The shared membership state.
    fn core(&self) -> &SystemCore;

    /// The shared membership state, mutably.
    fn core_mut(&mut self) -> &mut SystemCore;

    /// Name used in logs and errors.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A component type a system asked for before its signature was resolved.
#[derive(Debug, Clone, Copy)]
struct Requirement {
    type_id: TypeId,
    name: &'static str,
}

/// Required signature and matching entities of one system.
#[derive(Debug, Default)]
pub struct SystemCore {
    requirements: Vec<Requirement>,
    signature: Signature,
    entities: Vec<Entity>,
}

impl SystemCore {
    /// Creates a core with no requirements and no entities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that matching entities must have a `T` component.
    ///
    /// Call this while building the system. The requirement turns into a
    /// signature bit when the system is handed to
    /// [`Registry::add_system`](crate::Registry::add_system), since component
    /// ids belong to the registry.
    pub fn require_component<T: Component>(&mut self) {
        let type_id = TypeId::of::<T>();
        if self.requirements.iter().all(|r| r.type_id != type_id) {
            self.requirements.push(Requirement {
                type_id,
                name: T::type_name(),
            });
        }
    }

    /// Resolves declared requirements into the signature.
    ///
    /// Either every requirement gets an id or none does, so a rejected system
    /// leaves the type table untouched.
    pub(crate) fn resolve(&mut self, types: &mut ComponentTypes) -> Result<()> {
        let free = MAX_COMPONENTS.saturating_sub(types.len());
        if let Some(overflow) = self
            .requirements
            .iter()
            .filter(|r| !types.contains(r.type_id))
            .nth(free)
        {
            return Err(EcsError::TooManyComponentTypes {
                max: MAX_COMPONENTS,
                name: overflow.name,
            });
        }
        for requirement in &self.requirements {
            let id = types.intern(requirement.type_id, requirement.name)?;
            self.signature.set(id);
        }
        Ok(())
    }

    /// The signature an entity must match to belong to this system.
    #[must_use]
    pub fn signature(&self) -> Signature {
        self.signature
    }

    /// The entities currently matching this system.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns `true` if `entity` is in the membership list.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    /// Adds `entity` unless it is already present.
    pub fn add_entity(&mut self, entity: Entity) {
        if !self.contains(entity) {
            self.entities.push(entity);
        }
    }

    /// Removes `entity` if present.
    ///
    /// Linear in the number of members; the order of the remaining entities
    /// is preserved.
    pub fn remove_entity(&mut self, entity: Entity) -> bool {
        match self.entities.iter().position(|&e| e == entity) {
            Some(pos) => {
                self.entities.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of member entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
