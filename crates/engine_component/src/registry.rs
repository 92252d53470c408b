//! The registry: entity lifecycle, component storage and system membership.
//!
//! Mutations never touch system membership directly. Creating an entity,
//! changing its components or killing it only queues the entity; the next
//! [`Registry::update`] settles every queued entity against every system in
//! one pass. Call `update` once per tick, after the tick's mutations and
//! before reading system entity lists.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::component::{Component, ComponentTypeId, ComponentTypes};
use crate::entity::{Entity, EntityAllocator};
use crate::error::{EcsError, Result};
use crate::pool::{ComponentPool, Pool};
use crate::signature::Signature;
use crate::system::System;

/// Summary of one [`Registry::update`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Entities whose membership was re-evaluated.
    pub evaluated: usize,
    /// Entities removed from every system after being killed.
    pub removed: usize,
}

/// Owns all entities, component pools and systems.
#[derive(Default)]
pub struct Registry {
    /// Entity id allocator and generation table.
    entities: EntityAllocator,
    /// Dense ids for component types seen by this registry.
    component_types: ComponentTypes,
    /// One pool per component type, indexed by component type id.
    component_pools: Vec<Option<Box<dyn Pool>>>,
    /// Per-entity signatures, indexed by entity id.
    entity_signatures: Vec<Signature>,
    /// Systems keyed by their Rust type.
    systems: HashMap<TypeId, Box<dyn System>>,
    /// Entities to evaluate against every system at the next update.
    entities_to_evaluate: BTreeSet<Entity>,
    /// Killed entities to drop from every system at the next update.
    entities_to_remove: BTreeSet<Entity>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Entity lifecycle --

    /// Creates an entity with no components.
    ///
    /// The entity can take components immediately; it joins systems at the
    /// next [`Registry::update`].
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.allocate();
        let slot = entity.index();
        if slot >= self.entity_signatures.len() {
            self.entity_signatures.resize(slot + 1, Signature::EMPTY);
        }
        self.entity_signatures[slot].reset();
        self.entities_to_evaluate.insert(entity);
        debug!(entity = %entity, "entity created");
        entity
    }

    /// Kills an entity.
    ///
    /// Its components are dropped and the handle becomes stale at once; it
    /// leaves every system at the next [`Registry::update`], after which its
    /// id may be reissued under a new generation.
    pub fn kill_entity(&mut self, entity: Entity) -> Result<()> {
        self.entities.kill(entity)?;
        let slot = entity.index();
        for id in self.entity_signatures[slot].ids() {
            if let Some(Some(pool)) = self.component_pools.get_mut(id.index()) {
                pool.remove(slot);
                trace!(entity = %entity, component = pool.type_name(), "component dropped");
            }
        }
        self.entity_signatures[slot].reset();
        self.entities_to_evaluate.remove(&entity);
        self.entities_to_remove.insert(entity);
        debug!(entity = %entity, "entity killed");
        Ok(())
    }

    /// Returns `true` if `entity` is a live handle.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.count()
    }

    /// Number of entities queued for the next update.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entities_to_evaluate.len() + self.entities_to_remove.len()
    }

    /// Returns the component signature of `entity`.
    pub fn signature(&self, entity: Entity) -> Result<Signature> {
        self.entities.validate(entity)?;
        Ok(self.entity_signatures[entity.index()])
    }

    // -- Component operations --

    /// Attaches `component` to `entity`, replacing any existing `T`.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        self.entities.validate(entity)?;
        let component_id = self.component_types.id_of::<T>()?;
        let min_slots = (entity.index() + 1).max(self.entities.capacity());

        let pool = self.pool_mut::<T>(component_id)?;
        pool.resize(min_slots);
        pool.set(entity.index(), component);

        self.entity_signatures[entity.index()].set(component_id);
        self.entities_to_evaluate.insert(entity);
        trace!(entity = %entity, component = T::type_name(), "component added");
        Ok(())
    }

    /// Detaches the `T` component from `entity`. A no-op if it has none.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Result<()> {
        self.entities.validate(entity)?;
        let Some(component_id) = self.component_types.get::<T>() else {
            return Ok(());
        };
        let signature = &mut self.entity_signatures[entity.index()];
        if !signature.test(component_id) {
            return Ok(());
        }
        signature.clear(component_id);
        if let Some(Some(pool)) = self.component_pools.get_mut(component_id.index()) {
            pool.remove(entity.index());
        }
        self.entities_to_evaluate.insert(entity);
        trace!(entity = %entity, component = T::type_name(), "component removed");
        Ok(())
    }

    /// Returns `true` if `entity` has a `T` component.
    pub fn has_component<T: Component>(&self, entity: Entity) -> Result<bool> {
        self.entities.validate(entity)?;
        Ok(self
            .component_types
            .get::<T>()
            .is_some_and(|id| self.entity_signatures[entity.index()].test(id)))
    }

    /// Returns the `T` component of `entity`.
    pub fn get_component<T: Component>(&self, entity: Entity) -> Result<&T> {
        let component_id = self.checked_component_id::<T>(entity)?;
        self.pool::<T>(component_id)?.get(entity.index())
    }

    /// Returns the `T` component of `entity` mutably.
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T> {
        let component_id = self.checked_component_id::<T>(entity)?;
        self.pool_mut::<T>(component_id)?.get_mut(entity.index())
    }

    /// Read access to the component type table.
    #[must_use]
    pub fn component_types(&self) -> &ComponentTypes {
        &self.component_types
    }

    /// Number of live entities holding a `T` component.
    #[must_use]
    pub fn component_count<T: Component>(&self) -> usize {
        self.component_types
            .get::<T>()
            .and_then(|id| self.component_pools.get(id.index()))
            .and_then(Option::as_ref)
            .map_or(0, |pool| pool.occupied())
    }

    /// Validates `entity` and checks its signature holds `T`.
    fn checked_component_id<T: Component>(&self, entity: Entity) -> Result<ComponentTypeId> {
        self.entities.validate(entity)?;
        self.component_types
            .get::<T>()
            .filter(|&id| self.entity_signatures[entity.index()].test(id))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: T::type_name(),
            })
    }

    fn pool<T: Component>(&self, component_id: ComponentTypeId) -> Result<&ComponentPool<T>> {
        self.component_pools
            .get(component_id.index())
            .and_then(Option::as_ref)
            .and_then(|pool| pool.as_any().downcast_ref::<ComponentPool<T>>())
            .ok_or(EcsError::PoolTypeMismatch {
                component: T::type_name(),
            })
    }

    /// Returns the pool for `T`, creating it on first use.
    fn pool_mut<T: Component>(
        &mut self,
        component_id: ComponentTypeId,
    ) -> Result<&mut ComponentPool<T>> {
        let index = component_id.index();
        if index >= self.component_pools.len() {
            self.component_pools.resize_with(index + 1, || None);
        }
        self.component_pools[index]
            .get_or_insert_with(|| {
                debug!(component = T::type_name(), id = component_id.0, "component pool created");
                Box::new(ComponentPool::<T>::new()) as Box<dyn Pool>
            })
            .as_any_mut()
            .downcast_mut::<ComponentPool<T>>()
            .ok_or(EcsError::PoolTypeMismatch {
                component: T::type_name(),
            })
    }

    // -- Systems --

    /// Registers `system`, replacing any previous system of the same type.
    ///
    /// Every live entity is queued so the new system picks up existing
    /// matches at the next update.
    pub fn add_system<S: System>(&mut self, mut system: S) -> Result<()> {
        system.core_mut().resolve(&mut self.component_types)?;
        debug!(
            system = system.name(),
            signature = %system.core().signature(),
            "system added"
        );
        self.systems.insert(TypeId::of::<S>(), Box::new(system));
        self.entities_to_evaluate.extend(self.entities.live());
        Ok(())
    }

    /// Unregisters and returns the system of type `S`.
    pub fn remove_system<S: System>(&mut self) -> Result<S> {
        let system = self
            .systems
            .remove(&TypeId::of::<S>())
            .ok_or(EcsError::SystemNotFound(std::any::type_name::<S>()))?;
        debug!(system = std::any::type_name::<S>(), "system removed");
        system
            .into_any()
            .downcast::<S>()
            .map(|boxed| *boxed)
            .map_err(|_| EcsError::SystemNotFound(std::any::type_name::<S>()))
    }

    /// Returns `true` if a system of type `S` is registered.
    #[must_use]
    pub fn has_system<S: System>(&self) -> bool {
        self.systems.contains_key(&TypeId::of::<S>())
    }

    /// Returns the system of type `S`.
    pub fn get_system<S: System>(&self) -> Result<&S> {
        self.systems
            .get(&TypeId::of::<S>())
            .and_then(|system| (**system).as_any().downcast_ref::<S>())
            .ok_or(EcsError::SystemNotFound(std::any::type_name::<S>()))
    }

    /// Returns the system of type `S` mutably.
    pub fn get_system_mut<S: System>(&mut self) -> Result<&mut S> {
        self.systems
            .get_mut(&TypeId::of::<S>())
            .and_then(|system| (**system).as_any_mut().downcast_mut::<S>())
            .ok_or(EcsError::SystemNotFound(std::any::type_name::<S>()))
    }

    /// Returns a snapshot of the entities matching system `S`.
    pub fn system_entities<S: System>(&self) -> Result<Vec<Entity>> {
        Ok(self.get_system::<S>()?.core().entities().to_vec())
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // -- Update --

    /// Applies queued membership changes.
    ///
    /// Queued entities are added to every system whose signature they match
    /// and removed from every system they no longer match; killed entities
    /// leave every system and their ids become reusable. Both queues are
    /// taken up front, so the pass sees only work queued before the call.
    pub fn update(&mut self) -> UpdateStats {
        let to_evaluate = std::mem::take(&mut self.entities_to_evaluate);
        let to_remove = std::mem::take(&mut self.entities_to_remove);
        let mut stats = UpdateStats::default();

        for entity in to_evaluate {
            if !self.entities.is_alive(entity) {
                continue;
            }
            let signature = self.entity_signatures[entity.index()];
            for system in self.systems.values_mut() {
                let core = system.core_mut();
                if signature.matches(core.signature()) {
                    core.add_entity(entity);
                } else {
                    core.remove_entity(entity);
                }
            }
            stats.evaluated += 1;
        }

        for entity in to_remove {
            for system in self.systems.values_mut() {
                system.core_mut().remove_entity(entity);
            }
            self.entities.release(entity);
            stats.removed += 1;
        }

        if stats != UpdateStats::default() {
            trace!(evaluated = stats.evaluated, removed = stats.removed, "registry updated");
        }
        stats
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.entities.count())
            .field("component_types", &self.component_types.len())
            .field("systems", &self.systems.len())
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::MAX_COMPONENTS;
    use crate::system::SystemCore;

    #[derive(Debug, Clone, PartialEq)]
    struct Transform {
        x: f32,
        y: f32,
    }
    impl Component for Transform {}

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    impl Component for Velocity {}

    struct MovementSystem {
        core: SystemCore,
    }

    impl MovementSystem {
        fn new() -> Self {
            let mut core = SystemCore::new();
            core.require_component::<Transform>();
            core.require_component::<Velocity>();
            Self { core }
        }
    }

    impl System for MovementSystem {
        fn core(&self) -> &SystemCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut SystemCore {
            &mut self.core
        }
    }

    #[test]
    fn test_create_entity_grows_signature_table() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        assert_eq!(registry.signature(e).unwrap(), Signature::EMPTY);
        assert_eq!(registry.entity_count(), 1);
        assert_eq!(registry.pending_count(), 1);
    }

    #[test]
    fn test_component_round_trip_through_registry() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        registry.add_component(e, Transform { x: 1.0, y: 2.0 }).unwrap();

        assert!(registry.has_component::<Transform>(e).unwrap());
        assert!(!registry.has_component::<Velocity>(e).unwrap());
        assert_eq!(
            registry.get_component::<Transform>(e).unwrap(),
            &Transform { x: 1.0, y: 2.0 }
        );

        registry.get_component_mut::<Transform>(e).unwrap().x = 7.0;
        assert_eq!(registry.get_component::<Transform>(e).unwrap().x, 7.0);
    }

    #[test]
    fn test_get_after_remove_fails_loudly() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        registry.add_component(e, Velocity { dx: 1.0, dy: 0.0 }).unwrap();
        registry.remove_component::<Velocity>(e).unwrap();

        assert!(!registry.has_component::<Velocity>(e).unwrap());
        assert!(matches!(
            registry.get_component::<Velocity>(e),
            Err(EcsError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_remove_missing_component_is_noop() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        registry.update();
        registry.remove_component::<Velocity>(e).unwrap();
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_pool_covers_every_entity_id() {
        let mut registry = Registry::new();
        let entities: Vec<Entity> = (0..150).map(|_| registry.create_entity()).collect();
        let last = *entities.last().unwrap();
        registry.add_component(last, Transform { x: 0.0, y: 0.0 }).unwrap();
        assert_eq!(registry.get_component::<Transform>(last).unwrap().x, 0.0);
        let pool = registry.pool::<Transform>(ComponentTypeId(0)).unwrap();
        assert!(Pool::len(pool) >= 150);
    }

    #[test]
    fn test_component_count_tracks_removals_and_kills() {
        let mut registry = Registry::new();
        assert_eq!(registry.component_count::<Transform>(), 0);

        let entities: Vec<Entity> = (0..3).map(|_| registry.create_entity()).collect();
        for &e in &entities {
            registry.add_component(e, Transform { x: 0.0, y: 0.0 }).unwrap();
        }
        assert_eq!(registry.component_count::<Transform>(), 3);

        registry.remove_component::<Transform>(entities[0]).unwrap();
        registry.kill_entity(entities[1]).unwrap();
        assert_eq!(registry.component_count::<Transform>(), 1);
        assert_eq!(registry.component_count::<Velocity>(), 0);
    }

    #[test]
    fn test_out_of_range_entity() {
        let registry = Registry::new();
        let ghost = Entity::from_raw_parts(4, 0);
        assert_eq!(
            registry.has_component::<Transform>(ghost),
            Err(EcsError::EntityOutOfRange { id: 4, len: 0 })
        );
    }

    #[test]
    fn test_kill_entity_drops_components_and_handle() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        registry.add_component(e, Transform { x: 1.0, y: 1.0 }).unwrap();
        registry.kill_entity(e).unwrap();

        assert!(!registry.is_alive(e));
        assert_eq!(registry.entity_count(), 0);
        assert_eq!(
            registry.get_component::<Transform>(e),
            Err(EcsError::StaleEntity(e))
        );
        assert_eq!(registry.kill_entity(e), Err(EcsError::StaleEntity(e)));
    }

    #[test]
    fn test_recycled_id_does_not_inherit_components() {
        let mut registry = Registry::new();
        let old = registry.create_entity();
        registry.add_component(old, Velocity { dx: 1.0, dy: 1.0 }).unwrap();
        registry.kill_entity(old).unwrap();
        registry.update();

        let fresh = registry.create_entity();
        assert_eq!(fresh.id(), old.id());
        assert_ne!(fresh, old);
        assert!(!registry.has_component::<Velocity>(fresh).unwrap());
        assert!(registry.has_component::<Velocity>(old).is_err());
    }

    #[test]
    fn test_system_lookup() {
        let mut registry = Registry::new();
        assert!(!registry.has_system::<MovementSystem>());
        assert!(matches!(
            registry.get_system::<MovementSystem>(),
            Err(EcsError::SystemNotFound(_))
        ));

        registry.add_system(MovementSystem::new()).unwrap();
        assert!(registry.has_system::<MovementSystem>());
        assert_eq!(registry.system_count(), 1);
        assert_eq!(registry.get_system::<MovementSystem>().unwrap().core().signature().count(), 2);
        assert!(registry.get_system_mut::<MovementSystem>().is_ok());

        let removed = registry.remove_system::<MovementSystem>().unwrap();
        assert!(removed.core().is_empty());
        assert!(!registry.has_system::<MovementSystem>());
        assert!(matches!(
            registry.remove_system::<MovementSystem>(),
            Err(EcsError::SystemNotFound(_))
        ));
    }

    #[test]
    fn test_system_requirements_share_component_ids() {
        let mut registry = Registry::new();
        registry.add_system(MovementSystem::new()).unwrap();
        let e = registry.create_entity();
        registry.add_component(e, Velocity { dx: 0.0, dy: 0.0 }).unwrap();
        registry.add_component(e, Transform { x: 0.0, y: 0.0 }).unwrap();

        let required = registry.get_system::<MovementSystem>().unwrap().core().signature();
        assert!(registry.signature(e).unwrap().matches(required));
        assert_eq!(registry.component_types().len(), 2);
    }

    #[test]
    fn test_update_stats() {
        let mut registry = Registry::new();
        let a = registry.create_entity();
        let b = registry.create_entity();
        registry.kill_entity(b).unwrap();

        let stats = registry.update();
        assert_eq!(stats, UpdateStats { evaluated: 1, removed: 1 });
        assert_eq!(registry.update(), UpdateStats::default());
        assert!(registry.is_alive(a));
    }

    struct Marker<const N: usize>;
    impl<const N: usize> Component for Marker<N> {}

    macro_rules! add_markers {
        ($registry:expr, $entity:expr; $($n:literal)*) => {
            $( $registry.add_component($entity, Marker::<$n>).unwrap(); )*
        };
    }

    #[test]
    fn test_add_component_past_signature_width_fails() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        add_markers!(registry, e;
            0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
            16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31);
        registry.update();
        let full = registry.signature(e).unwrap();
        assert_eq!(full.bits(), u32::MAX);

        let err = registry.add_component(e, Transform { x: 0.0, y: 0.0 }).unwrap_err();
        assert!(matches!(
            err,
            EcsError::TooManyComponentTypes { max: MAX_COMPONENTS, name } if name.ends_with("Transform")
        ));
        assert_eq!(registry.signature(e).unwrap(), full);
        assert_eq!(registry.pending_count(), 0);
        assert!(!registry.has_component::<Transform>(e).unwrap());
    }

    #[test]
    fn test_add_system_past_signature_width_fails() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        add_markers!(registry, e;
            0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15
            16 17 18 19 20 21 22 23 24 25 26 27 28 29 30);
        assert_eq!(registry.component_types().len(), MAX_COMPONENTS - 1);

        // Transform would take the last id; Velocity does not fit.
        let err = registry.add_system(MovementSystem::new()).unwrap_err();
        assert!(matches!(
            err,
            EcsError::TooManyComponentTypes { max: MAX_COMPONENTS, name } if name.ends_with("Velocity")
        ));
        assert!(!registry.has_system::<MovementSystem>());
        assert_eq!(registry.system_count(), 0);
        assert_eq!(registry.component_types().len(), MAX_COMPONENTS - 1);
        assert_eq!(registry.component_types().get::<Transform>(), None);
    }
}
