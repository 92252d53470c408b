//! Component pools.
//!
//! A [`ComponentPool`] stores every instance of one component type in a single
//! contiguous vector, indexed by entity id. Slot `i` belongs to the entity
//! with id `i`; the pool itself knows nothing about signatures, so the
//! registry checks an entity's signature before it reads a slot.
//!
//! The registry keeps pools of different types side by side as
//! `Box<dyn Pool>` and downcasts back to the concrete `ComponentPool<T>` where
//! the component type is known.

use std::any::Any;

use crate::component::Component;
use crate::error::{EcsError, Result};

/// Number of slots a pool preallocates when created with [`ComponentPool::new`].
pub const DEFAULT_POOL_CAPACITY: usize = 100;

/// Type-erased view of a [`ComponentPool`].
pub trait Pool: Any {
    /// Empties the slot at `index`. Out-of-range indices are ignored.
    fn remove(&mut self, index: usize);

    /// Number of slots.
    fn len(&self) -> usize;

    /// Returns `true` if the pool has no slots.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of filled slots.
    fn occupied(&self) -> usize;

    /// Name of the stored component type.
    fn type_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete pool.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete pool.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense storage for one component type.
#[derive(Debug, Clone)]
pub struct ComponentPool<T> {
    data: Vec<Option<T>>,
}

impl<T: Component> ComponentPool<T> {
    /// Creates a pool with [`DEFAULT_POOL_CAPACITY`] empty slots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Creates a pool with `slots` empty slots.
    #[must_use]
    pub fn with_capacity(slots: usize) -> Self {
        let mut data = Vec::with_capacity(slots);
        data.resize_with(slots, || None);
        Self { data }
    }

    /// Grows the pool to at least `slots` slots. Never shrinks.
    pub fn resize(&mut self, slots: usize) {
        if slots > self.data.len() {
            self.data.resize_with(slots, || None);
        }
    }

    /// Stores `value` at `index`, growing the pool if needed.
    pub fn set(&mut self, index: usize, value: T) {
        self.resize(index + 1);
        self.data[index] = Some(value);
    }

    /// Returns the component at `index`.
    pub fn get(&self, index: usize) -> Result<&T> {
        self.data
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(EcsError::EmptySlot {
                index,
                component: T::type_name(),
            })
    }

    /// Returns the component at `index` mutably.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        self.data
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(EcsError::EmptySlot {
                index,
                component: T::type_name(),
            })
    }

}

impl<T: Component> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> Pool for ComponentPool<T> {
    fn remove(&mut self, index: usize) {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = None;
        }
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn occupied(&self) -> usize {
        self.data.iter().filter(|slot| slot.is_some()).count()
    }

    fn type_name(&self) -> &'static str {
        T::type_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    #[test]
    fn test_new_pool_preallocates_empty_slots() {
        let pool = ComponentPool::<Position>::new();
        assert_eq!(pool.len(), DEFAULT_POOL_CAPACITY);
        assert_eq!(pool.occupied(), 0);
        assert!(!Pool::is_empty(&pool));
    }

    #[test]
    fn test_set_and_get() {
        let mut pool = ComponentPool::with_capacity(4);
        pool.set(2, Position { x: 1.0, y: 2.0 });
        assert_eq!(pool.get(2).unwrap(), &Position { x: 1.0, y: 2.0 });
        assert!(pool.get(1).is_err());
        assert_eq!(pool.occupied(), 1);
    }

    #[test]
    fn test_set_grows_past_capacity() {
        let mut pool = ComponentPool::with_capacity(2);
        pool.set(10, Position { x: 0.0, y: 0.0 });
        assert_eq!(pool.len(), 11);
        assert!(pool.get(10).is_ok());
    }

    #[test]
    fn test_growth_is_monotonic() {
        let mut pool = ComponentPool::<Position>::with_capacity(8);
        pool.resize(3);
        assert_eq!(pool.len(), 8);
        pool.set(0, Position { x: 0.0, y: 0.0 });
        assert_eq!(pool.len(), 8);
    }

    #[test]
    fn test_empty_and_out_of_range_slots_fail() {
        let pool = ComponentPool::<Position>::with_capacity(2);
        assert_eq!(
            pool.get(1).unwrap_err(),
            EcsError::EmptySlot {
                index: 1,
                component: "Position",
            }
        );
        assert!(pool.get(50).is_err());
    }

    #[test]
    fn test_remove_empties_slot() {
        let mut pool = ComponentPool::with_capacity(2);
        pool.set(0, Position { x: 3.0, y: 4.0 });
        Pool::remove(&mut pool, 0);
        assert!(pool.get(0).is_err());
        // Out-of-range removal is a no-op.
        Pool::remove(&mut pool, 99);
    }

    #[test]
    fn test_get_mut() {
        let mut pool = ComponentPool::with_capacity(1);
        pool.set(0, Position { x: 1.0, y: 1.0 });
        pool.get_mut(0).unwrap().x = 5.0;
        assert_eq!(pool.get(0).unwrap().x, 5.0);
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let mut erased: Box<dyn Pool> = Box::new(ComponentPool::<Position>::with_capacity(1));
        assert_eq!(erased.type_name(), "Position");
        let typed = erased
            .as_any_mut()
            .downcast_mut::<ComponentPool<Position>>()
            .unwrap();
        typed.set(0, Position { x: 9.0, y: 9.0 });
        assert_eq!(erased.occupied(), 1);
        erased.remove(0);
        assert_eq!(erased.occupied(), 0);
        assert!(!erased.is_empty());
    }
}
