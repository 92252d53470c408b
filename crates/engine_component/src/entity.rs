//! Entity handles and the generational id allocator.
//!
//! An [`Entity`] is a `u32` slot index paired with a generation counter. The
//! index addresses the registry's signature table and every component pool;
//! the generation tells a live handle apart from a stale one after the slot
//! has been recycled.

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, Result};

/// A handle to an entity.
///
/// Entities carry no data of their own. Equality and ordering compare the id
/// first and the generation second, so a recycled slot never compares equal
/// to a handle from its previous life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity {
    id: u32,
    generation: u32,
}

impl Entity {
    /// Create a handle from raw parts.
    #[must_use]
    pub const fn from_raw_parts(id: u32, generation: u32) -> Self {
        Self { id, generation }
    }

    /// Returns the slot index.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.id
    }

    /// Returns the generation of the slot this handle was issued for.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Returns the slot index as a `usize` for table lookups.
    #[must_use]
    pub const fn index(self) -> usize {
        self.id as usize
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}v{})", self.id, self.generation)
    }
}

/// Lifecycle of one id slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Alive,
    /// Killed, id still reserved.
    Dead,
    /// On the free list.
    Free,
}

/// Hands out entity ids and tracks which handles are still valid.
///
/// Fresh ids increase monotonically from zero. Released ids go onto a free
/// list and are reissued with a bumped generation, so a handle kept past
/// [`EntityAllocator::kill`] is rejected by [`EntityAllocator::validate`].
#[derive(Debug, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl EntityAllocator {
    /// Creates an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an entity, reusing a released slot when one is available.
    pub fn allocate(&mut self) -> Entity {
        self.live += 1;
        if let Some(id) = self.free.pop() {
            let slot = id as usize;
            self.slots[slot] = Slot::Alive;
            return Entity::from_raw_parts(id, self.generations[slot]);
        }
        let id = u32::try_from(self.generations.len()).expect("entity id space exhausted");
        self.generations.push(0);
        self.slots.push(Slot::Alive);
        Entity::from_raw_parts(id, 0)
    }

    /// Marks a live entity dead and bumps its slot's generation.
    ///
    /// The id stays reserved until [`EntityAllocator::release`] puts it back on
    /// the free list.
    pub fn kill(&mut self, entity: Entity) -> Result<()> {
        self.validate(entity)?;
        let slot = entity.index();
        self.slots[slot] = Slot::Dead;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.live -= 1;
        Ok(())
    }

    /// Returns a killed entity's id to the free list. Releasing an id twice,
    /// or releasing a live one, does nothing.
    pub fn release(&mut self, entity: Entity) {
        let slot = entity.index();
        if self.slots.get(slot) == Some(&Slot::Dead) {
            self.slots[slot] = Slot::Free;
            self.free.push(entity.id);
        }
    }

    /// Checks that `entity` is in range, alive and of the current generation.
    pub fn validate(&self, entity: Entity) -> Result<()> {
        let slot = entity.index();
        if slot >= self.generations.len() {
            return Err(EcsError::EntityOutOfRange {
                id: entity.id,
                len: self.generations.len(),
            });
        }
        if self.slots[slot] != Slot::Alive || self.generations[slot] != entity.generation {
            return Err(EcsError::StaleEntity(entity));
        }
        Ok(())
    }

    /// Returns `true` if `entity` refers to a live slot of the current generation.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.validate(entity).is_ok()
    }

    /// Iterates the live entities in id order.
    pub fn live(&self) -> impl Iterator<Item = Entity> + '_ {
        self.generations
            .iter()
            .zip(&self.slots)
            .enumerate()
            .filter(|(_, (_, state))| **state == Slot::Alive)
            .map(|(id, (&generation, _))| Entity::from_raw_parts(id as u32, generation))
    }

    /// Number of live entities.
    #[must_use]
    pub fn count(&self) -> usize {
        self.live
    }

    /// Number of slots ever allocated, live or not.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.generations.len()
    }
}
