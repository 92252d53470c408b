//! Component signatures.
//!
//! A [`Signature`] is a fixed-width bitset over [`ComponentTypeId`]s. Entities
//! carry one describing the components they currently have; systems carry one
//! describing the components they require. An entity belongs to a system
//! exactly when its signature [`matches`](Signature::matches) the system's.

use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

use crate::component::ComponentTypeId;

/// Maximum number of distinct component types a registry can hold.
pub const MAX_COMPONENTS: usize = 32;

/// A set of component type ids, one bit per id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(u32);

impl Signature {
    /// The empty signature.
    pub const EMPTY: Self = Self(0);

    /// Builds a signature from a list of ids.
    #[must_use]
    pub fn from_ids(ids: &[ComponentTypeId]) -> Self {
        ids.iter().fold(Self::EMPTY, |mut sig, &id| {
            sig.set(id);
            sig
        })
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Sets the bit for `id`.
    pub fn set(&mut self, id: ComponentTypeId) {
        self.0 |= Self::bit(id);
    }

    /// Clears the bit for `id`.
    pub fn clear(&mut self, id: ComponentTypeId) {
        self.0 &= !Self::bit(id);
    }

    /// Returns `true` if the bit for `id` is set.
    #[must_use]
    pub const fn test(self, id: ComponentTypeId) -> bool {
        self.0 & Self::bit(id) != 0
    }

    /// Returns `true` if every bit set in `required` is also set in `self`.
    ///
    /// ```text
    /// (self & required) == required
    /// ```
    #[must_use]
    pub const fn matches(self, required: Signature) -> bool {
        self.0 & required.0 == required.0
    }

    /// Clears every bit.
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of bits set.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates the ids whose bits are set, in ascending order.
    pub fn ids(self) -> impl Iterator<Item = ComponentTypeId> {
        (0..MAX_COMPONENTS as u8)
            .map(ComponentTypeId)
            .filter(move |&id| self.test(id))
    }

    const fn bit(id: ComponentTypeId) -> u32 {
        1 << id.0
    }
}

impl BitOr for Signature {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Signature {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$b}", self.0, width = MAX_COMPONENTS)
    }
}
