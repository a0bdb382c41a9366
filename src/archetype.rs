// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Archetype bitmasks and the per-archetype entity buckets

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::entity::Entity;

/// Number of distinct tags an archetype can encode
pub const MAX_TAGS: usize = u128::BITS as usize;

/// Tag-set bitmask. Bit `n` is the `n`-th tag ever registered.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Archetype(u128);

impl Archetype {
    /// The zero archetype; a subset of every archetype
    pub const EMPTY: Archetype = Archetype(0);

    /// Archetype with only bit `index` set.
    ///
    /// Returns `None` if `index` is outside the bitmask.
    pub fn from_bit(index: usize) -> Option<Self> {
        if index >= MAX_TAGS {
            return None;
        }
        Some(Archetype(1u128 << index))
    }

    /// Wrap raw bits
    pub const fn from_bits(bits: u128) -> Self {
        Archetype(bits)
    }

    /// Raw bits
    pub const fn bits(self) -> u128 {
        self.0
    }

    /// True if every bit of `other` is also set in `self`
    pub const fn contains(self, other: Archetype) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if bit `index` is set
    pub fn has_bit(self, index: usize) -> bool {
        index < MAX_TAGS && (self.0 >> index) & 1 == 1
    }

    /// Number of tags encoded
    pub fn tag_count(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterator over the indices of set bits, lowest first
    pub fn ones(self) -> OnesIter {
        OnesIter { remaining: self.0 }
    }
}

impl BitOr for Archetype {
    type Output = Archetype;

    fn bitor(self, rhs: Self) -> Self::Output {
        Archetype(self.0 | rhs.0)
    }
}

impl BitOrAssign for Archetype {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Archetype({:#b})", self.0)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

pub struct OnesIter {
    remaining: u128,
}

impl Iterator for OnesIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let trailing = self.remaining.trailing_zeros();
        self.remaining &= !(1u128 << trailing); // Clear the bit we just found
        Some(trailing as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

/// Bucket: entities born with exactly one archetype, in insertion order
pub struct Bucket {
    archetype: Archetype,
    entities: Vec<Entity>,
}

impl Bucket {
    /// Create new bucket
    pub fn new(archetype: Archetype, capacity: usize) -> Self {
        Self {
            archetype,
            entities: Vec::with_capacity(capacity),
        }
    }

    /// Archetype shared by every entity in the bucket
    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Append at the tail
    pub fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Position of `entity` by identity
    pub fn position_of(&self, entity: &Entity) -> Option<usize> {
        self.entities.iter().position(|e| e.ptr_eq(entity))
    }

    /// Remove the entity at `index`, keeping the order of the rest.
    ///
    /// Returns `None` if `index` is out of bounds.
    pub fn remove_at(&mut self, index: usize) -> Option<Entity> {
        if index >= self.entities.len() {
            return None;
        }
        Some(self.entities.remove(index))
    }

    /// All entities
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if bucket is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn into_entities(self) -> Vec<Entity> {
        self.entities
    }
}
