//! Tag registry: assigns each distinct tag a bit, first-seen order
//!
//! Bits are never reclaimed. A registry is owned by the caller and may be
//! shared by several worlds so their archetypes agree.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::archetype::{Archetype, MAX_TAGS};
use crate::error::{EcsError, Result};

/// Component tag
pub type Tag = String;

/// Tag that `Entity::is` treats as always present
pub const WILDCARD_TAG: &str = "*";

#[derive(Default)]
struct RegistryState {
    codes: FxHashMap<Tag, usize>,
    tags: Vec<Tag>,
}

/// Tag → bit registry and archetype calculator
pub struct TagRegistry {
    state: RwLock<RegistryState>,
    capacity: usize,
}

impl TagRegistry {
    /// Registry holding up to `MAX_TAGS` tags
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            capacity: MAX_TAGS,
        }
    }

    /// Registry holding at most `capacity` tags (clamped to `MAX_TAGS`)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            capacity: capacity.min(MAX_TAGS),
        }
    }

    /// Maximum number of distinct tags
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of registered tags
    pub fn len(&self) -> usize {
        self.state.read().tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Single-bit archetype of `tag`, registering it on first sight
    pub fn code_of(&self, tag: &str) -> Result<Archetype> {
        if let Some(&bit) = self.state.read().codes.get(tag) {
            return Ok(Self::code_for_bit(bit));
        }

        let mut state = self.state.write();
        // Another caller may have registered it between the two locks
        if let Some(&bit) = state.codes.get(tag) {
            return Ok(Self::code_for_bit(bit));
        }

        let bit = state.tags.len();
        if bit >= self.capacity {
            return Err(EcsError::TagCapacityExhausted {
                attempted: bit + 1,
                capacity: self.capacity,
            });
        }

        state.codes.insert(tag.to_owned(), bit);
        state.tags.push(tag.to_owned());
        tracing::trace!(tag, bit, "registered tag");
        Ok(Self::code_for_bit(bit))
    }

    /// Bitwise OR of `code_of` over `tags`. Empty input yields `Archetype::EMPTY`.
    pub fn archetype_of<I, S>(&self, tags: I) -> Result<Archetype>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .try_fold(Archetype::EMPTY, |acc, tag| Ok(acc | self.code_of(tag.as_ref())?))
    }

    /// Bit index of an already registered tag
    pub fn bit_of(&self, tag: &str) -> Option<usize> {
        self.state.read().codes.get(tag).copied()
    }

    /// Tag registered at bit `index`
    pub fn tag_at(&self, index: usize) -> Option<Tag> {
        self.state.read().tags.get(index).cloned()
    }

    /// Tags encoded in `archetype`, in bit order
    pub fn tags_of(&self, archetype: Archetype) -> Vec<Tag> {
        let state = self.state.read();
        archetype
            .ones()
            .filter_map(|bit| state.tags.get(bit).cloned())
            .collect()
    }

    fn code_for_bit(bit: usize) -> Archetype {
        // Bits handed out are always below capacity <= MAX_TAGS
        Archetype::from_bits(1u128 << bit)
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order() {
        let registry = TagRegistry::new();
        assert_eq!(registry.code_of("a").unwrap().bits(), 0b001);
        assert_eq!(registry.code_of("b").unwrap().bits(), 0b010);
        assert_eq!(registry.code_of("c").unwrap().bits(), 0b100);
        // Idempotent
        assert_eq!(registry.code_of("a").unwrap().bits(), 0b001);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.tag_at(1).as_deref(), Some("b"));
        assert_eq!(registry.bit_of("c"), Some(2));
    }

    #[test]
    fn test_archetype_is_order_independent() {
        let registry = TagRegistry::new();
        let forward = registry.archetype_of(["pos", "vel", "hp"]).unwrap();
        let backward = registry.archetype_of(["hp", "vel", "pos"]).unwrap();
        assert_eq!(forward, backward);

        let manual = registry.code_of("pos").unwrap()
            | registry.code_of("vel").unwrap()
            | registry.code_of("hp").unwrap();
        assert_eq!(forward, manual);
    }

    #[test]
    fn test_empty_tags_yield_empty_archetype() {
        let registry = TagRegistry::new();
        let empty: [&str; 0] = [];
        assert_eq!(registry.archetype_of(empty).unwrap(), Archetype::EMPTY);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_capacity_overflow_is_an_error() {
        let registry = TagRegistry::with_capacity(2);
        registry.code_of("a").unwrap();
        registry.code_of("b").unwrap();

        let err = registry.code_of("c").unwrap_err();
        assert_eq!(
            err,
            EcsError::TagCapacityExhausted {
                attempted: 3,
                capacity: 2
            }
        );
        // Nothing recorded, known tags still resolve
        assert_eq!(registry.len(), 2);
        assert!(registry.code_of("b").is_ok());
    }

    #[test]
    fn test_full_width_registry() {
        let registry = TagRegistry::new();
        for i in 0..MAX_TAGS {
            registry.code_of(&format!("tag{i}")).unwrap();
        }
        assert_eq!(registry.code_of("tag127").unwrap().bits(), 1u128 << 127);
        assert!(registry.code_of("one_too_many").is_err());
    }

    #[test]
    fn test_tags_of_roundtrip() {
        let registry = TagRegistry::new();
        let arch = registry.archetype_of(["x", "y"]).unwrap();
        registry.code_of("z").unwrap();
        assert_eq!(registry.tags_of(arch), vec!["x".to_string(), "y".to_string()]);
    }
}
