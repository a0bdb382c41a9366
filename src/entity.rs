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

//! Entities: identity, merged component properties and lifecycle
//!
//! An [`Entity`] is a cheap, clonable handle. Clones share the same
//! component table, and equality is identity.
//!
//! Every non-reserved field of every component is exposed on the entity
//! through a property registry (field name → owning component). A field
//! name can be claimed by one component only.
//!
//! The archetype is computed once, from the tags given to the factory.
//! Components attached later with [`Entity::add_comp`] do not change it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use smallvec::SmallVec;

use crate::archetype::Archetype;
use crate::component::{CompRef, CompSpec, Field, Value, RESERVED_FIELDS};
use crate::error::{EcsError, Result};
use crate::event::EntityEvent;
use crate::event_bus::EventBus;
use crate::query::TagQuery;
use crate::registry::{Tag, TagRegistry};
use crate::utils::next_entity_id;

/// Names the entity itself answers to; component fields cannot take them
pub const ENTITY_SURFACE: [&str; 4] = ["archetype", "comp", "add_comp", "is"];

#[derive(Default)]
struct EntityState {
    /// Registered components, registration order
    components: Vec<CompRef>,
    /// Tag → slot in `components`
    slots: AHashMap<Tag, usize>,
    /// Field name → component that claimed it
    properties: AHashMap<String, CompRef>,
    /// Property names, merge order
    property_order: Vec<String>,
}

impl EntityState {
    // Same tag replaces the record but keeps its slot
    fn register(&mut self, comp: CompRef) {
        match self.slots.get(comp.id()) {
            Some(&slot) => self.components[slot] = comp,
            None => {
                self.slots.insert(comp.id().to_owned(), self.components.len());
                self.components.push(comp);
            }
        }
    }
}

struct EntityInner {
    id: u64,
    archetype: Archetype,
    events: Arc<EventBus>,
    state: RwLock<EntityState>,
}

/// Handle to a uniquely identified bag of components
#[derive(Clone)]
pub struct Entity {
    inner: Arc<EntityInner>,
}

impl Entity {
    /// Entity factory.
    ///
    /// Assigns a fresh id, computes the archetype from the spec tags, then
    /// merges each spec in order. `events` receives the `Remove` event when
    /// the entity is disposed.
    ///
    /// # Errors
    /// `TagCapacityExhausted` if a new tag does not fit the registry,
    /// `DuplicateComponentProperty` if two components expose the same field.
    pub fn make<I, S>(registry: &TagRegistry, events: Arc<EventBus>, specs: I) -> Result<Entity>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompSpec>,
    {
        let id = next_entity_id();
        let specs: SmallVec<[CompSpec; 8]> = specs.into_iter().map(Into::into).collect();
        let archetype = registry.archetype_of(specs.iter().map(CompSpec::tag))?;

        let entity = Entity {
            inner: Arc::new(EntityInner {
                id,
                archetype,
                events,
                state: RwLock::new(EntityState::default()),
            }),
        };

        for spec in specs {
            entity.add_comp(spec)?;
        }

        tracing::trace!(entity = id, %archetype, "entity created");
        Ok(entity)
    }

    /// Process-wide unique id
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Archetype computed at construction
    pub fn archetype(&self) -> Archetype {
        self.inner.archetype
    }

    /// Registered component for `tag`
    pub fn comp(&self, tag: &str) -> Option<CompRef> {
        let state = self.inner.state.read();
        state
            .slots
            .get(tag)
            .map(|&slot| state.components[slot].clone())
    }

    /// True if a component with `tag` is registered
    pub fn has_comp(&self, tag: &str) -> bool {
        self.inner.state.read().slots.contains_key(tag)
    }

    /// Attach one more component (or bare tag).
    ///
    /// Uses the same merge rules as construction. The archetype is not
    /// recomputed. An empty bare tag is ignored.
    ///
    /// Merging stops at the first colliding field: the component stays
    /// registered and the fields before the collision stay merged.
    pub fn add_comp(&self, spec: impl Into<CompSpec>) -> Result<()> {
        let spec = spec.into();
        if matches!(&spec, CompSpec::Tag(tag) if tag.is_empty()) {
            return Ok(());
        }

        let comp = CompRef::register(spec.into_component());
        let names = comp.field_names();

        let mut state = self.inner.state.write();
        state.register(comp.clone());

        for name in names {
            if RESERVED_FIELDS.contains(&name.as_str()) {
                continue;
            }
            if ENTITY_SURFACE.contains(&name.as_str()) || state.properties.contains_key(&name) {
                tracing::debug!(entity = self.inner.id, field = %name, tag = comp.id(), "duplicate component property");
                return Err(EcsError::DuplicateComponentProperty(name));
            }
            state.property_order.push(name.clone());
            state.properties.insert(name, comp.clone());
        }
        Ok(())
    }

    /// Tag test: a single tag (`"*"` always matches) or all of a list
    pub fn is<Q: TagQuery + ?Sized>(&self, query: &Q) -> bool {
        query.matched_by(self)
    }

    /// Emit `Remove`, then run every component's dispose callback in
    /// registration order.
    ///
    /// Does not take the entity out of any world.
    pub fn dispose(&self) -> Result<()> {
        self.inner.events.emit(&EntityEvent::Remove(self.clone()))?;

        let components = self.inner.state.read().components.clone();
        for comp in &components {
            comp.dispose()?;
        }
        Ok(())
    }

    /// Read a merged property.
    ///
    /// Accessors without a getter read as `Null`.
    pub fn get(&self, name: &str) -> Result<Value> {
        match self.property(name)? {
            Field::Value(value) => Ok(value),
            Field::Accessor { get: Some(get), .. } => get(self),
            Field::Accessor { get: None, .. } => Ok(Value::Null),
            Field::Method(_) => Err(EcsError::PropertyNotValue(name.to_owned())),
        }
    }

    /// Read a merged property and deserialize it
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        Ok(serde_json::from_value(self.get(name)?)?)
    }

    /// Write a merged property.
    ///
    /// Data fields are replaced on the owning component; accessors go
    /// through their setter.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let owner = self.owner_of(name)?;
        match owner.field(name) {
            Some(Field::Value(_)) | None => {
                owner.set_value(name, value);
                Ok(())
            }
            Some(Field::Accessor { set: Some(set), .. }) => set(self, value.into()),
            Some(Field::Accessor { set: None, .. }) | Some(Field::Method(_)) => {
                Err(EcsError::PropertyReadOnly(name.to_owned()))
            }
        }
    }

    /// Invoke a merged method with this entity as context
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        match self.property(name)? {
            Field::Method(method) => method(self, args),
            _ => Err(EcsError::PropertyNotCallable(name.to_owned())),
        }
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.inner.state.read().properties.contains_key(name)
    }

    /// Merged property names, merge order
    pub fn property_names(&self) -> Vec<String> {
        self.inner.state.read().property_order.clone()
    }

    /// Registered tags, registration order
    pub fn tags(&self) -> Vec<Tag> {
        self.inner
            .state
            .read()
            .components
            .iter()
            .map(|c| c.id().to_owned())
            .collect()
    }

    /// Number of registered components
    pub fn component_count(&self) -> usize {
        self.inner.state.read().components.len()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &Entity) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn owner_of(&self, name: &str) -> Result<CompRef> {
        self.inner
            .state
            .read()
            .properties
            .get(name)
            .cloned()
            .ok_or_else(|| EcsError::PropertyNotFound(name.to_owned()))
    }

    // The entity lock is released before any user callback runs
    fn property(&self, name: &str) -> Result<Field> {
        self.owner_of(name)?
            .field(name)
            .ok_or_else(|| EcsError::PropertyNotFound(name.to_owned()))
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.inner.id)
            .field("archetype", &self.inner.archetype)
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use serde_json::json;
    use std::sync::Mutex;

    fn make<I, S>(registry: &TagRegistry, specs: I) -> Result<Entity>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompSpec>,
    {
        Entity::make(registry, Arc::new(EventBus::new()), specs)
    }

    #[test]
    fn test_ids_strictly_increase() {
        let registry = TagRegistry::new();
        let a = make(&registry, ["a"]).unwrap();
        let b = make(&registry, ["a"]).unwrap();
        let c = make(&registry, ["b"]).unwrap();
        assert!(a.id() < b.id());
        assert!(b.id() < c.id());
    }

    #[test]
    fn test_archetype_from_spec_tags() {
        let registry = TagRegistry::new();
        let e = make(
            &registry,
            vec![
                CompSpec::from(Component::new("position").with_value("x", 0)),
                CompSpec::from("marker"),
            ],
        )
        .unwrap();
        assert_eq!(
            e.archetype(),
            registry.archetype_of(["marker", "position"]).unwrap()
        );
        assert!(e.comp("position").is_some());
        assert!(e.comp("marker").is_some());
        assert!(e.comp("velocity").is_none());
    }

    #[test]
    fn test_merged_fields_read_and_write_through() {
        let registry = TagRegistry::new();
        let e = make(
            &registry,
            [Component::new("position").with_value("x", 1).with_value("y", 2)],
        )
        .unwrap();

        assert_eq!(e.get("x").unwrap(), json!(1));
        e.set("x", 10).unwrap();
        assert_eq!(e.get_as::<i64>("x").unwrap(), 10);
        // The component record sees the write
        assert_eq!(e.comp("position").unwrap().value("x"), Some(json!(10)));

        // And the entity sees writes made on the record
        e.comp("position").unwrap().set_value("y", 20);
        assert_eq!(e.get("y").unwrap(), json!(20));

        assert_eq!(e.property_names(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_reserved_fields_are_not_merged() {
        let registry = TagRegistry::new();
        let comp = Component::from_value(json!({"id": "thing", "dispose": 1, "size": 3})).unwrap();
        let e = make(&registry, [comp]).unwrap();
        assert!(!e.has_property("dispose"));
        assert!(!e.has_property("id"));
        assert!(e.has_property("size"));
    }

    #[test]
    fn test_duplicate_property_fails_both_orders() {
        let registry = TagRegistry::new();
        let a = Component::new("a").with_value("shared", 1);
        let b = Component::new("b").with_value("shared", 2);

        let err = make(&registry, [a.clone(), b.clone()]).unwrap_err();
        assert_eq!(err, EcsError::DuplicateComponentProperty("shared".into()));

        let err = make(&registry, [b, a]).unwrap_err();
        assert_eq!(err, EcsError::DuplicateComponentProperty("shared".into()));
    }

    #[test]
    fn test_entity_surface_names_are_claimed() {
        let registry = TagRegistry::new();
        let err = make(&registry, [Component::new("a").with_value("archetype", 1)]).unwrap_err();
        assert_eq!(err, EcsError::DuplicateComponentProperty("archetype".into()));
    }

    #[test]
    fn test_partial_merge_before_collision_is_kept() {
        let registry = TagRegistry::new();
        let e = make(&registry, [Component::new("a").with_value("x", 1)]).unwrap();

        let late = Component::new("b").with_value("y", 2).with_value("x", 3);
        assert!(e.add_comp(late).is_err());

        assert!(e.comp("b").is_some());
        assert_eq!(e.get("y").unwrap(), json!(2));
        // First claim wins
        assert_eq!(e.get("x").unwrap(), json!(1));
    }

    #[test]
    fn test_same_tag_overwrites_table_entry() {
        let registry = TagRegistry::new();
        let e = make(
            &registry,
            [
                Component::new("a").with_value("first", 1),
                Component::new("b"),
                Component::new("a").with_value("second", 2),
            ],
        )
        .unwrap();

        assert_eq!(e.tags(), vec!["a".to_string(), "b".to_string()]);
        let a = e.comp("a").unwrap();
        assert_eq!(a.value("second"), Some(json!(2)));
        // The earlier record still backs the property it claimed
        assert_eq!(e.get("first").unwrap(), json!(1));
    }

    #[test]
    fn test_add_comp_keeps_archetype() {
        let registry = TagRegistry::new();
        let e = make(&registry, ["a"]).unwrap();
        let before = e.archetype();

        e.add_comp("b").unwrap();
        assert_eq!(e.archetype(), before);
        assert!(e.is("b"));
        assert!(e.is(&["a", "b"]));
    }

    #[test]
    fn test_add_comp_ignores_empty_tag() {
        let registry = TagRegistry::new();
        let e = make(&registry, ["a"]).unwrap();
        e.add_comp("").unwrap();
        assert_eq!(e.component_count(), 1);
    }

    #[test]
    fn test_is_semantics() {
        let registry = TagRegistry::new();
        let e = make(&registry, ["a", "b"]).unwrap();
        assert!(e.is("*"));
        assert!(e.is("a"));
        assert!(!e.is("c"));
        assert!(e.is(&["a", "b"]));
        assert!(!e.is(&["a", "c"]));
        assert!(!e.is(&["*"]));
        let none: [&str; 0] = [];
        assert!(e.is(&none));
        assert!(e.is(&vec!["b".to_string()]));
    }

    #[test]
    fn test_methods_receive_entity_context() {
        let registry = TagRegistry::new();
        let position = Component::new("position").with_value("x", 3);
        let mover = Component::new("mover").with_method("step", |entity, args| {
            let dx = args.first().and_then(Value::as_i64).unwrap_or(1);
            let x: i64 = entity.get_as("x")?;
            entity.set("x", x + dx)?;
            Ok(json!(x + dx))
        });

        let e = make(&registry, [position, mover]).unwrap();
        assert_eq!(e.call("step", &[json!(4)]).unwrap(), json!(7));
        assert_eq!(e.get("x").unwrap(), json!(7));

        assert_eq!(
            e.call("x", &[]).unwrap_err(),
            EcsError::PropertyNotCallable("x".into())
        );
        assert_eq!(
            e.get("step").unwrap_err(),
            EcsError::PropertyNotValue("step".into())
        );
        assert_eq!(
            e.set("step", 1).unwrap_err(),
            EcsError::PropertyReadOnly("step".into())
        );
    }

    #[test]
    fn test_accessors_receive_entity_context() {
        let registry = TagRegistry::new();
        let health = Component::new("health")
            .with_value("hp_raw", 50)
            .with_getter("hp", |entity| entity.get("hp_raw"))
            .with_setter("hp", |entity, value| {
                let clamped = value.as_i64().unwrap_or(0).clamp(0, 100);
                entity.set("hp_raw", clamped)
            })
            .with_getter("label", |_| Ok(json!("health")));

        let e = make(&registry, [health]).unwrap();
        assert_eq!(e.get("hp").unwrap(), json!(50));
        e.set("hp", 250).unwrap();
        assert_eq!(e.get("hp").unwrap(), json!(100));

        assert_eq!(
            e.set("label", "x").unwrap_err(),
            EcsError::PropertyReadOnly("label".into())
        );
        assert_eq!(
            e.get("missing").unwrap_err(),
            EcsError::PropertyNotFound("missing".into())
        );
    }

    #[test]
    fn test_write_only_accessor_reads_null() {
        let registry = TagRegistry::new();
        let sink = Component::new("sink").with_setter("input", |_, _| Ok(()));
        let e = make(&registry, [sink]).unwrap();
        assert_eq!(e.get("input").unwrap(), Value::Null);
        e.set("input", 1).unwrap();
    }

    #[test]
    fn test_dispose_order_and_remove_event() {
        let registry = TagRegistry::new();
        let bus = Arc::new(EventBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_remove = Arc::clone(&log);
        bus.on(crate::event::EventKind::Remove, move |event| {
            log_remove
                .lock()
                .unwrap()
                .push(format!("remove:{}", event.entity().id()));
            Ok(())
        });

        let comp = |tag: &'static str| {
            let log = Arc::clone(&log);
            Component::new(tag).on_dispose(move |c| {
                log.lock().unwrap().push(format!("dispose:{}", c.id()));
                Ok(())
            })
        };

        let e = Entity::make(&registry, Arc::clone(&bus), [comp("a"), comp("b")]).unwrap();
        e.add_comp(comp("c")).unwrap();
        e.dispose().unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                format!("remove:{}", e.id()),
                "dispose:a".to_string(),
                "dispose:b".to_string(),
                "dispose:c".to_string(),
            ]
        );
    }

    #[test]
    fn test_identity_equality() {
        let registry = TagRegistry::new();
        let a = make(&registry, ["a"]).unwrap();
        let b = make(&registry, ["a"]).unwrap();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
