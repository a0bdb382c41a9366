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

//! World: archetype-indexed entity storage

use std::sync::Arc;

use ahash::AHashMap;

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::archetype::{Archetype, Bucket};
use crate::component::CompSpec;
use crate::config::WorldConfig;
use crate::entity::Entity;
use crate::error::Result;
use crate::event::{EntityEvent, EventKind};
use crate::event_bus::{EntitySubscriber, EventBus, SubscriptionId};
use crate::event_subscriber::LoggingSubscriber;
use crate::query::IntoTag;
use crate::registry::TagRegistry;

/// Central entity store.
///
/// Entities are grouped into buckets by the archetype they were born with
/// and stay in that bucket until removed, whatever components they gain
/// later. Queries include or skip whole buckets.
pub struct World {
    /// Buckets in creation order
    buckets: Vec<Bucket>,

    /// Maps archetype to bucket index
    bucket_index: AHashMap<Archetype, usize>,

    registry: Arc<TagRegistry>,

    /// Add/remove notifications for external adapters
    events: Arc<EventBus>,

    config: WorldConfig,
}

impl World {
    /// Create a new, empty world with its own tag registry.
    pub fn new() -> Self {
        Self::build(Arc::new(TagRegistry::new()), WorldConfig::default())
    }

    /// Create a world from a validated config
    pub fn with_config(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(TagRegistry::with_capacity(config.max_tags));
        Ok(Self::build(registry, config))
    }

    /// Create a world sharing `registry` with other worlds.
    ///
    /// The registry keeps its own capacity; `config.max_tags` is not applied.
    pub fn with_registry(registry: Arc<TagRegistry>, config: WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(registry, config))
    }

    fn build(registry: Arc<TagRegistry>, config: WorldConfig) -> Self {
        let events = Arc::new(EventBus::new());
        if config.log_events {
            events.subscribe_all(LoggingSubscriber);
        }
        Self {
            buckets: Vec::new(),
            bucket_index: AHashMap::new(),
            registry,
            events,
            config,
        }
    }

    /// Build an entity, append it to its archetype's bucket and emit `Add`.
    ///
    /// If an `Add` subscriber fails, the entity is already stored and the
    /// error is returned.
    pub fn add_entity<I, S>(&mut self, specs: I) -> Result<Entity>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompSpec>,
    {
        #[cfg(feature = "profiling")]
        let _span = info_span!("world.add_entity", bucket_count = self.buckets.len()).entered();

        let entity = self.make_entity(specs)?;
        let index = self.bucket_for(entity.archetype());
        self.buckets[index].push(entity.clone());

        tracing::debug!(entity = entity.id(), archetype = %entity.archetype(), "entity added");
        self.events.emit(&EntityEvent::Add(entity.clone()))?;
        Ok(entity)
    }

    /// Build an entity bound to this world's registry and event bus
    /// without storing it.
    pub fn make_entity<I, S>(&self, specs: I) -> Result<Entity>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompSpec>,
    {
        Entity::make(&self.registry, Arc::clone(&self.events), specs)
    }

    /// Take `entity` out of its bucket and dispose it.
    ///
    /// Unknown entities (no bucket for the archetype, or not in it) are
    /// ignored.
    pub fn remove_entity(&mut self, entity: &Entity) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("world.remove_entity", entity = entity.id()).entered();

        let Some(&index) = self.bucket_index.get(&entity.archetype()) else {
            return Ok(());
        };
        let bucket = &mut self.buckets[index];
        let Some(row) = bucket.position_of(entity) else {
            return Ok(());
        };

        if let Some(removed) = bucket.remove_at(row) {
            tracing::debug!(entity = removed.id(), "entity removed");
            removed.dispose()?;
        }
        Ok(())
    }

    /// Archetype of a query; registers unseen tags
    pub fn query_archetype<I>(&self, terms: I) -> Result<Archetype>
    where
        I: IntoIterator,
        I::Item: IntoTag,
    {
        self.registry
            .archetype_of(terms.into_iter().map(IntoTag::into_tag))
    }

    /// All entities of every bucket whose archetype contains the query's.
    ///
    /// Buckets come in creation order, entities in insertion order. An
    /// empty query returns every entity.
    pub fn query_entities<I>(&self, terms: I) -> Result<Vec<Entity>>
    where
        I: IntoIterator,
        I::Item: IntoTag,
    {
        Ok(self.query_iter(terms)?.cloned().collect())
    }

    /// Lazy form of [`World::query_entities`]
    pub fn query_iter<I>(&self, terms: I) -> Result<impl Iterator<Item = &Entity> + '_>
    where
        I: IntoIterator,
        I::Item: IntoTag,
    {
        #[cfg(feature = "profiling")]
        let _span = info_span!("world.query", bucket_count = self.buckets.len()).entered();

        let query = self.query_archetype(terms)?;
        tracing::trace!(%query, "query");
        Ok(self.matching_buckets(query).flat_map(|b| b.entities().iter()))
    }

    /// Buckets whose archetype contains `query`
    pub fn matching_buckets(&self, query: Archetype) -> impl Iterator<Item = &Bucket> + '_ {
        self.buckets
            .iter()
            .filter(move |bucket| bucket.archetype().contains(query))
    }

    /// Dispose every stored entity, then drop all buckets.
    ///
    /// Every entity is disposed even if some fail; the first error is
    /// returned.
    pub fn clear(&mut self) -> Result<()> {
        #[cfg(feature = "profiling")]
        let _span = info_span!("world.clear", entity_count = self.entity_count()).entered();

        let buckets = std::mem::take(&mut self.buckets);
        self.bucket_index.clear();

        let mut first_error = None;
        for bucket in buckets {
            for entity in bucket.into_entities() {
                if let Err(err) = entity.dispose() {
                    first_error.get_or_insert(err);
                }
            }
        }

        tracing::debug!("world cleared");
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// True if `entity` is stored in this world
    pub fn contains(&self, entity: &Entity) -> bool {
        self.bucket(entity.archetype())
            .is_some_and(|bucket| bucket.position_of(entity).is_some())
    }

    /// Number of stored entities
    pub fn entity_count(&self) -> usize {
        self.buckets.iter().map(Bucket::len).sum()
    }

    /// Number of buckets, including emptied ones
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets in creation order
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Bucket for an exact archetype
    pub fn bucket(&self, archetype: Archetype) -> Option<&Bucket> {
        let index = *self.bucket_index.get(&archetype)?;
        self.buckets.get(index)
    }

    pub fn registry(&self) -> &Arc<TagRegistry> {
        &self.registry
    }

    /// Event bus carrying this world's add/remove events
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Subscribe to one event kind on this world's bus
    pub fn subscribe<S: EntitySubscriber + 'static>(
        &self,
        kind: EventKind,
        subscriber: S,
    ) -> SubscriptionId {
        self.events.subscribe(kind, subscriber)
    }

    /// Remove a subscription from this world's bus
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    fn bucket_for(&mut self, archetype: Archetype) -> usize {
        if let Some(&index) = self.bucket_index.get(&archetype) {
            return index;
        }

        let index = self.buckets.len();
        self.buckets
            .push(Bucket::new(archetype, self.config.bucket_capacity));
        self.bucket_index.insert(archetype, index);
        tracing::trace!(%archetype, index, "bucket created");
        index
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
