//! Synchronous add/remove event bus
//!
//! Each kind has its own ordered subscriber list. Wildcard subscribers run
//! after the kind-specific ones. Dispatch works on a snapshot of the lists
//! with no lock held, so subscribers may re-enter the bus or the entity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::error::Result;
use crate::event::{EntityEvent, EventKind};
use crate::event_subscriber::CallbackSubscriber;

/// Subscriber that listens for entity events
pub trait EntitySubscriber: Send + Sync {
    /// Called when an event is emitted. An error aborts the dispatch.
    fn on_event(&self, event: &EntityEvent) -> Result<()>;

    /// Get subscriber name for debugging
    fn name(&self) -> &str {
        "UnnamedSubscriber"
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type SubscriberList = Vec<(SubscriptionId, Arc<dyn EntitySubscriber>)>;

#[derive(Default)]
struct Subscribers {
    add: SubscriberList,
    remove: SubscriberList,
    all: SubscriberList,
}

impl Subscribers {
    fn list(&self, kind: EventKind) -> &SubscriberList {
        match kind {
            EventKind::Add => &self.add,
            EventKind::Remove => &self.remove,
        }
    }

    fn list_mut(&mut self, kind: EventKind) -> &mut SubscriberList {
        match kind {
            EventKind::Add => &mut self.add,
            EventKind::Remove => &mut self.remove,
        }
    }
}

/// Event bus owned by a world
pub struct EventBus {
    subscribers: RwLock<Subscribers>,
    next_id: AtomicU64,
    emitted_count: AtomicU64,
}

impl EventBus {
    /// Create new event bus
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Subscribers::default()),
            next_id: AtomicU64::new(0),
            emitted_count: AtomicU64::new(0),
        }
    }

    /// Subscribe to one event kind
    pub fn subscribe<S: EntitySubscriber + 'static>(
        &self,
        kind: EventKind,
        subscriber: S,
    ) -> SubscriptionId {
        self.subscribe_shared(kind, Arc::new(subscriber))
    }

    /// Subscribe a subscriber the caller keeps a handle to
    pub fn subscribe_shared(
        &self,
        kind: EventKind,
        subscriber: Arc<dyn EntitySubscriber>,
    ) -> SubscriptionId {
        let id = self.allocate_id();
        self.subscribers
            .write()
            .list_mut(kind)
            .push((id, subscriber));
        id
    }

    /// Subscribe a closure to one event kind
    pub fn on<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&EntityEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.subscribe(kind, CallbackSubscriber::new(callback))
    }

    /// Subscribe to every event kind
    pub fn subscribe_all<S: EntitySubscriber + 'static>(&self, subscriber: S) -> SubscriptionId {
        self.subscribe_all_shared(Arc::new(subscriber))
    }

    pub fn subscribe_all_shared(&self, subscriber: Arc<dyn EntitySubscriber>) -> SubscriptionId {
        let id = self.allocate_id();
        self.subscribers.write().all.push((id, subscriber));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut guard = self.subscribers.write();
        let subscribers = &mut *guard;
        for list in [
            &mut subscribers.add,
            &mut subscribers.remove,
            &mut subscribers.all,
        ] {
            if let Some(pos) = list.iter().position(|(sub_id, _)| *sub_id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver `event` to its kind's subscribers, then to wildcard
    /// subscribers, in registration order.
    ///
    /// Stops at the first subscriber error and returns it.
    pub fn emit(&self, event: &EntityEvent) -> Result<()> {
        let snapshot: SmallVec<[Arc<dyn EntitySubscriber>; 8]> = {
            let subscribers = self.subscribers.read();
            subscribers
                .list(event.kind())
                .iter()
                .chain(subscribers.all.iter())
                .map(|(_, sub)| Arc::clone(sub))
                .collect()
        };

        self.emitted_count.fetch_add(1, Ordering::Relaxed);
        for subscriber in snapshot {
            if let Err(err) = subscriber.on_event(event) {
                tracing::debug!(
                    subscriber = subscriber.name(),
                    event = event.event_type(),
                    entity = event.entity().id(),
                    %err,
                    "subscriber failed"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Total events emitted
    pub fn emitted_count(&self) -> u64 {
        self.emitted_count.load(Ordering::Relaxed)
    }

    /// Get subscriber count for event kind (wildcards excluded)
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.read().list(kind).len()
    }

    /// Get total subscriber count
    pub fn total_subscribers(&self) -> usize {
        let subscribers = self.subscribers.read();
        subscribers.add.len() + subscribers.remove.len() + subscribers.all.len()
    }

    /// Remove all subscribers
    pub fn clear_subscribers(&self) {
        *self.subscribers.write() = Subscribers::default();
    }

    fn allocate_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
