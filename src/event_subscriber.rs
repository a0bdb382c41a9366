use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Result;
use crate::event::EntityEvent;
use crate::event_bus::EntitySubscriber;

type EventCallback = Box<dyn Fn(&EntityEvent) -> Result<()> + Send + Sync>;
type EventFilter = Box<dyn Fn(&EntityEvent) -> bool + Send + Sync>;

/// Logging subscriber that traces all events
pub struct LoggingSubscriber;

impl EntitySubscriber for LoggingSubscriber {
    fn on_event(&self, event: &EntityEvent) -> Result<()> {
        let entity = event.entity();
        tracing::info!(
            event = event.event_type(),
            entity = entity.id(),
            archetype = %entity.archetype(),
            "entity event"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "LoggingSubscriber"
    }
}

/// Statistics subscriber that counts events
#[derive(Default)]
pub struct StatisticsSubscriber {
    added: AtomicUsize,
    removed: AtomicUsize,
}

impl StatisticsSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn added(&self) -> usize {
        self.added.load(Ordering::Relaxed)
    }

    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.added.store(0, Ordering::Relaxed);
        self.removed.store(0, Ordering::Relaxed);
    }
}

impl EntitySubscriber for StatisticsSubscriber {
    fn on_event(&self, event: &EntityEvent) -> Result<()> {
        match event {
            EntityEvent::Add(_) => self.added.fetch_add(1, Ordering::Relaxed),
            EntityEvent::Remove(_) => self.removed.fetch_add(1, Ordering::Relaxed),
        };
        Ok(())
    }

    fn name(&self) -> &str {
        "StatisticsSubscriber"
    }
}

/// Callback-based subscriber
pub struct CallbackSubscriber {
    callback: EventCallback,
}

impl CallbackSubscriber {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&EntityEvent) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl EntitySubscriber for CallbackSubscriber {
    fn on_event(&self, event: &EntityEvent) -> Result<()> {
        (self.callback)(event)
    }

    fn name(&self) -> &str {
        "CallbackSubscriber"
    }
}

/// Filter-based subscriber (only processes matching events)
pub struct FilteredSubscriber {
    filter: EventFilter,
    handler: EventCallback,
}

impl FilteredSubscriber {
    pub fn new<F, H>(filter: F, handler: H) -> Self
    where
        F: Fn(&EntityEvent) -> bool + Send + Sync + 'static,
        H: Fn(&EntityEvent) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            filter: Box::new(filter),
            handler: Box::new(handler),
        }
    }

    /// Only forward events for entities carrying `tag`
    pub fn for_tag<H>(tag: impl Into<String>, handler: H) -> Self
    where
        H: Fn(&EntityEvent) -> Result<()> + Send + Sync + 'static,
    {
        let tag = tag.into();
        Self::new(move |event| event.entity().is(tag.as_str()), handler)
    }
}

impl EntitySubscriber for FilteredSubscriber {
    fn on_event(&self, event: &EntityEvent) -> Result<()> {
        if (self.filter)(event) {
            (self.handler)(event)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "FilteredSubscriber"
    }
}
