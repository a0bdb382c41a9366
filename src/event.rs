use crate::entity::Entity;

/// Lifecycle event kinds carried by the event bus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Entity inserted into a world
    Add,
    /// Entity disposed
    Remove,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Add => "add",
            EventKind::Remove => "remove",
        }
    }
}

/// Entity lifecycle events delivered to subscribers
#[derive(Clone, Debug)]
pub enum EntityEvent {
    /// Entity was created through a world and stored in its bucket
    Add(Entity),

    /// Entity was disposed
    Remove(Entity),
}

impl EntityEvent {
    /// Get the entity involved in this event
    pub fn entity(&self) -> &Entity {
        match self {
            EntityEvent::Add(entity) => entity,
            EntityEvent::Remove(entity) => entity,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            EntityEvent::Add(_) => EventKind::Add,
            EntityEvent::Remove(_) => EventKind::Remove,
        }
    }

    /// Get event type name for debugging
    pub fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::EventBus;
    use crate::registry::TagRegistry;
    use std::sync::Arc;

    #[test]
    fn test_event_entity_and_kind() {
        let registry = TagRegistry::new();
        let entity = Entity::make(&registry, Arc::new(EventBus::new()), ["a"]).unwrap();

        let event = EntityEvent::Add(entity.clone());
        assert_eq!(event.entity(), &entity);
        assert_eq!(event.kind(), EventKind::Add);
        assert_eq!(EntityEvent::Remove(entity).event_type(), "remove");
    }
}
