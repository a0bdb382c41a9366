//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use tag_ecs::prelude::*;
//! ```

pub use crate::archetype::Archetype;
pub use crate::component::{CompRef, CompSpec, Component, Field, Value};
pub use crate::config::WorldConfig;
pub use crate::debug::WorldInspector;
pub use crate::entity::Entity;
pub use crate::error::{EcsError, Result};
pub use crate::event::{EntityEvent, EventKind};
pub use crate::event_bus::{EntitySubscriber, EventBus, SubscriptionId};
pub use crate::query::{CompFn, IntoTag};
pub use crate::registry::{Tag, TagRegistry};
pub use crate::world::World;
