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

//! Tag ECS - in-memory entity store indexed by tag archetypes
//!
//! Entities are assembled from named components. Each distinct component
//! tag owns one bit; an entity's archetype is the OR of its birth tags, and
//! the [`World`] groups entities into buckets by that bitmask. External
//! adapters follow entity creation and disposal through the world's
//! [`EventBus`].
//!
//! ```
//! use tag_ecs::prelude::*;
//!
//! let mut world = World::new();
//! let ship = world
//!     .add_entity([Component::new("position").with_value("x", 0).with_value("y", 0)])
//!     .unwrap();
//! world.add_entity(["marker"]).unwrap();
//!
//! assert_eq!(world.query_entities(["position"]).unwrap(), vec![ship]);
//! ```

pub mod archetype;
pub mod component;
pub mod config;
pub mod debug;
pub mod entity;
pub mod error;
pub mod event;
pub mod event_bus;
pub mod event_subscriber;
pub mod prelude;
#[cfg(feature = "profiling")]
pub mod profiling;
pub mod query;
pub mod registry;
pub mod utils;
pub mod world;


pub use archetype::*;
pub use component::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use event::*;
pub use event_bus::*;
pub use event_subscriber::*;
pub use query::*;
pub use registry::*;
pub use world::*;
