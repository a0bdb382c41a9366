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

//! Components and component specs
//!
//! A component is a tagged record of named fields. Fields are plain data,
//! methods, or accessor pairs; methods and accessors receive the owning
//! entity when invoked through it, so a component can reach its siblings.
//!
//! Components are handed to the entity factory as [`CompSpec`]s: either a
//! bare tag or a full [`Component`]. Once merged, the entity keeps a shared
//! [`CompRef`] to the record.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::entity::Entity;
use crate::error::{EcsError, Result};
use crate::registry::Tag;

/// Dynamic field value
pub type Value = serde_json::Value;

/// Method invoked with the entity as context
pub type Method = Arc<dyn Fn(&Entity, &[Value]) -> Result<Value> + Send + Sync>;

/// Accessor read half
pub type Getter = Arc<dyn Fn(&Entity) -> Result<Value> + Send + Sync>;

/// Accessor write half
pub type Setter = Arc<dyn Fn(&Entity, Value) -> Result<()> + Send + Sync>;

/// Component teardown callback
pub type DisposeFn = Arc<dyn Fn(&CompRef) -> Result<()> + Send + Sync>;

/// Field names never merged onto an entity
pub const RESERVED_FIELDS: [&str; 2] = ["id", "dispose"];

/// A single named member of a component
#[derive(Clone)]
pub enum Field {
    /// Plain data
    Value(Value),
    /// Callable
    Method(Method),
    /// Get/set pair; either half may be missing
    Accessor {
        get: Option<Getter>,
        set: Option<Setter>,
    },
}

impl Field {
    pub fn is_method(&self) -> bool {
        matches!(self, Field::Method(_))
    }

    /// The plain value, if this is a data field
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Value(value) => write!(f, "Value({value})"),
            Field::Method(_) => write!(f, "Method"),
            Field::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
        }
    }
}

/// Component record, built before it is attached to an entity
#[derive(Clone)]
pub struct Component {
    id: Tag,
    fields: Vec<(String, Field)>,
    dispose: Option<DisposeFn>,
}

impl Component {
    /// Create a component with only a tag
    pub fn new(tag: impl Into<Tag>) -> Self {
        Self {
            id: tag.into(),
            fields: Vec::new(),
            dispose: None,
        }
    }

    /// Build from a JSON object carrying a string `id`.
    ///
    /// Every other key becomes a data field.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(EcsError::MissingTag);
        };
        let Some(Value::String(tag)) = map.get("id") else {
            return Err(EcsError::MissingTag);
        };

        let mut component = Component::new(tag.clone());
        for (name, value) in map {
            if name == "id" {
                continue;
            }
            component.insert_field(name, Field::Value(value));
        }
        Ok(component)
    }

    /// Build from any serializable record with a string `id` field
    pub fn from_serialize<T: Serialize>(record: &T) -> Result<Self> {
        Self::from_value(serde_json::to_value(record)?)
    }

    /// Component tag
    pub fn tag(&self) -> &str {
        &self.id
    }

    /// Add a data field
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert_field(name.into(), Field::Value(value.into()));
        self
    }

    /// Add a method
    pub fn with_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Entity, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert_field(name.into(), Field::Method(Arc::new(method)));
        self
    }

    /// Add the read half of an accessor
    pub fn with_getter<F>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Entity) -> Result<Value> + Send + Sync + 'static,
    {
        let getter: Getter = Arc::new(getter);
        let name = name.into();
        match self.field_mut(&name) {
            Some(Field::Accessor { get, .. }) => *get = Some(getter),
            _ => self.insert_field(
                name,
                Field::Accessor {
                    get: Some(getter),
                    set: None,
                },
            ),
        }
        self
    }

    /// Add the write half of an accessor
    pub fn with_setter<F>(mut self, name: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&Entity, Value) -> Result<()> + Send + Sync + 'static,
    {
        let setter: Setter = Arc::new(setter);
        let name = name.into();
        match self.field_mut(&name) {
            Some(Field::Accessor { set, .. }) => *set = Some(setter),
            _ => self.insert_field(
                name,
                Field::Accessor {
                    get: None,
                    set: Some(setter),
                },
            ),
        }
        self
    }

    /// Set the teardown callback run by `Entity::dispose`
    pub fn on_dispose<F>(mut self, dispose: F) -> Self
    where
        F: Fn(&CompRef) -> Result<()> + Send + Sync + 'static,
    {
        self.dispose = Some(Arc::new(dispose));
        self
    }

    /// Look up a field
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    // Re-adding a name replaces the field in place
    fn insert_field(&mut self, name: String, field: Field) {
        match self.field_mut(&name) {
            Some(slot) => *slot = field,
            None => self.fields.push((name, field)),
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("fields", &self.fields)
            .field("dispose", &self.dispose.is_some())
            .finish()
    }
}

/// What the entity factory accepts: a bare tag or a full component
#[derive(Debug, Clone)]
pub enum CompSpec {
    Tag(Tag),
    Component(Component),
}

impl CompSpec {
    /// Tag of the spec
    pub fn tag(&self) -> &str {
        match self {
            CompSpec::Tag(tag) => tag,
            CompSpec::Component(component) => component.tag(),
        }
    }

    /// Expand a bare tag into a field-less component
    pub fn into_component(self) -> Component {
        match self {
            CompSpec::Tag(tag) => Component::new(tag),
            CompSpec::Component(component) => component,
        }
    }
}

impl From<&str> for CompSpec {
    fn from(tag: &str) -> Self {
        CompSpec::Tag(tag.to_owned())
    }
}

impl From<String> for CompSpec {
    fn from(tag: String) -> Self {
        CompSpec::Tag(tag)
    }
}

impl From<&String> for CompSpec {
    fn from(tag: &String) -> Self {
        CompSpec::Tag(tag.clone())
    }
}

impl From<Component> for CompSpec {
    fn from(component: Component) -> Self {
        CompSpec::Component(component)
    }
}

impl From<&Component> for CompSpec {
    fn from(component: &Component) -> Self {
        CompSpec::Component(component.clone())
    }
}

struct CompInner {
    id: Tag,
    fields: RwLock<Vec<(String, Field)>>,
    dispose: Option<DisposeFn>,
}

/// Shared handle to a component registered on an entity.
///
/// Writes through a `CompRef` are visible through the entity's merged
/// properties and vice versa.
#[derive(Clone)]
pub struct CompRef {
    inner: Arc<CompInner>,
}

impl CompRef {
    pub(crate) fn register(component: Component) -> Self {
        Self {
            inner: Arc::new(CompInner {
                id: component.id,
                fields: RwLock::new(component.fields),
                dispose: component.dispose,
            }),
        }
    }

    /// Component tag
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Snapshot of a field
    pub fn field(&self, name: &str) -> Option<Field> {
        self.inner
            .fields
            .read()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f.clone())
    }

    /// Data value of a field, if it is a data field
    pub fn value(&self, name: &str) -> Option<Value> {
        self.field(name).and_then(|f| f.as_value().cloned())
    }

    /// Store a data value, replacing whatever the field held
    pub fn set_value(&self, name: &str, value: impl Into<Value>) {
        let value = Field::Value(value.into());
        let mut fields = self.inner.fields.write();
        match fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => fields.push((name.to_owned(), value)),
        }
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> Vec<String> {
        self.inner
            .fields
            .read()
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn has_dispose(&self) -> bool {
        self.inner.dispose.is_some()
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &CompRef) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn dispose(&self) -> Result<()> {
        match &self.inner.dispose {
            Some(dispose) => dispose(self),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for CompRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompRef")
            .field("id", &self.inner.id)
            .field("fields", &*self.inner.fields.read())
            .finish()
    }
}
