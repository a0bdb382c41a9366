//! Query terms and tag tests
//!
//! A world query names tags either directly or through a named component
//! constructor ([`CompFn`]), whose name is used as the tag.

use std::fmt;
use std::sync::Arc;

use crate::component::{CompSpec, Component};
use crate::entity::Entity;
use crate::registry::{Tag, WILDCARD_TAG};

/// Anything that names a tag in a query
pub trait IntoTag {
    fn into_tag(self) -> Tag;
}

impl IntoTag for &str {
    fn into_tag(self) -> Tag {
        self.to_owned()
    }
}

impl IntoTag for String {
    fn into_tag(self) -> Tag {
        self
    }
}

impl IntoTag for &String {
    fn into_tag(self) -> Tag {
        self.clone()
    }
}

impl IntoTag for &Component {
    fn into_tag(self) -> Tag {
        self.tag().to_owned()
    }
}

impl IntoTag for &CompFn {
    fn into_tag(self) -> Tag {
        self.name.clone()
    }
}

impl IntoTag for CompFn {
    fn into_tag(self) -> Tag {
        self.name
    }
}

/// Named component constructor.
///
/// Queries use the constructor's name as the tag; building it yields a
/// fresh component for the entity factory.
#[derive(Clone)]
pub struct CompFn {
    name: Tag,
    build: Arc<dyn Fn() -> Component + Send + Sync>,
}

impl CompFn {
    pub fn new<F>(name: impl Into<Tag>, build: F) -> Self
    where
        F: Fn() -> Component + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            build: Arc::new(build),
        }
    }

    /// Constructor name, used as the query tag
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a fresh component
    pub fn build(&self) -> Component {
        (self.build)()
    }
}

impl From<&CompFn> for CompSpec {
    fn from(ctor: &CompFn) -> Self {
        CompSpec::Component(ctor.build())
    }
}

impl fmt::Debug for CompFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompFn").field("name", &self.name).finish()
    }
}

/// Tag test used by `Entity::is`.
///
/// A single tag matches if present, and [`WILDCARD_TAG`] always matches.
/// A list matches if every tag in it is present.
pub trait TagQuery {
    fn matched_by(&self, entity: &Entity) -> bool;
}

impl TagQuery for str {
    fn matched_by(&self, entity: &Entity) -> bool {
        self == WILDCARD_TAG || entity.has_comp(self)
    }
}

impl TagQuery for String {
    fn matched_by(&self, entity: &Entity) -> bool {
        self.as_str().matched_by(entity)
    }
}

impl<S: AsRef<str>> TagQuery for [S] {
    fn matched_by(&self, entity: &Entity) -> bool {
        self.iter().all(|tag| entity.has_comp(tag.as_ref()))
    }
}

impl<S: AsRef<str>, const N: usize> TagQuery for [S; N] {
    fn matched_by(&self, entity: &Entity) -> bool {
        self.as_slice().matched_by(entity)
    }
}

impl<S: AsRef<str>> TagQuery for Vec<S> {
    fn matched_by(&self, entity: &Entity) -> bool {
        self.as_slice().matched_by(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comp_fn_name_is_tag() {
        let position = CompFn::new("position", || Component::new("position").with_value("x", 0));
        assert_eq!((&position).into_tag(), "position");
        assert_eq!(position.build().tag(), "position");

        let spec = CompSpec::from(&position);
        assert_eq!(spec.tag(), "position");
    }

    #[test]
    fn test_into_tag_variants() {
        let owned = String::from("b");
        assert_eq!("a".into_tag(), "a");
        assert_eq!((&owned).into_tag(), "b");
        assert_eq!((&Component::new("c")).into_tag(), "c");
    }
}
