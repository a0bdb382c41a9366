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

//! Error types

use std::fmt;

/// ECS error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A component field name is already claimed on the entity
    DuplicateComponentProperty(String),

    /// Tag vocabulary exceeds the archetype bit width
    TagCapacityExhausted { attempted: usize, capacity: usize },

    /// Component record has no string `id`
    MissingTag,

    /// No merged property with this name
    PropertyNotFound(String),

    /// Property exists but is not a method
    PropertyNotCallable(String),

    /// Property is a method, not a readable value
    PropertyNotValue(String),

    /// Property cannot be written
    PropertyReadOnly(String),

    /// User callback (method, accessor, dispose, subscriber) failed
    CallbackError(String),

    /// Invalid world configuration
    InvalidConfig(String),

    /// Serialization error
    SerializationError(String),
}

impl EcsError {
    /// Convenience constructor for callback failures
    pub fn callback(msg: impl Into<String>) -> Self {
        EcsError::CallbackError(msg.into())
    }
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::DuplicateComponentProperty(name) => {
                write!(f, "Duplicate component property: \"{name}\"")
            }
            EcsError::TagCapacityExhausted {
                attempted,
                capacity,
            } => write!(
                f,
                "Tag capacity exhausted: attempted to register tag #{attempted}, max is {capacity}"
            ),
            EcsError::MissingTag => write!(f, "Component record has no string \"id\" tag"),
            EcsError::PropertyNotFound(name) => write!(f, "Property not found: \"{name}\""),
            EcsError::PropertyNotCallable(name) => {
                write!(f, "Property is not callable: \"{name}\"")
            }
            EcsError::PropertyNotValue(name) => {
                write!(f, "Property is a method, not a value: \"{name}\"")
            }
            EcsError::PropertyReadOnly(name) => write!(f, "Property is read-only: \"{name}\""),
            EcsError::CallbackError(msg) => write!(f, "Callback error: {msg}"),
            EcsError::InvalidConfig(msg) => write!(f, "Invalid config: {msg}"),
            EcsError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<serde_json::Error> for EcsError {
    fn from(err: serde_json::Error) -> Self {
        EcsError::SerializationError(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
