//! World configuration

use serde::{Deserialize, Serialize};

use crate::archetype::MAX_TAGS;
use crate::error::{EcsError, Result};

/// Settings applied when a world is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum distinct tags for the world's own registry (1..=128)
    pub max_tags: usize,

    /// Initial capacity of each new bucket
    pub bucket_capacity: usize,

    /// Attach a `LoggingSubscriber` to the world's event bus
    pub log_events: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_tags: MAX_TAGS,
            bucket_capacity: 16,
            log_events: false,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a JSON config. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tags == 0 || self.max_tags > MAX_TAGS {
            return Err(EcsError::InvalidConfig(format!(
                "max_tags must be in 1..={MAX_TAGS}, got {}",
                self.max_tags
            )));
        }
        Ok(())
    }
}
