//! Utility functions

use std::sync::atomic::{AtomicU64, Ordering};

static ENTITY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Next process-wide entity id. Strictly increasing, never reused.
pub fn next_entity_id() -> u64 {
    ENTITY_COUNTER.fetch_add(1, Ordering::Relaxed)
}
