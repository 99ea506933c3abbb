use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use strum::{AsRefStr, Display};

/// Platform a registered control belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    Number,
    Select,
}

/// Maps `(platform, unique_id)` to the entity id a control was registered under.
///
/// Controls are registered by a sibling component after the rooms start, so a
/// lookup returning `None` is a normal, transient condition.
#[derive(Clone, Default)]
pub struct ControlRegistry {
    entries: Arc<RwLock<HashMap<(Platform, String), String>>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a control and return its entity id (`<platform>.<unique_id>`).
    /// Registering the same unique id twice returns the existing entity id.
    pub fn register(&self, platform: Platform, unique_id: &str) -> String {
        let mut entries = self.entries.write();
        entries
            .entry((platform, unique_id.to_string()))
            .or_insert_with(|| format!("{}.{}", platform, unique_id))
            .clone()
    }

    pub fn entity_id(&self, platform: Platform, unique_id: &str) -> Option<String> {
        self.entries
            .read()
            .get(&(platform, unique_id.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
