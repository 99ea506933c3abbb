//! In-memory entity state store
//!
//! Holds the current state of every entity the estimator reads (sensors,
//! weather, sun, override controls) and the outputs it publishes. Writers
//! notify subscribers through a broadcast channel; readers take a synchronous
//! snapshot so an update never awaits.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

pub const STATE_UNKNOWN: &str = "unknown";
pub const STATE_UNAVAILABLE: &str = "unavailable";

pub type Attributes = Map<String, Value>;

/// Parse a numeric state string, treating placeholders and garbage as absent
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw == STATE_UNKNOWN || raw == STATE_UNAVAILABLE {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Current state of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Attributes,
    pub last_changed: DateTime<Utc>,
}

impl EntityState {
    pub fn new(entity_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes: Attributes::new(),
            last_changed: Utc::now(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// False for the "unknown" and "unavailable" placeholders
    pub fn is_available(&self) -> bool {
        self.state != STATE_UNKNOWN && self.state != STATE_UNAVAILABLE
    }

    pub fn numeric_state(&self) -> Option<f64> {
        parse_numeric(&self.state)
    }

    /// Attribute as a number; JSON numbers and numeric strings are accepted
    pub fn numeric_attribute(&self, key: &str) -> Option<f64> {
        match self.attributes.get(key)? {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => parse_numeric(s),
            _ => None,
        }
    }

    pub fn str_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

/// Notification that an entity was written or removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChanged {
    pub entity_id: String,
}

/// Read access to current entity states
pub trait StateReader {
    fn state(&self, entity_id: &str) -> Option<EntityState>;
}

impl StateReader for HashMap<String, EntityState> {
    fn state(&self, entity_id: &str) -> Option<EntityState> {
        self.get(entity_id).cloned()
    }
}

struct StoreInner {
    states: RwLock<HashMap<String, EntityState>>,
    events: broadcast::Sender<StateChanged>,
}

/// Shared handle to the state store
#[derive(Clone)]
pub struct StateStore {
    inner: Arc<StoreInner>,
}

impl StateStore {
    pub fn new(event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            inner: Arc::new(StoreInner {
                states: RwLock::new(HashMap::new()),
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChanged> {
        self.inner.events.subscribe()
    }

    pub fn get(&self, entity_id: &str) -> Option<EntityState> {
        self.inner.states.read().get(entity_id).cloned()
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.inner.states.read().contains_key(entity_id)
    }

    /// All states, sorted by entity id
    pub fn all(&self) -> Vec<EntityState> {
        let mut states: Vec<EntityState> = self.inner.states.read().values().cloned().collect();
        states.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        states
    }

    /// Write a state. Returns false (and emits nothing) when neither the state
    /// string nor the attributes changed.
    pub fn set(
        &self,
        entity_id: impl Into<String>,
        state: impl Into<String>,
        attributes: Attributes,
    ) -> bool {
        let entity_id = entity_id.into();
        let state = state.into();
        {
            let mut states = self.inner.states.write();
            if let Some(existing) = states.get(&entity_id) {
                if existing.state == state && existing.attributes == attributes {
                    return false;
                }
            }
            states.insert(
                entity_id.clone(),
                EntityState {
                    entity_id: entity_id.clone(),
                    state,
                    attributes,
                    last_changed: Utc::now(),
                },
            );
        }
        self.notify(entity_id);
        true
    }

    /// Write a state only if the entity does not exist yet
    pub fn set_if_absent(
        &self,
        entity_id: impl Into<String>,
        state: impl Into<String>,
        attributes: Attributes,
    ) -> bool {
        let entity_id = entity_id.into();
        {
            let mut states = self.inner.states.write();
            if states.contains_key(&entity_id) {
                return false;
            }
            states.insert(
                entity_id.clone(),
                EntityState {
                    entity_id: entity_id.clone(),
                    state: state.into(),
                    attributes,
                    last_changed: Utc::now(),
                },
            );
        }
        self.notify(entity_id);
        true
    }

    pub fn remove(&self, entity_id: &str) -> Option<EntityState> {
        let removed = self.inner.states.write().remove(entity_id);
        if removed.is_some() {
            self.notify(entity_id.to_string());
        }
        removed
    }

    fn notify(&self, entity_id: String) {
        // No receivers is fine: nothing is watching yet.
        if self.inner.events.send(StateChanged { entity_id }).is_err() {
            debug!("state change dropped, no subscribers");
        }
    }
}

impl StateReader for StateStore {
    fn state(&self, entity_id: &str) -> Option<EntityState> {
        self.get(entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_numeric() {
        assert_eq!(parse_numeric("21.5"), Some(21.5));
        assert_eq!(parse_numeric(" 3 "), Some(3.0));
        assert_eq!(parse_numeric("unknown"), None);
        assert_eq!(parse_numeric("unavailable"), None);
        assert_eq!(parse_numeric("warm"), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn test_numeric_attribute_accepts_strings_and_numbers() {
        let state = EntityState::new("weather.home", "sunny")
            .with_attribute("temperature", 5.0)
            .with_attribute("uv_index", "2.5")
            .with_attribute("cloud_coverage", "lots")
            .with_attribute("wind_speed", json!(null));
        assert_eq!(state.numeric_attribute("temperature"), Some(5.0));
        assert_eq!(state.numeric_attribute("uv_index"), Some(2.5));
        assert_eq!(state.numeric_attribute("cloud_coverage"), None);
        assert_eq!(state.numeric_attribute("wind_speed"), None);
        assert_eq!(state.numeric_attribute("missing"), None);
    }

    #[tokio::test]
    async fn test_set_emits_only_on_change() {
        let store = StateStore::new(16);
        let mut rx = store.subscribe();

        assert!(store.set("sensor.air", "21.0", Attributes::new()));
        assert!(!store.set("sensor.air", "21.0", Attributes::new()));
        assert!(store.set("sensor.air", "21.5", Attributes::new()));

        assert_eq!(rx.recv().await.unwrap().entity_id, "sensor.air");
        assert_eq!(rx.recv().await.unwrap().entity_id, "sensor.air");
        assert!(rx.try_recv().is_err());
        assert_eq!(store.get("sensor.air").unwrap().numeric_state(), Some(21.5));
    }

    #[test]
    fn test_set_if_absent_keeps_existing() {
        let store = StateStore::new(4);
        assert!(store.set_if_absent("number.x", "0.5", Attributes::new()));
        assert!(!store.set_if_absent("number.x", "0.9", Attributes::new()));
        assert_eq!(store.get("number.x").unwrap().state, "0.5");
    }

    #[test]
    fn test_remove() {
        let store = StateStore::new(4);
        store.set("sensor.air", "20", Attributes::new());
        assert!(store.remove("sensor.air").is_some());
        assert!(store.remove("sensor.air").is_none());
        assert!(!store.contains("sensor.air"));
    }
}
