//! Reactive per-room driver
//!
//! Each configured room gets one task that owns its estimator and filter
//! memory and reacts to state changes in arrival order.

use std::collections::BTreeSet;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::RoomConfig;
use crate::estimator::{
    EstimatorState, MrtEstimator, OperativeAggregator, OperativeReading, UpdateOutcome,
};
use crate::host::{ControlRegistry, StateChanged, StateStore};

pub struct RoomRuntime {
    estimator: MrtEstimator,
    state: EstimatorState,
    operative: OperativeAggregator,
    interest: BTreeSet<String>,
    store: StateStore,
    registry: ControlRegistry,
}

impl RoomRuntime {
    pub fn new(room: RoomConfig, store: StateStore, registry: ControlRegistry) -> Self {
        let mut interest = BTreeSet::new();
        interest.insert(room.air_temp_source.clone());
        interest.insert(room.weather_entity.clone());
        interest.insert(room.sun_entity.clone());
        if let Some(sensor) = &room.solar_sensor {
            interest.insert(sensor.clone());
        }

        Self {
            operative: OperativeAggregator::for_room(&room),
            estimator: MrtEstimator::new(room),
            state: EstimatorState::new(),
            interest,
            store,
            registry,
        }
    }

    pub fn room(&self) -> &RoomConfig {
        self.estimator.room()
    }

    /// Entities whose changes trigger an MRT update
    pub fn interest(&self) -> &BTreeSet<String> {
        &self.interest
    }

    pub fn estimator_state(&self) -> EstimatorState {
        self.state
    }

    /// React to one changed entity. Until the override controls are located
    /// every change is a chance to find them.
    pub fn handle_change(&mut self, entity_id: &str) {
        if self.interest.contains(entity_id) || !self.estimator.handles().is_ready() {
            self.recompute();
        } else if self.operative.watches(entity_id) {
            self.update_operative();
        }
    }

    /// Run an MRT update and publish whatever it produced
    pub fn recompute(&mut self) -> UpdateOutcome {
        let outcome = self
            .estimator
            .update(&self.registry, &self.store, &mut self.state);
        self.refresh_interest();

        if let UpdateOutcome::Published(reading) = &outcome {
            self.store.set(
                self.room().mrt_entity_id(),
                reading.value.to_string(),
                reading.diagnostics.to_attributes(),
            );
        }
        // Air temperature feeds both outputs, so refresh the aggregate even
        // when the MRT stayed where it was.
        self.update_operative();
        outcome
    }

    fn update_operative(&self) -> Option<OperativeReading> {
        match self.operative.aggregate(&self.store) {
            Some(reading) => {
                self.store.set(
                    self.room().operative_entity_id(),
                    reading.value.to_string(),
                    reading.diagnostics.clone(),
                );
                Some(reading)
            }
            None => {
                debug!(room = %self.room().id, "operative temperature suspended");
                None
            }
        }
    }

    fn refresh_interest(&mut self) {
        let before = self.interest.len();
        self.interest.extend(
            self.estimator
                .handles()
                .entity_ids()
                .map(str::to_string),
        );
        if self.interest.len() != before {
            debug!(
                room = %self.room().id,
                watched = self.interest.len(),
                "override controls located, interest set extended"
            );
        }
    }

    /// Initial computation, then one update per relevant change until the
    /// event channel closes.
    pub async fn run(mut self, mut events: broadcast::Receiver<StateChanged>) {
        info!(room = %self.room().id, "room task started");
        self.recompute();

        loop {
            match events.recv().await {
                Ok(StateChanged { entity_id }) => self.handle_change(&entity_id),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(room = %self.room().id, skipped, "state events lagged, recomputing");
                    self.recompute();
                }
                Err(RecvError::Closed) => break,
            }
        }

        info!(room = %self.room().id, "room task stopped");
    }
}

/// Spawn one task per room. Each task subscribes before it is spawned, so no
/// change made after this returns is missed.
pub fn spawn_rooms(
    store: &StateStore,
    registry: &ControlRegistry,
    rooms: &[RoomConfig],
) -> Vec<JoinHandle<()>> {
    rooms
        .iter()
        .map(|room| {
            let events = store.subscribe();
            let runtime = RoomRuntime::new(room.clone(), store.clone(), registry.clone());
            tokio::spawn(runtime.run(events))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{register_room_controls, select_profile};
    use crate::domain::{Orientation, RoomProfile};
    use crate::host::{Attributes, EntityState};

    fn room() -> RoomConfig {
        RoomConfig::new(
            "office",
            RoomProfile::TwoWallSmallWindow,
            Orientation::West,
            "sensor.office_air",
            "weather.home",
        )
    }

    fn seed(store: &StateStore) {
        store.set("sensor.office_air", "20.0", Attributes::new());
        let weather = EntityState::new("weather.home", "sunny")
            .with_attribute("temperature", 8.0)
            .with_attribute("cloud_coverage", 10.0)
            .with_attribute("uv_index", 3.0);
        store.set("weather.home", "sunny", weather.attributes);
    }

    #[test]
    fn test_initial_interest_set() {
        let r = room().with_solar_sensor("sensor.pyranometer");
        let rt = RoomRuntime::new(r, StateStore::new(8), ControlRegistry::new());
        let expected: Vec<&str> = vec![
            "sensor.office_air",
            "sensor.pyranometer",
            "sun.sun",
            "weather.home",
        ];
        assert_eq!(rt.interest().iter().map(String::as_str).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_interest_extended_once_controls_exist() {
        let store = StateStore::new(8);
        let registry = ControlRegistry::new();
        seed(&store);
        let mut rt = RoomRuntime::new(room(), store.clone(), registry.clone());

        assert_eq!(rt.recompute(), UpdateOutcome::Deferred);
        assert_eq!(rt.interest().len(), 3);
        assert!(!store.contains("sensor.office_mrt"));

        register_room_controls(&store, &registry, rt.room());
        assert!(rt.recompute().reading().is_some());
        assert_eq!(rt.interest().len(), 3 + 6);
        assert!(rt.interest().contains("number.office_k_solar"));
        assert!(rt.interest().contains("select.office_profile"));
    }

    #[test]
    fn test_publishes_both_outputs() {
        let store = StateStore::new(8);
        let registry = ControlRegistry::new();
        seed(&store);
        let mut rt = RoomRuntime::new(room(), store.clone(), registry.clone());
        register_room_controls(&store, &registry, rt.room());

        let reading = rt.recompute().reading().cloned().unwrap();
        let mrt = store.get("sensor.office_mrt").unwrap();
        assert_eq!(mrt.numeric_state(), Some(reading.value));
        assert_eq!(mrt.str_attribute("radiation_source"), Some("heuristic"));
        assert_eq!(mrt.attributes, reading.diagnostics.to_attributes());

        let op = store.get("sensor.office_operative_temperature").unwrap();
        let expected = crate::estimator::operative_temperature(20.0, reading.value);
        assert_eq!(op.numeric_state(), Some(expected));
        assert_eq!(op.attributes, mrt.attributes);
    }

    #[test]
    fn test_suspended_update_keeps_outputs() {
        let store = StateStore::new(8);
        let registry = ControlRegistry::new();
        seed(&store);
        let mut rt = RoomRuntime::new(room(), store.clone(), registry.clone());
        register_room_controls(&store, &registry, rt.room());
        rt.recompute();
        let before = store.get("sensor.office_mrt").unwrap();

        store.set("sensor.office_air", "unavailable", Attributes::new());
        rt.handle_change("sensor.office_air");

        let after = store.get("sensor.office_mrt").unwrap();
        assert_eq!(after.state, before.state);
        assert_eq!(after.last_changed, before.last_changed);
        assert!(store.contains("sensor.office_operative_temperature"));
    }

    #[test]
    fn test_unrelated_change_is_ignored() {
        let store = StateStore::new(8);
        let registry = ControlRegistry::new();
        seed(&store);
        let mut rt = RoomRuntime::new(room(), store.clone(), registry.clone());
        register_room_controls(&store, &registry, rt.room());
        rt.recompute();
        let prior = rt.estimator_state();

        store.set("light.kitchen", "on", Attributes::new());
        rt.handle_change("light.kitchen");
        assert_eq!(rt.estimator_state(), prior);
    }

    #[test]
    fn test_profile_selection_is_several_samples() {
        let store = StateStore::new(32);
        let registry = ControlRegistry::new();
        seed(&store);
        let room = room();
        let mut rt = RoomRuntime::new(room.clone(), store.clone(), registry.clone());
        register_room_controls(&store, &registry, &room);
        rt.recompute();
        let before = rt.estimator_state();

        let mut events = store.subscribe();
        select_profile(&store, &registry, &room, "attic").unwrap();

        // Outputs written while replaying land on the same channel
        let mut samples = 0;
        while let Ok(StateChanged { entity_id }) = events.try_recv() {
            if rt.interest().contains(&entity_id) {
                samples += 1;
            }
            rt.handle_change(&entity_id);
        }

        // Four changed coefficients plus the select itself
        assert_eq!(samples, 5);
        assert_ne!(rt.estimator_state(), before);
        let mrt = store.get("sensor.office_mrt").unwrap();
        assert_eq!(mrt.str_attribute("profile"), Some("attic"));
        assert_eq!(mrt.numeric_attribute("factor_k_solar"), Some(1.5));
    }
}
