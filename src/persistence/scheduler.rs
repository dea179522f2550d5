//! Write scheduling: throttled ship saves, debounced planet edits
//!
//! Driven from the frame loop with the frame timestamp, so no timers outlive
//! the loop. `flush` writes everything pending (teardown); `cancel` drops it.

use std::collections::BTreeMap;

use super::{KvStore, SaveSlots};
use crate::sim::{PlanetPatch, ShipSnapshot, WorldState};

/// Minimum spacing between ship saves
pub const SHIP_SAVE_INTERVAL_MS: f64 = 1000.0;
/// Quiet period after the last planet edit before it is written
pub const PLANET_WRITE_DEBOUNCE_MS: f64 = 250.0;

#[derive(Debug, Clone)]
pub struct SaveScheduler {
    ship_interval_ms: f64,
    planet_quiet_ms: f64,
    last_ship_save_ms: Option<f64>,
    last_saved: Option<ShipSnapshot>,
    pending_planets: BTreeMap<u32, PlanetPatch>,
    planet_deadline_ms: Option<f64>,
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::new(SHIP_SAVE_INTERVAL_MS, PLANET_WRITE_DEBOUNCE_MS)
    }
}

impl SaveScheduler {
    pub fn new(ship_interval_ms: f64, planet_quiet_ms: f64) -> Self {
        Self {
            ship_interval_ms,
            planet_quiet_ms,
            last_ship_save_ms: None,
            last_saved: None,
            pending_planets: BTreeMap::new(),
            planet_deadline_ms: None,
        }
    }

    /// Queue a planet edit; bursts coalesce into one write per planet
    pub fn planet_edited(&mut self, id: u32, patch: &PlanetPatch, now_ms: f64) {
        self.pending_planets.entry(id).or_default().merge(patch);
        self.planet_deadline_ms = Some(now_ms + self.planet_quiet_ms);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_planets.is_empty()
    }

    /// Perform any writes that are due at `now_ms`
    pub fn poll<S: KvStore>(&mut self, now_ms: f64, state: &WorldState, slots: &mut SaveSlots<S>) {
        let ship_due = self
            .last_ship_save_ms
            .is_none_or(|last| now_ms - last >= self.ship_interval_ms);
        // Landing owns the ship pose; save once it has committed
        if ship_due && !state.is_landing() {
            let snapshot = state.snapshot();
            if self.last_saved != Some(snapshot) {
                self.write_ship(&snapshot, slots, false);
            }
            self.last_ship_save_ms = Some(now_ms);
        }

        if self.planet_deadline_ms.is_some_and(|deadline| now_ms >= deadline) {
            self.write_planets(state, slots);
        }
    }

    /// Write everything now, ignoring throttle and debounce
    pub fn flush<S: KvStore>(&mut self, state: &WorldState, slots: &mut SaveSlots<S>) {
        let snapshot = state.snapshot();
        self.write_ship(&snapshot, slots, true);
        self.write_planets(state, slots);
    }

    /// Drop pending writes without performing them
    pub fn cancel(&mut self) {
        self.pending_planets.clear();
        self.planet_deadline_ms = None;
    }

    fn write_ship<S: KvStore>(&mut self, snapshot: &ShipSnapshot, slots: &mut SaveSlots<S>, force: bool) {
        let result = if force {
            slots.force_save_ship_state(snapshot)
        } else {
            slots.save_ship_state(snapshot)
        };
        match result {
            Ok(()) => self.last_saved = Some(*snapshot),
            Err(err) => log::warn!("Ship save failed: {}", err),
        }
    }

    fn write_planets<S: KvStore>(&mut self, state: &WorldState, slots: &mut SaveSlots<S>) {
        self.planet_deadline_ms = None;
        for (id, patch) in std::mem::take(&mut self.pending_planets) {
            let Some(planet) = state.planets.get(id) else {
                continue;
            };
            match slots.update_world_position(planet, &patch) {
                Ok(true) => log::debug!("Planet {} layout saved", id),
                Ok(false) => {}
                Err(err) => log::warn!("Planet {} layout save failed: {}", id, err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, PersistenceError};
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn setup() -> (WorldState, SaveSlots<MemoryStore>, SaveScheduler) {
        (
            WorldState::new(5, 0, Tuning::default()),
            SaveSlots::new(MemoryStore::default()),
            SaveScheduler::default(),
        )
    }

    #[test]
    fn test_ship_saves_are_throttled() {
        let (mut state, mut slots, mut scheduler) = setup();
        for frame in 0..120 {
            state.ship.pos.x += 1.0;
            scheduler.poll(frame as f64 * 16.0, &state, &mut slots);
        }
        // 0..1904 ms: writes at 0, 1008
        assert_eq!(slots.store().writes, 2);
    }

    #[test]
    fn test_unchanged_ship_is_not_rewritten() {
        let (state, mut slots, mut scheduler) = setup();
        scheduler.poll(0.0, &state, &mut slots);
        scheduler.poll(5000.0, &state, &mut slots);
        assert_eq!(slots.store().writes, 1);
    }

    #[test]
    fn test_planet_edits_coalesce_after_quiet_period() {
        let (mut state, mut slots, mut scheduler) = setup();
        scheduler.poll(0.0, &state, &mut slots);
        let before = slots.store().writes;

        for step in 0..10 {
            let now = step as f64 * 50.0;
            let pos = Vec2::new(100.0 + step as f32, 200.0);
            state.planets.move_to(2, pos, 10000.0);
            let patch = PlanetPatch { x: Some(pos.x), y: Some(pos.y), ..Default::default() };
            scheduler.planet_edited(2, &patch, now);
            scheduler.poll(now, &state, &mut slots);
        }
        assert_eq!(slots.store().writes, before);
        assert!(scheduler.has_pending());

        scheduler.poll(450.0 + 250.0, &state, &mut slots);
        assert_eq!(slots.store().writes, before + 1);
        let layout = slots.load_world_positions().unwrap();
        assert_eq!(layout[0].pos, Vec2::new(109.0, 200.0));
    }

    #[test]
    fn test_flush_writes_pending_immediately() {
        let (mut state, mut slots, mut scheduler) = setup();
        state.planets.rotate(4, 1.5, 10000.0);
        scheduler.planet_edited(4, &PlanetPatch { rotation: Some(1.5), ..Default::default() }, 0.0);
        scheduler.flush(&state, &mut slots);
        assert!(!scheduler.has_pending());
        assert_eq!(slots.load_world_positions().unwrap()[0].rotation, 1.5);
        assert_eq!(slots.load_ship_state().unwrap(), Some(state.snapshot()));
    }

    #[test]
    fn test_saving_continues_after_flush() {
        let (mut state, mut slots, mut scheduler) = setup();
        scheduler.poll(0.0, &state, &mut slots);
        scheduler.flush(&state, &mut slots);

        // Page came back from the back/forward cache and play went on
        state.ship.pos.x += 250.0;
        scheduler.poll(2000.0, &state, &mut slots);
        assert_eq!(slots.load_ship_state().unwrap(), Some(state.snapshot()));

        state.planets.rotate(2, 0.75, 10000.0);
        scheduler.planet_edited(2, &PlanetPatch { rotation: Some(0.75), ..Default::default() }, 2000.0);
        scheduler.poll(10_000.0, &state, &mut slots);
        assert!(!scheduler.has_pending());
        assert_eq!(slots.load_world_positions().unwrap()[0].rotation, 0.75);
    }

    #[test]
    fn test_cancel_prevents_late_writes() {
        let (state, mut slots, mut scheduler) = setup();
        scheduler.planet_edited(1, &PlanetPatch { radius: Some(10.0), ..Default::default() }, 0.0);
        scheduler.cancel();
        scheduler.poll(10_000.0, &state, &mut slots);
        assert!(slots.load_world_positions().unwrap().is_empty());
    }

    /// Store whose writes always fail
    struct Broken;

    impl KvStore for Broken {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Ok(None)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Storage("quota exceeded".into()))
        }
        fn remove(&mut self, _key: &str) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    #[test]
    fn test_failures_are_swallowed() {
        let state = WorldState::new(5, 0, Tuning::default());
        let mut slots = SaveSlots::new(Broken);
        let mut scheduler = SaveScheduler::default();
        scheduler.planet_edited(1, &PlanetPatch { radius: Some(10.0), ..Default::default() }, 0.0);
        scheduler.poll(0.0, &state, &mut slots);
        scheduler.flush(&state, &mut slots);
        assert!(!scheduler.has_pending());
    }
}
