//! JSON save slots for ship state and planet layout

use super::{KvStore, PersistenceError};
use crate::sim::{Planet, PlanetPatch, ShipSnapshot};

/// Storage keys
const SHIP_KEY: &str = "space_map_ship";
const PLANETS_KEY: &str = "space_map_planets";

/// Ship and planet persistence on top of a key-value store
pub struct SaveSlots<S: KvStore> {
    store: S,
}

impl<S: KvStore> SaveSlots<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Saved ship state, or `None` for a fresh start
    pub fn load_ship_state(&self) -> Result<Option<ShipSnapshot>, PersistenceError> {
        match self.store.get(SHIP_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn save_ship_state(&mut self, snapshot: &ShipSnapshot) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(snapshot)?;
        self.store.set(SHIP_KEY, &json)
    }

    /// Teardown save; same write, but always attempted regardless of throttling
    pub fn force_save_ship_state(&mut self, snapshot: &ShipSnapshot) -> Result<(), PersistenceError> {
        self.save_ship_state(snapshot)?;
        log::info!("Ship state saved on teardown");
        Ok(())
    }

    /// Saved planet layout (empty if nothing was ever edited)
    pub fn load_world_positions(&self) -> Result<Vec<Planet>, PersistenceError> {
        match self.store.get(PLANETS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    /// Persist an edit for one planet.
    ///
    /// `current` is the planet as it stands in memory after the optimistic
    /// update. Returns `false` if the patch carried nothing to write.
    pub fn update_world_position(
        &mut self,
        current: &Planet,
        patch: &PlanetPatch,
    ) -> Result<bool, PersistenceError> {
        if patch.is_empty() {
            return Ok(false);
        }
        let mut layout = self.load_world_positions().unwrap_or_else(|err| {
            log::warn!("Discarding unreadable planet layout: {}", err);
            Vec::new()
        });
        match layout.iter_mut().find(|p| p.id == current.id) {
            Some(saved) => *saved = current.clone(),
            None => layout.push(current.clone()),
        }
        layout.sort_by_key(|p| p.id);
        let json = serde_json::to_string(&layout)?;
        self.store.set(PLANETS_KEY, &json)?;
        Ok(true)
    }
}
