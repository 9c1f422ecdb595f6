//! Snapshot persistence to a per-origin key-value store.
//!
//! Every failure is logged and swallowed: a missed save or an unreadable
//! snapshot only costs continuity, never the animation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::PersistConfig;
use crate::creature::Creature;
use crate::error::{PersistError, StorageError};

/// Durable string store, e.g. `window.localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Serialised form of the simulation. Changing this shape invalidates stored data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub creatures: Vec<Creature>,
    pub wave_seed: f64,
    /// Wall-clock milliseconds since the Unix epoch.
    pub timestamp: f64,
}

pub struct Persistence<S> {
    store: S,
    config: PersistConfig,
    last_save_ms: Option<f64>,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S, config: PersistConfig) -> Self {
        Self {
            store,
            config,
            last_save_ms: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write `creatures` and `wave_seed` stamped with `now_ms`. Returns whether
    /// the write succeeded.
    pub fn save(&mut self, creatures: &[Creature], wave_seed: f64, now_ms: f64) -> bool {
        match self.try_save(creatures, wave_seed, now_ms) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to save animation state: {err}");
                false
            }
        }
    }

    fn try_save(&mut self, creatures: &[Creature], wave_seed: f64, now_ms: f64) -> Result<(), PersistError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SnapshotRef<'a> {
            creatures: &'a [Creature],
            wave_seed: f64,
            timestamp: f64,
        }

        let json = serde_json::to_string(&SnapshotRef {
            creatures,
            wave_seed,
            timestamp: now_ms,
        })?;
        self.store.set(&self.config.storage_key, &json)?;
        Ok(())
    }

    /// Save when at least `save_interval_ms` of frame-clock time has passed
    /// since the previous periodic save.
    pub fn save_if_due(
        &mut self,
        frame_ms: f64,
        creatures: &[Creature],
        wave_seed: f64,
        now_ms: f64,
    ) -> bool {
        if let Some(last) = self.last_save_ms {
            if frame_ms - last <= self.config.save_interval_ms {
                return false;
            }
        }
        self.last_save_ms = Some(frame_ms);
        self.save(creatures, wave_seed, now_ms)
    }

    /// Forget the periodic-save baseline, e.g. after the frame clock restarts.
    pub fn reset_schedule(&mut self) {
        self.last_save_ms = None;
    }

    /// Read the stored snapshot. Stale or unreadable entries are removed.
    pub fn load(&mut self, now_ms: f64) -> Option<Snapshot> {
        let raw = match self.store.get(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("failed to load animation state: {err}");
                return None;
            }
        };

        let snapshot: Snapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("discarding unreadable animation state: {err}");
                self.clear();
                return None;
            }
        };

        let age = now_ms - snapshot.timestamp;
        if !age.is_finite() || age > self.config.staleness_ms {
            log::debug!("discarding stale animation state ({age:.0}ms old)");
            self.clear();
            return None;
        }
        Some(snapshot)
    }

    pub fn clear(&mut self) {
        if let Err(err) = self.store.remove(&self.config.storage_key) {
            log::warn!("failed to clear animation state: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeaConfig;
    use crate::creature::Bounds;
    use pretty_assertions::assert_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct FullStore;

    impl KeyValueStore for FullStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("private mode".into()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::QuotaExceeded)
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("locked".into()))
        }
    }

    fn population(n: usize) -> Vec<Creature> {
        let config = SeaConfig::default();
        let mut rng = SmallRng::seed_from_u64(21);
        let bounds = Bounds {
            width: 800.0,
            height: 600.0,
        };
        (0..n).map(|_| Creature::spawn(&mut rng, &config, bounds)).collect()
    }

    #[test]
    fn round_trip_preserves_creatures() {
        let creatures = population(5);
        let mut persistence = Persistence::new(MemoryStore::new(), PersistConfig::default());
        assert!(persistence.save(&creatures, 42.5, 1_000.0));

        let snapshot = persistence.load(1_000.0).unwrap();
        assert_eq!(snapshot.creatures, creatures);
        assert_eq!(snapshot.wave_seed, 42.5);
        assert_eq!(snapshot.timestamp, 1_000.0);
    }

    #[test]
    fn stale_snapshot_is_discarded_and_cleared() {
        let store = MemoryStore::new();
        let config = PersistConfig::default();
        let mut persistence = Persistence::new(store.clone(), config.clone());
        persistence.save(&population(2), 1.0, 0.0);

        assert!(persistence.load(config.staleness_ms + 1.0).is_none());
        assert!(store.raw(&config.storage_key).is_none());
    }

    #[test]
    fn snapshot_at_staleness_edge_still_loads() {
        let config = PersistConfig::default();
        let mut persistence = Persistence::new(MemoryStore::new(), config.clone());
        persistence.save(&population(1), 1.0, 0.0);
        assert!(persistence.load(config.staleness_ms).is_some());
    }

    #[test]
    fn corrupt_json_is_cleared() {
        let mut store = MemoryStore::new();
        let config = PersistConfig::default();
        store.set(&config.storage_key, "{\"creatures\": [").unwrap();
        let mut persistence = Persistence::new(store.clone(), config.clone());

        assert!(persistence.load(0.0).is_none());
        assert!(store.raw(&config.storage_key).is_none());
    }

    #[test]
    fn storage_failures_are_not_fatal() {
        let mut persistence = Persistence::new(FullStore, PersistConfig::default());
        assert!(!persistence.save(&population(1), 0.0, 0.0));
        assert!(persistence.load(0.0).is_none());
        persistence.clear();
    }

    #[test]
    fn periodic_saves_are_throttled() {
        let creatures = population(1);
        let mut persistence = Persistence::new(MemoryStore::new(), PersistConfig::default());
        assert!(persistence.save_if_due(0.0, &creatures, 0.0, 0.0));
        assert!(!persistence.save_if_due(500.0, &creatures, 0.0, 500.0));
        assert!(!persistence.save_if_due(1_000.0, &creatures, 0.0, 1_000.0));
        assert!(persistence.save_if_due(1_001.0, &creatures, 0.0, 1_001.0));
    }

    #[test]
    fn stored_json_uses_camel_case_fields() {
        let store = MemoryStore::new();
        let config = PersistConfig::default();
        let mut persistence = Persistence::new(store.clone(), config.clone());
        persistence.save(&population(1), 3.0, 9.0);

        let raw = store.raw(&config.storage_key).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["waveSeed"], 3.0);
        assert_eq!(value["timestamp"], 9.0);
        assert!(value["creatures"][0].get("targetDepth").is_some());
        assert!(value["creatures"][0].get("atSurface").is_some());
    }
}
