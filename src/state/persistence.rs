//! Scene persistence on an opaque key-value store
//!
//! The panel only needs `get`/`put`/`remove` of one JSON value, so storage is
//! abstracted behind [`KeyValueStore`]. The binary uses an embedded sled
//! database; tests use [`MemoryStore`].
//!
//! # Debouncing
//!
//! Writes are debounced trailing-edge: every mutation re-arms a
//! [`Debounce`] deadline and the scene is written once the panel has been
//! quiet for the whole window. A steady stream of mutations closer together
//! than the window postpones the write until the stream stops.

use super::scene::Scene;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Key the scene is stored under
pub const DEFAULT_SCENE_KEY: &str = "flow8_scene_static_v14";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("failed to encode scene: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Opaque byte-valued key-value store
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// sled-backed store
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        info!("Scene store opened at: {}", path.display());
        Ok(Self { db })
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.db.insert(key, value)?;
        self.db.flush()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.db.remove(key)?;
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// while the panel owns another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    writes: Arc<Mutex<u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls
    pub fn write_count(&self) -> u64 {
        *self.writes.lock()
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &[u8]) {
        self.entries.lock().insert(key.to_string(), value.to_vec());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.raw(key))
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.insert_raw(key, value);
        *self.writes.lock() += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Serialize and write a scene under `key`
pub fn write_scene(
    store: &mut dyn KeyValueStore,
    key: &str,
    scene: &Scene,
) -> Result<(), StoreError> {
    let json = serde_json::to_vec(scene)?;
    store.put(key, &json)?;
    trace!("Scene written ({} bytes)", json.len());
    Ok(())
}

/// Read the scene under `key`. Missing, unreadable and malformed scenes all
/// come back as `None`.
pub fn read_scene(store: &dyn KeyValueStore, key: &str) -> Option<Scene> {
    match store.get(key) {
        Ok(Some(data)) => match serde_json::from_slice::<Scene>(&data) {
            Ok(scene) => {
                debug!("Loaded scene with {} channel entries", scene.channels.len());
                Some(scene)
            }
            Err(e) => {
                warn!("Ignoring malformed scene: {}", e);
                None
            }
        },
        Ok(None) => {
            debug!("No scene stored under '{}'", key);
            None
        }
        Err(e) => {
            warn!("Failed to read scene: {}", e);
            None
        }
    }
}

/// Cancellable trailing-edge deadline
#[derive(Debug, Clone)]
pub struct Debounce {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// (Re-)arm: the deadline moves to `now + quiet`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::PanelState;
    use tempfile::tempdir;

    #[test]
    fn test_debounce_fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(300));
        assert!(!debounce.poll(t0));

        debounce.arm(t0);
        assert!(!debounce.poll(t0 + Duration::from_millis(299)));
        assert!(debounce.poll(t0 + Duration::from_millis(300)));
        assert!(!debounce.poll(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn test_debounce_rearm_postpones() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(300));
        debounce.arm(t0);
        debounce.arm(t0 + Duration::from_millis(200));
        assert!(!debounce.poll(t0 + Duration::from_millis(400)));
        assert!(debounce.poll(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_debounce_cancel() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(10));
        debounce.arm(t0);
        debounce.cancel();
        assert!(!debounce.is_armed());
        assert!(!debounce.poll(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_sled_store_round_trip() {
        let temp = tempdir().unwrap();
        let mut store = SledStore::open(temp.path().join("scenes")).unwrap();

        let scene = Scene::from_state(&PanelState::new());
        write_scene(&mut store, DEFAULT_SCENE_KEY, &scene).unwrap();
        assert_eq!(read_scene(&store, DEFAULT_SCENE_KEY), Some(scene));

        store.remove(DEFAULT_SCENE_KEY).unwrap();
        assert_eq!(read_scene(&store, DEFAULT_SCENE_KEY), None);
    }

    #[test]
    fn test_malformed_scene_reads_as_absent() {
        let store = MemoryStore::new();
        store.insert_raw(DEFAULT_SCENE_KEY, b"{not json");
        assert_eq!(read_scene(&store, DEFAULT_SCENE_KEY), None);

        store.insert_raw(DEFAULT_SCENE_KEY, b"5");
        assert_eq!(read_scene(&store, DEFAULT_SCENE_KEY), None);
    }

    #[test]
    fn test_mistyped_section_keeps_rest_of_scene() {
        let store = MemoryStore::new();
        store.insert_raw(
            DEFAULT_SCENE_KEY,
            br#"{"master": 5, "channels": [{"channel": 1, "level": 10}]}"#,
        );
        let scene = read_scene(&store, DEFAULT_SCENE_KEY).unwrap();
        assert_eq!(scene.master, None);
        assert_eq!(scene.channels[0].level, Some(10));

        store.insert_raw(DEFAULT_SCENE_KEY, b"{\"channels\": 5}");
        let scene = read_scene(&store, DEFAULT_SCENE_KEY).unwrap();
        assert!(scene.channels.is_empty());
    }

    #[test]
    fn test_memory_store_shares_state_between_clones() {
        let handle = MemoryStore::new();
        let mut owned = handle.clone();
        owned.put("k", b"v").unwrap();
        assert_eq!(handle.raw("k"), Some(b"v".to_vec()));
        assert_eq!(handle.write_count(), 1);
    }
}
