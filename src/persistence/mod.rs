//! Best score persistence
//!
//! The simulation only needs `get`/`set`. Storage failures are logged and
//! swallowed here so they never reach gameplay code.

use serde::{Deserialize, Serialize};

/// Contract for wherever the best score lives
pub trait BestScoreStore {
    /// Last stored best score (0 if nothing stored)
    fn get(&self) -> u64;
    /// Record a new best score
    fn set(&mut self, best: u64);
}

/// In-memory store (tests, headless runs)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryBestStore {
    best: u64,
}

impl MemoryBestStore {
    pub fn new(best: u64) -> Self {
        Self { best }
    }
}

impl BestScoreStore for MemoryBestStore {
    fn get(&self) -> u64 {
        self.best
    }

    fn set(&mut self, best: u64) {
        self.best = best;
    }
}

impl<S: BestScoreStore + ?Sized> BestScoreStore for &mut S {
    fn get(&self) -> u64 {
        (**self).get()
    }

    fn set(&mut self, best: u64) {
        (**self).set(best);
    }
}

/// On-disk record
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct BestRecord {
    best: u64,
}

/// JSON file store: `{ "best": n }`, written through a temp file and renamed
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFileBestStore {
    path: std::path::PathBuf,
    cached: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFileBestStore {
    /// Open (or lazily create) a store at `path`
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        let cached = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<BestRecord>(&json) {
                Ok(record) => {
                    log::info!("Loaded best score {} from {}", record.best, path.display());
                    record.best
                }
                Err(e) => {
                    log::warn!("Ignoring corrupt best score file {}: {}", path.display(), e);
                    0
                }
            },
            Err(_) => {
                log::info!("No best score at {}, starting fresh", path.display());
                0
            }
        };
        Self { path, cached }
    }

    fn write(&self) -> std::io::Result<()> {
        let data = serde_json::to_vec(&BestRecord { best: self.cached })?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl BestScoreStore for JsonFileBestStore {
    fn get(&self) -> u64 {
        self.cached
    }

    fn set(&mut self, best: u64) {
        self.cached = best;
        if let Err(e) = self.write() {
            log::warn!("Failed to save best score to {}: {}", self.path.display(), e);
        }
    }
}

/// Browser LocalStorage store
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageBestStore {
    cached: u64,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageBestStore {
    const STORAGE_KEY: &'static str = "catchfall_best";

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }

    pub fn load() -> Self {
        let cached = Self::storage()
            .and_then(|s| s.get_item(Self::STORAGE_KEY).ok().flatten())
            .and_then(|json| serde_json::from_str::<BestRecord>(&json).ok())
            .map(|r| r.best)
            .unwrap_or(0);
        log::info!("Best score loaded: {}", cached);
        Self { cached }
    }
}

#[cfg(target_arch = "wasm32")]
impl BestScoreStore for LocalStorageBestStore {
    fn get(&self) -> u64 {
        self.cached
    }

    fn set(&mut self, best: u64) {
        self.cached = best;
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable, best score not saved");
            return;
        };
        match serde_json::to_string(&BestRecord { best }) {
            Ok(json) => {
                if let Err(e) = storage.set_item(Self::STORAGE_KEY, &json) {
                    log::warn!("Failed to save best score: {:?}", e);
                }
            }
            Err(e) => log::warn!("Failed to serialize best score: {}", e),
        }
    }
}
