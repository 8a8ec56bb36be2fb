//! Progression stores
//!
//! Saves are fire-and-forget checkpoints: callers log a failed write and keep
//! playing on the in-memory state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::state::ProgressionState;

/// Failure reading or writing a store
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("save file i/o: {0}")]
    Io(#[from] io::Error),
    #[error("save file format: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistError {
    /// True when the store simply has nothing saved yet
    pub fn is_missing(&self) -> bool {
        matches!(self, PersistError::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}

/// Durable home for `ProgressionState`
pub trait ProgressionStore {
    fn load(&self) -> Result<ProgressionState, PersistError>;
    fn save(&mut self, state: &ProgressionState) -> Result<(), PersistError>;
}

/// Load progression, substituting defaults when the store is missing or unreadable
pub fn load_or_default<S: ProgressionStore + ?Sized>(store: &S) -> ProgressionState {
    match store.load() {
        Ok(state) => {
            log::info!(
                "Loaded progression ({} shards, {} prestige pts, best {})",
                state.core_shards,
                state.prestige_points,
                state.best_score
            );
            state.sanitized()
        }
        Err(e) if e.is_missing() => {
            log::info!("No saved progression found, starting fresh");
            ProgressionState::default()
        }
        Err(e) => {
            log::warn!("Could not read progression ({e}), using defaults");
            ProgressionState::default()
        }
    }
}

/// Pretty-printed JSON on the local filesystem
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl ProgressionStore for JsonFileStore {
    fn load(&self) -> Result<ProgressionState, PersistError> {
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&mut self, state: &ProgressionState) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(state)?;
        // Write beside the real file first so a crash never leaves half a save
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Progression saved to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store for tests and embedding without a filesystem
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Last successfully saved JSON
    pub json: Option<String>,
    /// Number of successful saves
    pub saves: usize,
    /// Simulate a failing disk
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing progression already "on disk"
    pub fn with_state(state: &ProgressionState) -> Self {
        Self {
            json: serde_json::to_string(state).ok(),
            ..Self::default()
        }
    }

    /// Decode the last save
    pub fn saved(&self) -> Option<ProgressionState> {
        self.json.as_deref().and_then(|j| serde_json::from_str(j).ok())
    }
}

impl ProgressionStore for MemoryStore {
    fn load(&self) -> Result<ProgressionState, PersistError> {
        match &self.json {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Err(io::Error::from(io::ErrorKind::NotFound).into()),
        }
    }

    fn save(&mut self, state: &ProgressionState) -> Result<(), PersistError> {
        if self.fail_writes {
            return Err(io::Error::other("simulated write failure").into());
        }
        self.json = Some(serde_json::to_string(state)?);
        self.saves += 1;
        Ok(())
    }
}
