use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use meshgrad_core::{MeshState, StoreConfig};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed stored state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable session file: the persisted subset of [`MeshState`] as JSON.
/// History and UI state never reach disk.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, state: &MeshState) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut stored = state.clone();
        stored.selected_shape_id = None;
        fs::write(&self.path, stored.to_json()?)?;
        log::debug!("saved state to {}", self.path.display());
        Ok(())
    }

    /// `Ok(None)` when nothing has been saved yet. A stored state with no
    /// shapes gets a fresh set generated from its own seed, canvas and palette.
    pub fn load(&self, config: &StoreConfig) -> Result<Option<MeshState>, StorageError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut state = MeshState::from_json(&json)?;
        state.normalize();
        if state.ensure_shapes(config.default_shape_count, &config.generator) {
            log::info!("stored state had no shapes, regenerated from seed {:?}", state.seed);
        }
        Ok(Some(state))
    }

    /// Stored state, or the initial state when the file is missing or unreadable.
    pub fn load_or_default(&self, config: &StoreConfig) -> MeshState {
        match self.load(config) {
            Ok(Some(state)) => state,
            Ok(None) => MeshState::initial(&config.generator),
            Err(e) => {
                log::warn!("ignoring stored state at {}: {e}", self.path.display());
                MeshState::initial(&config.generator)
            }
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
