//! Persistence Store
//!
//! Durable storage for the pet record. The contract is deliberately lopsided:
//!
//! - `load` fails open: a missing or malformed record yields the default pet
//! - `save` fails closed: any I/O or encoding problem is logged and reported
//!   as `false`, never raised
//! - `reset` overwrites the stored record with the default pet
//!
//! [`JsonFileStore`] writes to a sibling temp file and renames it over the
//! target, so a crash mid-write leaves the previous save intact.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::state::PetRecord;

/// Why a save did not reach disk (logged, never returned to callers)
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem failure
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being written
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// JSON encoding failure
    #[error("Failed to encode pet record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where the pet record lives between runs
pub trait PersistenceStore {
    /// Read the stored record, or the default pet if there is none
    fn load(&self) -> PetRecord;

    /// Write the record; `false` if it could not be stored
    fn save(&self, record: &PetRecord) -> bool;

    /// Overwrite the stored record with the default pet
    fn reset(&self) {
        if !self.save(&PetRecord::default()) {
            tracing::warn!("Reset could not write the default record");
        }
    }
}

// =============================================================================
// JSON File Store
// =============================================================================

/// Pretty-printed JSON file on disk
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path` (parent directories are created on save)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this store reads and writes
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_err(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn try_save(&self, record: &PetRecord) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(record)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            self.io_err(e)
        })
    }
}

impl PersistenceStore for JsonFileStore {
    fn load(&self) -> PetRecord {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No save file, starting fresh");
                return PetRecord::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Save file unreadable, using defaults");
                return PetRecord::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => {
                tracing::info!(path = %self.path.display(), "Loaded pet");
                record
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Save file malformed, using defaults");
                PetRecord::default()
            }
        }
    }

    fn save(&self, record: &PetRecord) -> bool {
        match self.try_save(record) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Saved pet");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save pet");
                false
            }
        }
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

#[derive(Debug, Default)]
struct MemoryInner {
    record: Option<PetRecord>,
    saves: usize,
    fail_saves: bool,
}

/// Volatile store for tests and throwaway sessions
///
/// Clones share the same slot, so a test can keep one handle while the
/// controller owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    /// Empty store (loads the default pet)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `record`
    #[must_use]
    pub fn with_record(record: PetRecord) -> Self {
        let store = Self::default();
        store.inner.borrow_mut().record = Some(record);
        store
    }

    /// Last record written
    pub fn record(&self) -> Option<PetRecord> {
        self.inner.borrow().record.clone()
    }

    /// Successful saves so far
    pub fn save_count(&self) -> usize {
        self.inner.borrow().saves
    }

    /// Make every following save fail
    pub fn set_fail_saves(&self, fail: bool) {
        self.inner.borrow_mut().fail_saves = fail;
    }
}

impl PersistenceStore for MemoryStore {
    fn load(&self) -> PetRecord {
        self.inner.borrow().record.clone().unwrap_or_default()
    }

    fn save(&self, record: &PetRecord) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_saves {
            tracing::error!("Memory store refusing save");
            return false;
        }
        inner.record = Some(record.clone());
        inner.saves += 1;
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
