//! # Reading Progress
//!
//! Where the reader left off, kept in a small key-value store so the book
//! reopens on the same page.
//!
//! Progress is a resume hint, not a record. Every failure here is logged
//! and swallowed; callers always get a usable value back.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Saved position in a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedProgress {
    pub page_index: usize,
    pub saved_at_epoch_millis: i64,
}

impl PersistedProgress {
    /// Progress at `page_index`, stamped with the current time.
    pub fn now(page_index: usize) -> Self {
        Self {
            page_index,
            saved_at_epoch_millis: Utc::now().timestamp_millis(),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "progress store I/O error: {e}"),
            StoreError::Json(e) => write!(f, "progress store data error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ============================================================================
// Stores
// ============================================================================

/// String key-value storage that survives restarts but promises nothing more.
pub trait ProgressStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Volatile store, used for `--no-persist` and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// JSON object on disk mapping keys to values.
///
/// All writes use atomic rename (write `.tmp`, then `rename()`).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let json = fs::read_to_string(&self.path).map_err(StoreError::Io)?;
        serde_json::from_str(&json).map_err(StoreError::Json)
    }
}

impl ProgressStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking every later save
        let mut entries = self.read_all().unwrap_or_else(|e| {
            warn!("Discarding unreadable progress file {}: {}", self.path.display(), e);
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value);
        atomic_write_json(&self.path, &entries)
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(StoreError::Io)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data).map_err(StoreError::Json)?;
    fs::write(&tmp_path, json).map_err(StoreError::Io)?;
    fs::rename(&tmp_path, path).map_err(StoreError::Io)?;
    Ok(())
}

/// Returns `~/.folio/progress.json`.
pub fn default_progress_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".folio").join("progress.json"))
}

// ============================================================================
// Load / Save
// ============================================================================

/// Read progress for a book with `page_count` pages.
///
/// Missing, unreadable, corrupt, or out-of-range records all yield
/// `{ page_index: 0, saved_at: now }`.
pub fn load_progress(store: &dyn ProgressStore, key: &str, page_count: usize) -> PersistedProgress {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No saved progress under '{}'", key);
            return PersistedProgress::now(0);
        }
        Err(e) => {
            warn!("Error loading progress: {}", e);
            return PersistedProgress::now(0);
        }
    };

    match serde_json::from_str::<PersistedProgress>(&raw) {
        Ok(progress) if progress.page_index < page_count => {
            debug!("Restored progress: page {}", progress.page_index);
            progress
        }
        Ok(progress) => {
            warn!(
                "Saved page {} is out of range for {} pages, starting over",
                progress.page_index, page_count
            );
            PersistedProgress::now(0)
        }
        Err(e) => {
            warn!("Error loading progress: {}", e);
            PersistedProgress::now(0)
        }
    }
}

/// Write progress. Returns the record on success, `None` (logged) on failure.
pub fn save_progress(
    store: &mut dyn ProgressStore,
    key: &str,
    page_index: usize,
) -> Option<PersistedProgress> {
    let progress = PersistedProgress::now(page_index);
    let json = match serde_json::to_string(&progress) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to encode progress: {}", e);
            return None;
        }
    };
    match store.set(key, json) {
        Ok(()) => {
            debug!("Progress saved: page {}", page_index);
            Some(progress)
        }
        Err(e) => {
            warn!("Failed to save progress: {}", e);
            None
        }
    }
}
