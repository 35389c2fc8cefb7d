/// Whole-file persistence for the board registry
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("save data is not valid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store rejected the write")]
    Rejected,
}

/// Where the serialized registry lives. Reads and writes always cover the whole
/// document; there is no incremental update.
pub trait BoardStore {
    /// Current contents, `None` if nothing was ever saved
    fn read(&self) -> Result<Option<String>, StoreError>;

    /// Replace the contents wholesale
    fn write(&mut self, contents: &str) -> Result<(), StoreError>;
}

/// A single JSON file on disk
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
}

impl BoardStore for JsonFileStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no save file yet, starting empty");
                Ok(None)
            }
            Err(source) => Err(StoreError::Read { path: self.path.clone(), source }),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Write {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, contents).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = contents.len(), "save file written");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    contents: Option<String>,
    writes: usize,
    reject_writes: bool,
}

/// In-memory store. Clones share the same contents, so a caller can keep a handle
/// and inspect what the registry wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().contents = Some(contents.into());
        store
    }

    pub fn contents(&self) -> Option<String> {
        self.inner.borrow().contents.clone()
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.inner.borrow().writes
    }

    /// Make every following write fail, e.g. to simulate a full disk
    pub fn reject_writes(&self, reject: bool) {
        self.inner.borrow_mut().reject_writes = reject;
    }
}

impl BoardStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents())
    }

    fn write(&mut self, contents: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.reject_writes {
            return Err(StoreError::Rejected);
        }
        inner.contents = Some(contents.to_string());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("sweeperGames.json"));
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn write_creates_parent_dirs_and_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("data").join("sweeperGames.json"));
        store.write("{\"sweeperGames\":[1,2]}").unwrap();
        store.write("{}").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        handle.write("{}").unwrap();
        assert_eq!(store.writes(), 1);

        store.reject_writes(true);
        assert!(matches!(handle.write("{}"), Err(StoreError::Rejected)));
        assert_eq!(store.writes(), 1);
        assert_eq!(store.contents().as_deref(), Some("{}"));
    }
}
