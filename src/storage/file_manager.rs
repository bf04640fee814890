//! Binary File Manager
//!
//! File-backed `ByteStore`. A single handle is kept open for the store's
//! lifetime; each call takes the handle lock for exactly one operation.
//!
//! ## Behavior
//! - `open` creates the file (and its parent directory) if missing
//! - `close` and `Drop` both flush to disk
//! - Reads past the end of the file fail instead of returning short data

use super::ByteStore;
use crate::error::{DbError, Result};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct BinaryFileManager {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl BinaryFileManager {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: Mutex::new(None),
        }
    }

    /// Create and open in one step.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let manager = Self::new(path);
        manager.open()?;
        Ok(manager)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn closed_error(&self) -> String {
        format!("{} is not open", self.path.display())
    }
}

impl ByteStore for BinaryFileManager {
    fn open(&self) -> Result<()> {
        let mut guard = self.file.lock();
        if guard.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    DbError::StorageOpen(format!("{}: {}", parent.display(), e))
                })?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| DbError::StorageOpen(format!("{}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), "opened data file");
        *guard = Some(file);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut guard = self.file.lock();
        if let Some(mut file) = guard.take() {
            file.flush()
                .and_then(|_| file.sync_all())
                .map_err(|e| DbError::SyncFile(e.to_string()))?;
            debug!(path = %self.path.display(), "closed data file");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.file.lock().is_some()
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Err(DbError::ReadFile("zero-length read".into()));
        }
        let mut guard = self.file.lock();
        let file = guard
            .as_mut()
            .ok_or_else(|| DbError::ReadFile(self.closed_error()))?;

        let mut buf = vec![0u8; len];
        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.read_exact(&mut buf))
            .map_err(|e| DbError::ReadFile(format!("{} bytes at offset {}: {}", len, offset, e)))?;
        debug!(offset, len, "read_at");
        Ok(buf)
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(DbError::WriteFile("zero-length write".into()));
        }
        let mut guard = self.file.lock();
        let file = guard
            .as_mut()
            .ok_or_else(|| DbError::WriteFile(self.closed_error()))?;

        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.write_all(data))
            .map_err(|e| {
                DbError::WriteFile(format!("{} bytes at offset {}: {}", data.len(), offset, e))
            })?;
        debug!(offset, len = data.len(), "write_at");
        Ok(())
    }

    fn truncate(&self, len: u64) -> Result<()> {
        let guard = self.file.lock();
        let file = guard
            .as_ref()
            .ok_or_else(|| DbError::WriteFile(self.closed_error()))?;
        file.set_len(len)
            .map_err(|e| DbError::WriteFile(format!("truncate to {}: {}", len, e)))
    }

    fn sync(&self) -> Result<()> {
        let guard = self.file.lock();
        let file = guard
            .as_ref()
            .ok_or_else(|| DbError::SyncFile(self.closed_error()))?;
        file.sync_all().map_err(|e| DbError::SyncFile(e.to_string()))
    }

    fn size(&self) -> Result<u64> {
        let guard = self.file.lock();
        let file = guard
            .as_ref()
            .ok_or_else(|| DbError::ReadFile(self.closed_error()))?;
        Ok(file.metadata()?.len())
    }
}

impl Drop for BinaryFileManager {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "failed to flush data file on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_write_then_read() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = BinaryFileManager::open_path(temp_file.path()).unwrap();

        store.write_at(0, b"hello world").unwrap();
        store.sync().unwrap();

        assert_eq!(store.size().unwrap(), 11);
        assert_eq!(store.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn test_zero_length_buffers_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = BinaryFileManager::open_path(temp_file.path()).unwrap();

        assert!(matches!(store.read_at(0, 0), Err(DbError::ReadFile(_))));
        assert!(matches!(store.write_at(0, &[]), Err(DbError::WriteFile(_))));
    }

    #[test]
    fn test_read_past_end_fails() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = BinaryFileManager::open_path(temp_file.path()).unwrap();
        store.write_at(0, b"abc").unwrap();

        assert!(matches!(store.read_at(1, 10), Err(DbError::ReadFile(_))));
    }

    #[test]
    fn test_closed_store_rejects_calls() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = BinaryFileManager::open_path(temp_file.path()).unwrap();
        store.close().unwrap();
        store.close().unwrap();

        assert!(!store.is_open());
        assert!(store.write_at(0, b"x").is_err());
        assert!(store.size().is_err());
        assert!(store.sync().is_err());
    }

    #[test]
    fn test_truncate_drops_tail() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = BinaryFileManager::open_path(temp_file.path()).unwrap();
        store.write_at(0, b"0123456789").unwrap();
        store.truncate(4).unwrap();

        assert_eq!(store.size().unwrap(), 4);
        assert_eq!(store.read_at(0, 4).unwrap(), b"0123");
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("data.bin");
        let store = BinaryFileManager::open_path(&path).unwrap();

        assert!(path.exists());
        assert_eq!(store.size().unwrap(), 0);
    }
}
