//! In-memory `ByteStore`, for tests and throwaway engines

use super::ByteStore;
use crate::error::{DbError, Result};
use parking_lot::Mutex;

#[derive(Debug)]
struct Inner {
    data: Vec<u8>,
    open: bool,
}

#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An open, empty store.
    pub fn new() -> Self {
        Self::with_data(Vec::new())
    }

    /// An open store pre-filled with `data`.
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            inner: Mutex::new(Inner { data, open: true }),
        }
    }

    /// Copy of the current contents, readable even when closed.
    pub fn snapshot(&self) -> Vec<u8> {
        self.inner.lock().data.clone()
    }
}

impl ByteStore for MemoryStore {
    fn open(&self) -> Result<()> {
        self.inner.lock().open = true;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.inner.lock().open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Err(DbError::ReadFile("zero-length read".into()));
        }
        let inner = self.inner.lock();
        if !inner.open {
            return Err(DbError::ReadFile("store is not open".into()));
        }
        let start = offset as usize;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= inner.data.len())
            .ok_or_else(|| {
                DbError::ReadFile(format!("{} bytes at offset {} past end", len, offset))
            })?;
        Ok(inner.data[start..end].to_vec())
    }

    fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(DbError::WriteFile("zero-length write".into()));
        }
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(DbError::WriteFile("store is not open".into()));
        }
        let start = offset as usize;
        let end = start + data.len();
        if inner.data.len() < end {
            inner.data.resize(end, 0);
        }
        inner.data[start..end].copy_from_slice(data);
        Ok(())
    }

    fn truncate(&self, len: u64) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.open {
            return Err(DbError::WriteFile("store is not open".into()));
        }
        inner.data.resize(len as usize, 0);
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        if !self.is_open() {
            return Err(DbError::SyncFile("store is not open".into()));
        }
        Ok(())
    }

    fn size(&self) -> Result<u64> {
        let inner = self.inner.lock();
        if !inner.open {
            return Err(DbError::ReadFile("store is not open".into()));
        }
        Ok(inner.data.len() as u64)
    }
}
