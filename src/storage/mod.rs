//! Storage layer
//!
//! A `ByteStore` is a file-like byte container addressed by offset. The table
//! registry keeps its whole image in one store.

pub mod file_manager;
pub mod memory;

pub use file_manager::BinaryFileManager;
pub use memory::MemoryStore;

use crate::error::Result;

/// Offset-addressed byte storage.
///
/// Every method operates on an open store; calls on a closed store fail.
/// Zero-length reads and writes are errors.
pub trait ByteStore: Send {
    fn open(&self) -> Result<()>;

    /// Flush and release the underlying handle. Closing twice is a no-op.
    fn close(&self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Read exactly `len` bytes starting at `offset`.
    fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>>;

    fn write_at(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Shrink or extend to `len` bytes.
    fn truncate(&self, len: u64) -> Result<()>;

    fn sync(&self) -> Result<()>;

    fn size(&self) -> Result<u64>;
}
