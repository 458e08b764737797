//! Configuration storage abstractions
//!
//! Provides a path based store for small plugin configuration blobs. On the
//! device this is backed by the flash filesystem; the encoding of the blobs
//! is up to the caller.

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No entry stored under this path
    NotFound,
    /// Buffer too small for the stored data
    BufferTooSmall,
    /// Storage is full
    Full,
    /// Underlying filesystem operation failed
    Io,
}

/// Persistent configuration store
///
/// All methods take `&self`: implementations are shared between the main
/// loop and the admin interface and must synchronize internally.
pub trait ConfigStore: Sync {
    /// Read the blob stored under `path` into `buffer`
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn load(&self, path: &str, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Replace the blob stored under `path`
    fn save(&self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Remove the blob stored under `path`
    fn remove(&self, path: &str) -> Result<(), StorageError>;
}
