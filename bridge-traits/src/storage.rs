//! Storage and File System Abstractions
//!
//! The pipeline reads a playlist in one go and writes it back in one go, so
//! the trait only covers whole-file operations.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::error::Result;

/// File system access trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn rewrite(fs: &dyn FileSystemAccess, path: &Path, data: Bytes) -> Result<()> {
///     if fs.exists(path).await? {
///         fs.write_file(path, data).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read entire file contents into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Replace the file contents.
    ///
    /// Implementations must not leave a partially written file behind: either
    /// the previous contents or the new contents are observable afterwards.
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;
}
