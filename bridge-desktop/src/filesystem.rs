//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::FileSystemAccess,
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target, so readers see either the old or the new contents. The replaced
/// file's permissions carry over, and a symlinked path updates its target.
#[derive(Debug, Default, Clone)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }

    /// Convert std::io::Error to BridgeError
    fn map_io_error(e: std::io::Error) -> BridgeError {
        BridgeError::Io(e)
    }

    fn temp_sibling(path: &Path) -> Result<PathBuf> {
        let file_name = path.file_name().ok_or_else(|| {
            BridgeError::OperationFailed(format!("Not a file path: {}", path.display()))
        })?;
        let mut temp_name = std::ffi::OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(".tmp");
        Ok(path.with_file_name(temp_name))
    }

    /// Write, match the replaced file's permissions, then flush to disk.
    async fn fill_temp(
        file: &mut fs::File,
        data: &[u8],
        permissions: Option<std::fs::Permissions>,
    ) -> std::io::Result<()> {
        file.write_all(data).await?;
        if let Some(permissions) = permissions {
            file.set_permissions(permissions).await?;
        }
        file.sync_all().await
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path).await.map_err(Self::map_io_error)
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path).await.map_err(Self::map_io_error)?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        // Write through symlinks to the file they point at.
        let target = match fs::canonicalize(path).await {
            Ok(resolved) => resolved,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => path.to_path_buf(),
            Err(e) => return Err(Self::map_io_error(e)),
        };
        let permissions = match fs::metadata(&target).await {
            Ok(metadata) => Some(metadata.permissions()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(Self::map_io_error(e)),
        };

        let temp_path = Self::temp_sibling(&target)?;
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(Self::map_io_error)?;

        if let Err(e) = Self::fill_temp(&mut file, &data, permissions).await {
            drop(file);
            let _ = fs::remove_file(&temp_path).await;
            return Err(Self::map_io_error(e));
        }
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(Self::map_io_error(e));
        }

        debug!(path = ?target, size = data.len(), "Wrote file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let test_file = dir.path().join("list.m3u");

        assert!(!fs.exists(&test_file).await.unwrap());

        let data = Bytes::from("#EXTM3U\n");
        fs.write_file(&test_file, data.clone()).await.unwrap();

        assert!(fs.exists(&test_file).await.unwrap());
        let read_data = fs.read_file(&test_file).await.unwrap();
        assert_eq!(data, read_data);
    }

    #[tokio::test]
    async fn test_write_replaces_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let test_file = dir.path().join("list.m3u");

        fs.write_file(&test_file, Bytes::from("old contents\n"))
            .await
            .unwrap();
        fs.write_file(&test_file, Bytes::from("new\n")).await.unwrap();

        assert_eq!(fs.read_file(&test_file).await.unwrap(), Bytes::from("new\n"));
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let err = fs
            .read_file(&dir.path().join("missing.m3u"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rewrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let test_file = dir.path().join("secret.m3u");
        std::fs::write(&test_file, "#EXTM3U\n").unwrap();
        std::fs::set_permissions(&test_file, std::fs::Permissions::from_mode(0o600)).unwrap();

        fs.write_file(&test_file, Bytes::from("#EXTM3U\nnew\n"))
            .await
            .unwrap();

        let mode = std::fs::metadata(&test_file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rewrite_through_symlink_updates_target() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let target = dir.path().join("movies.m3u");
        let link = dir.path().join("link.m3u");
        std::fs::write(&target, "#EXTM3U\n").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        fs.write_file(&link, Bytes::from("#EXTM3U\nnew\n"))
            .await
            .unwrap();

        assert!(std::fs::symlink_metadata(&link)
            .unwrap()
            .file_type()
            .is_symlink());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "#EXTM3U\nnew\n");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_temp_sibling_name() {
        let temp = TokioFileSystem::temp_sibling(Path::new("/music/movies.m3u")).unwrap();
        assert_eq!(temp, PathBuf::from("/music/.movies.m3u.tmp"));
    }
}
