//! Filesystem vault store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::store::{FileEntry, VaultStore};
use gitvault_common::{Error, Result, VaultPath};

/// Vault store backed by a local directory.
///
/// Hidden files and directories are included; vaults keep their own
/// configuration in dotfile directories and those sync like everything
/// else. Symlinks are skipped.
pub struct FsVaultStore {
    root: PathBuf,
}

impl FsVaultStore {
    /// Create a store rooted at an existing vault directory.
    ///
    /// # Errors
    /// - Root does not exist or is not a directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "Vault root is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Convert a VaultPath to a filesystem path.
    fn to_fs_path(&self, path: &VaultPath) -> PathBuf {
        let mut fs_path = self.root.clone();
        for component in path.components() {
            fs_path.push(component);
        }
        fs_path
    }

    /// Convert an absolute filesystem path back to a VaultPath.
    fn to_vault_path(&self, fs_path: &Path) -> Result<VaultPath> {
        let relative = fs_path.strip_prefix(&self.root).map_err(|_| {
            Error::InvalidInput(format!(
                "Path escapes vault root: {}",
                fs_path.display()
            ))
        })?;

        let mut components = Vec::new();
        for comp in relative.components() {
            let name = comp.as_os_str().to_str().ok_or_else(|| {
                Error::InvalidInput(format!(
                    "Non-UTF-8 file name in vault: {}",
                    fs_path.display()
                ))
            })?;
            components.push(name.to_string());
        }
        VaultPath::from_components(components)
    }
}

#[async_trait]
impl VaultStore for FsVaultStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn list_files(&self) -> Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut read_dir = fs::read_dir(&dir).await?;
            while let Some(item) = read_dir.next_entry().await? {
                let file_type = item.file_type().await?;
                if file_type.is_symlink() {
                    debug!("skipping symlink {}", item.path().display());
                    continue;
                }
                if file_type.is_dir() {
                    pending.push(item.path());
                    continue;
                }

                let path = self.to_vault_path(&item.path())?;
                let metadata = item.metadata().await?;
                let modified: DateTime<Utc> = metadata
                    .modified()
                    .map(|t| t.into())
                    .unwrap_or_else(|_| Utc::now());
                entries.push(FileEntry { path, modified });
            }
        }

        // Stable enumeration order across passes.
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn read_file(&self, path: &VaultPath) -> Result<Vec<u8>> {
        let fs_path = self.to_fs_path(path);
        match fs::read(&fs_path).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("File not found: {}", path)))
            }
            Err(err) => Err(err.into()),
        }
    }
}
