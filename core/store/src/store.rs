//! Local vault store trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gitvault_common::{Result, VaultPath};

/// A file visible in the local vault, as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the vault root.
    pub path: VaultPath,
    /// Last local modification time.
    pub modified: DateTime<Utc>,
}

/// Local store capability: enumerate and read vault files.
///
/// Implementations must report stable relative paths across passes and
/// return content as the exact byte sequence on disk: the sync engine
/// compares bytes, so any normalization here would defeat change
/// detection.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Get the store name (e.g. "fs", "memory").
    fn name(&self) -> &str;

    /// Enumerate all files in the vault.
    ///
    /// # Postconditions
    /// - Paths are relative to the vault root, in a stable order
    ///
    /// # Errors
    /// - Vault root missing or unreadable
    async fn list_files(&self) -> Result<Vec<FileEntry>>;

    /// Read a file's full content.
    ///
    /// # Errors
    /// - File not found
    /// - I/O errors
    async fn read_file(&self, path: &VaultPath) -> Result<Vec<u8>>;
}
