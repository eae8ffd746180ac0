//! In-memory vault store for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::store::{FileEntry, VaultStore};
use gitvault_common::{Error, Result, VaultPath};

/// In-memory vault store.
///
/// Useful for testing and development. Enumeration order is the path
/// order, matching the filesystem store's sorted listing.
#[derive(Clone, Default)]
pub struct MemoryVaultStore {
    files: Arc<RwLock<BTreeMap<VaultPath, (Vec<u8>, DateTime<Utc>)>>>,
}

impl MemoryVaultStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file.
    pub fn insert(&self, path: &str, content: impl Into<Vec<u8>>) -> Result<()> {
        let path = VaultPath::parse(path)?;
        self.files
            .write()
            .unwrap()
            .insert(path, (content.into(), Utc::now()));
        Ok(())
    }

    /// Remove a file.
    pub fn remove(&self, path: &VaultPath) {
        self.files.write().unwrap().remove(path);
    }

    /// Number of files in the store.
    pub fn len(&self) -> usize {
        self.files.read().unwrap().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.files.read().unwrap().is_empty()
    }
}

#[async_trait]
impl VaultStore for MemoryVaultStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_files(&self) -> Result<Vec<FileEntry>> {
        let files = self.files.read().unwrap();
        Ok(files
            .iter()
            .map(|(path, (_, modified))| FileEntry {
                path: path.clone(),
                modified: *modified,
            })
            .collect())
    }

    async fn read_file(&self, path: &VaultPath) -> Result<Vec<u8>> {
        let files = self.files.read().unwrap();
        files
            .get(path)
            .map(|(content, _)| content.clone())
            .ok_or_else(|| Error::NotFound(format!("File not found: {}", path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_read() {
        let store = MemoryVaultStore::new();
        store.insert("a.md", "hello").unwrap();

        let path = VaultPath::parse("a.md").unwrap();
        assert_eq!(store.read_file(&path).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_list_is_ordered() {
        let store = MemoryVaultStore::new();
        store.insert("z.md", "z").unwrap();
        store.insert("a.md", "a").unwrap();
        store.insert("notes/m.md", "m").unwrap();

        let entries = store.list_files().await.unwrap();
        let paths: Vec<String> = entries.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["a.md", "notes/m.md", "z.md"]);
    }

    #[tokio::test]
    async fn test_read_missing() {
        let store = MemoryVaultStore::new();
        let path = VaultPath::parse("missing.md").unwrap();
        assert!(matches!(
            store.read_file(&path).await,
            Err(Error::NotFound(_))
        ));
    }
}
