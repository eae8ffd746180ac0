//! Remote repository client trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use gitvault_common::{Result, VaultPath};

/// The account a token authenticates as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Login name on the forge.
    pub login: String,
    /// Display name, if set.
    pub name: Option<String>,
}

/// A repository visible to the authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Forge-side full name ("owner/name").
    pub full_name: String,
    /// Default branch, if reported.
    pub default_branch: Option<String>,
    /// Whether the repository is private.
    pub private: bool,
}

/// A branch of a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name.
    pub name: String,
    /// Whether the branch is protected.
    pub protected: bool,
}

/// Remote state of a single file at read time.
///
/// Absence is tagged, never a sentinel empty string: an empty remote file
/// has `content: Some(vec![])` while a missing one has `content: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileState {
    /// File content, or `None` if the file does not exist remotely.
    pub content: Option<Vec<u8>>,
    /// Opaque revision token for the content, used to detect concurrent
    /// modification on write.
    pub version_marker: Option<String>,
}

impl RemoteFileState {
    /// State for a file that does not exist remotely.
    pub fn absent() -> Self {
        Self {
            content: None,
            version_marker: None,
        }
    }

    /// State for an existing remote file.
    pub fn present(content: Vec<u8>, version_marker: impl Into<String>) -> Self {
        Self {
            content: Some(content),
            version_marker: Some(version_marker.into()),
        }
    }

    /// Whether the file exists remotely.
    pub fn exists(&self) -> bool {
        self.content.is_some()
    }
}

/// Remote repository capability consumed by the sync engine.
///
/// Content crosses this boundary as an opaque byte sequence; any transport
/// encoding (e.g. base64) is an implementation detail and must round-trip
/// losslessly for text and binary alike.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Get the provider id (e.g. "github").
    fn provider(&self) -> &str;

    /// Verify the credentials and return the account they belong to.
    ///
    /// # Errors
    /// - `Auth` if the token is rejected
    /// - Network errors
    async fn authenticate(&self) -> Result<Account>;

    /// List repositories visible to the authenticated account.
    async fn list_repositories(&self) -> Result<Vec<Repository>>;

    /// List branches of a repository.
    async fn list_branches(&self, repo: &str) -> Result<Vec<Branch>>;

    /// Read a file's remote state on a branch.
    ///
    /// # Postconditions
    /// - A missing file yields `RemoteFileState::absent()`, not an error
    async fn read_file(
        &self,
        repo: &str,
        branch: &str,
        path: &VaultPath,
    ) -> Result<RemoteFileState>;

    /// Commit a file to a branch, returning the new version marker.
    ///
    /// # Preconditions
    /// - `expected_marker` is the marker from a read immediately preceding
    ///   this call, or `None` for a file that did not exist then
    ///
    /// # Errors
    /// - `Conflict` if the remote no longer matches `expected_marker`
    /// - `Auth`, rate-limit and network errors
    async fn write_file(
        &self,
        repo: &str,
        branch: &str,
        path: &VaultPath,
        content: &[u8],
        message: &str,
        expected_marker: Option<&str>,
    ) -> Result<String>;
}
