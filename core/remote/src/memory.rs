//! In-memory remote repository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use gitvault_common::{Error, Result, VaultPath};

use crate::repository::{Account, Branch, RemoteFileState, RemoteRepository, Repository};

#[derive(Debug, Clone)]
struct StoredFile {
    content: Vec<u8>,
    marker: String,
}

/// A scripted failure for a path's writes.
#[derive(Debug, Clone)]
pub enum InjectedFailure {
    /// Every write fails permanently with this message.
    Permanent(String),
    /// Every write fails with a conflict.
    Conflict(String),
    /// Every write fails with a network error.
    Transient(String),
    /// The next `n` writes fail with a network error, then writes succeed.
    TransientTimes(u32),
}

/// In-memory forge with version-marker enforcement.
///
/// Useful for testing and development. Every write mints a fresh marker,
/// and, like the real contents API, an existing file cannot be
/// overwritten without presenting its current marker.
#[derive(Clone, Default)]
pub struct MemoryRemote {
    files: Arc<RwLock<HashMap<String, StoredFile>>>,
    commits: Arc<RwLock<Vec<(String, String)>>>,
    failures: Arc<RwLock<HashMap<String, InjectedFailure>>>,
    write_attempts: Arc<RwLock<HashMap<String, u32>>>,
    repos: Arc<RwLock<Vec<Repository>>>,
    branches: Arc<RwLock<HashMap<String, Vec<Branch>>>>,
    calls: Arc<AtomicUsize>,
    deny_auth: Arc<AtomicBool>,
}

impl MemoryRemote {
    /// Create a new empty remote.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(repo: &str, branch: &str, path: &VaultPath) -> String {
        format!("{}@{}:{}", repo, branch, path)
    }

    fn count_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Seed a file directly, bypassing marker checks. Returns its marker.
    pub fn seed_file(
        &self,
        repo: &str,
        branch: &str,
        path: &VaultPath,
        content: impl Into<Vec<u8>>,
    ) -> String {
        let marker = Uuid::new_v4().to_string();
        self.files.write().unwrap().insert(
            Self::key(repo, branch, path),
            StoredFile {
                content: content.into(),
                marker: marker.clone(),
            },
        );
        marker
    }

    /// Script a failure for a path's writes.
    pub fn fail_writes(&self, path: &VaultPath, failure: InjectedFailure) {
        self.failures
            .write()
            .unwrap()
            .insert(path.to_string(), failure);
    }

    /// Make `authenticate` fail from now on.
    pub fn set_auth_failure(&self, fail: bool) {
        self.deny_auth.store(fail, Ordering::SeqCst);
    }

    /// Register a repository for listing.
    pub fn add_repository(&self, repo: Repository) {
        self.repos.write().unwrap().push(repo);
    }

    /// Register a branch for listing.
    pub fn add_branch(&self, repo: &str, branch: Branch) {
        self.branches
            .write()
            .unwrap()
            .entry(repo.to_string())
            .or_default()
            .push(branch);
    }

    /// Commit messages recorded so far, as (path, message) pairs.
    pub fn commit_messages(&self) -> Vec<(String, String)> {
        self.commits.read().unwrap().clone()
    }

    /// Number of write attempts seen for a path, including failed ones.
    pub fn write_attempts(&self, path: &VaultPath) -> u32 {
        self.write_attempts
            .read()
            .unwrap()
            .get(&path.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Total remote calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Current content of a file, if present.
    pub fn content_of(&self, repo: &str, branch: &str, path: &VaultPath) -> Option<Vec<u8>> {
        self.files
            .read()
            .unwrap()
            .get(&Self::key(repo, branch, path))
            .map(|f| f.content.clone())
    }

    /// Current marker of a file, if present.
    pub fn marker_of(&self, repo: &str, branch: &str, path: &VaultPath) -> Option<String> {
        self.files
            .read()
            .unwrap()
            .get(&Self::key(repo, branch, path))
            .map(|f| f.marker.clone())
    }
}

#[async_trait]
impl RemoteRepository for MemoryRemote {
    fn provider(&self) -> &str {
        "memory"
    }

    async fn authenticate(&self) -> Result<Account> {
        self.count_call();
        if self.deny_auth.load(Ordering::SeqCst) {
            return Err(Error::Auth("Token rejected".to_string()));
        }
        Ok(Account {
            login: "tester".to_string(),
            name: None,
        })
    }

    async fn list_repositories(&self) -> Result<Vec<Repository>> {
        self.count_call();
        Ok(self.repos.read().unwrap().clone())
    }

    async fn list_branches(&self, repo: &str) -> Result<Vec<Branch>> {
        self.count_call();
        Ok(self
            .branches
            .read()
            .unwrap()
            .get(repo)
            .cloned()
            .unwrap_or_default())
    }

    async fn read_file(
        &self,
        repo: &str,
        branch: &str,
        path: &VaultPath,
    ) -> Result<RemoteFileState> {
        self.count_call();
        let files = self.files.read().unwrap();
        Ok(match files.get(&Self::key(repo, branch, path)) {
            Some(file) => RemoteFileState::present(file.content.clone(), file.marker.clone()),
            None => RemoteFileState::absent(),
        })
    }

    async fn write_file(
        &self,
        repo: &str,
        branch: &str,
        path: &VaultPath,
        content: &[u8],
        message: &str,
        expected_marker: Option<&str>,
    ) -> Result<String> {
        self.count_call();
        *self
            .write_attempts
            .write()
            .unwrap()
            .entry(path.to_string())
            .or_insert(0) += 1;

        {
            let mut failures = self.failures.write().unwrap();
            if let Some(plan) = failures.get_mut(&path.to_string()) {
                match plan {
                    InjectedFailure::Permanent(msg) => {
                        return Err(Error::InvalidInput(msg.clone()))
                    }
                    InjectedFailure::Conflict(msg) => return Err(Error::Conflict(msg.clone())),
                    InjectedFailure::Transient(msg) => return Err(Error::Network(msg.clone())),
                    InjectedFailure::TransientTimes(n) => {
                        if *n > 0 {
                            *n -= 1;
                            return Err(Error::Network(
                                "Injected transient failure".to_string(),
                            ));
                        }
                    }
                }
            }
        }

        let mut files = self.files.write().unwrap();
        let key = Self::key(repo, branch, path);
        match (files.get(&key), expected_marker) {
            (Some(existing), Some(expected)) if existing.marker != expected => {
                return Err(Error::Conflict(format!(
                    "Version marker mismatch for {}",
                    path
                )))
            }
            (Some(_), None) => {
                return Err(Error::Conflict(format!(
                    "Expected version marker missing for {}",
                    path
                )))
            }
            (None, Some(_)) => {
                return Err(Error::Conflict(format!(
                    "{} does not exist remotely",
                    path
                )))
            }
            _ => {}
        }

        let marker = Uuid::new_v4().to_string();
        files.insert(
            key,
            StoredFile {
                content: content.to_vec(),
                marker: marker.clone(),
            },
        );
        self.commits
            .write()
            .unwrap()
            .push((path.to_string(), message.to_string()));
        Ok(marker)
    }
}
