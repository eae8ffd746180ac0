//! Core sync engine that orchestrates one pass over the vault.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use gitvault_common::{Error, Result, VaultPath};
use gitvault_remote::RemoteRepository;
use gitvault_store::{FileEntry, VaultStore};

use crate::change::{has_changed, FileSnapshot};
use crate::config::SyncSettings;
use crate::outcome::{FailureKind, PassReport, SkipReason, SyncOutcome};
use crate::retry::{RetryConfig, RetryExecutor};
use crate::session::SyncSession;

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Retry policy for a single file's write.
    pub retry: RetryConfig,
    /// Bounded per-file worker count within a pass. Kept small to respect
    /// forge rate limits.
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            workers: 4,
        }
    }
}

/// Main sync engine for pushing vault files to a forge repository.
pub struct SyncEngine<R: RemoteRepository + ?Sized, S: VaultStore + ?Sized> {
    /// Forge client for remote reads and commits.
    remote: Arc<R>,
    /// Local vault store.
    store: Arc<S>,
    /// Single-active-pass guard.
    session: SyncSession,
    /// Retry executor for transient write failures.
    retry: RetryExecutor,
    /// Configuration.
    config: EngineConfig,
}

impl<R: RemoteRepository, S: VaultStore> SyncEngine<R, S> {
    /// Create a new sync engine.
    pub fn new(remote: R, store: S, config: EngineConfig) -> Self {
        Self::from_arc(Arc::new(remote), Arc::new(store), config)
    }
}

impl<R: RemoteRepository + ?Sized, S: VaultStore + ?Sized> SyncEngine<R, S> {
    /// Create a new sync engine from Arc-wrapped capabilities.
    pub fn from_arc(remote: Arc<R>, store: Arc<S>, config: EngineConfig) -> Self {
        let retry = RetryExecutor::new(config.retry.clone());
        Self {
            remote,
            store,
            session: SyncSession::new(),
            retry,
            config,
        }
    }

    /// The pass gate shared by schedulers and manual triggers.
    pub fn session(&self) -> &SyncSession {
        &self.session
    }

    /// Run one sync pass over all vault files.
    ///
    /// Returns `Error::Busy`, without touching the remote, if a pass is
    /// already in progress. Authentication and store enumeration failures
    /// fail the whole pass; everything past that point is per-file, and a
    /// file's failure never aborts the rest.
    pub async fn run_pass(&self, settings: &SyncSettings) -> Result<PassReport> {
        let _guard = self
            .session
            .try_begin()
            .ok_or_else(|| Error::Busy("A sync pass is already in progress".to_string()))?;
        let start = Instant::now();

        settings.validate()?;
        let account = self.remote.authenticate().await?;
        info!(
            "starting sync pass to {}@{} as {}",
            settings.repository, settings.branch, account.login
        );

        let files = self.store.list_files().await?;
        if files.is_empty() {
            info!("vault is empty, nothing to sync");
            return Ok(PassReport {
                outcomes: Vec::new(),
                duration: start.elapsed(),
            });
        }

        // buffered() keeps outcomes in enumeration order while up to
        // `workers` files are in flight.
        let outcomes: Vec<SyncOutcome> = stream::iter(files)
            .map(|entry| self.sync_file(settings, entry))
            .buffered(self.config.workers)
            .collect()
            .await;

        let report = PassReport {
            outcomes,
            duration: start.elapsed(),
        };
        info!(
            "sync pass finished in {:?}: {}",
            report.duration,
            report.summary()
        );
        Ok(report)
    }

    /// Scheduler tick entry point: run a pass and log the result.
    ///
    /// A tick that finds a pass already in progress is dropped, not
    /// queued; a later pass picks up whatever this one would have done.
    pub async fn run_scheduled(&self, settings: &SyncSettings) {
        match self.run_pass(settings).await {
            Ok(report) => {
                if report.failed() > 0 {
                    warn!("scheduled sync pass completed with failures: {}", report.summary());
                }
            }
            Err(Error::Busy(_)) => warn!("sync pass skipped: busy"),
            Err(err) => error!("scheduled sync pass failed: {}", err),
        }
    }

    /// Handle one file, containing any failure into its outcome.
    async fn sync_file(&self, settings: &SyncSettings, entry: FileEntry) -> SyncOutcome {
        let path = entry.path.clone();
        match self.try_sync_file(settings, entry).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("failed to sync {}: {}", path, err);
                SyncOutcome::Failed {
                    path,
                    kind: FailureKind::from(&err),
                    message: err.to_string(),
                }
            }
        }
    }

    async fn try_sync_file(
        &self,
        settings: &SyncSettings,
        entry: FileEntry,
    ) -> Result<SyncOutcome> {
        let content = self.store.read_file(&entry.path).await?;
        let local = FileSnapshot {
            path: entry.path,
            content,
            modified: entry.modified,
        };

        // Fresh read so the comparison reflects the remote at commit time.
        let remote = self
            .remote
            .read_file(&settings.repository, &settings.branch, &local.path)
            .await?;

        if !has_changed(&remote, &local) {
            debug!("{} unchanged, skipping", local.path);
            return Ok(SyncOutcome::Skipped {
                path: local.path,
                reason: SkipReason::Unchanged,
            });
        }

        let message = commit_message(&settings.device_label, &local.path);
        debug!("committing {} ({} bytes)", local.path, local.content.len());

        let version_marker = self
            .retry
            .execute(|| {
                self.remote.write_file(
                    &settings.repository,
                    &settings.branch,
                    &local.path,
                    &local.content,
                    &message,
                    remote.version_marker.as_deref(),
                )
            })
            .await?;

        Ok(SyncOutcome::Committed {
            path: local.path,
            version_marker,
        })
    }
}

/// Deterministic commit message: `<device label>: Updated <file name>`.
///
/// The device label makes multi-device histories traceable.
pub fn commit_message(device_label: &str, path: &VaultPath) -> String {
    format!("{}: Updated {}", device_label, path.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_message_format() {
        let path = VaultPath::parse("notes/daily/todo.md").unwrap();
        assert_eq!(
            commit_message("Laptop", &path),
            "Laptop: Updated todo.md"
        );
    }

    // Engine behavior is covered in tests/engine_tests.rs against the
    // in-memory store and remote.
}
