//! Per-file outcomes and the pass report.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use gitvault_common::{Error, VaultPath};

/// Why a file was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Remote content is byte-identical to local.
    Unchanged,
}

/// How a file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Retried and may succeed on a later pass without intervention.
    Transient,
    /// Will not succeed until something changes (credentials, path,
    /// conflicting remote edit).
    Permanent,
}

impl From<&Error> for FailureKind {
    fn from(err: &Error) -> Self {
        if err.is_transient() {
            FailureKind::Transient
        } else {
            FailureKind::Permanent
        }
    }
}

/// Outcome of handling one file within a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOutcome {
    /// File was committed; the marker identifies the new remote revision.
    Committed {
        path: VaultPath,
        version_marker: String,
    },
    /// File needed no commit.
    Skipped { path: VaultPath, reason: SkipReason },
    /// File could not be committed. The pass continued regardless.
    Failed {
        path: VaultPath,
        kind: FailureKind,
        message: String,
    },
}

impl SyncOutcome {
    /// The file this outcome belongs to.
    pub fn path(&self) -> &VaultPath {
        match self {
            SyncOutcome::Committed { path, .. }
            | SyncOutcome::Skipped { path, .. }
            | SyncOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, SyncOutcome::Committed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SyncOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

/// Aggregate of one pass, in local enumeration order.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub outcomes: Vec<SyncOutcome>,
    pub duration: Duration,
}

impl PassReport {
    pub fn committed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_committed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    /// Failed outcomes only, for per-file reporting.
    pub fn failures(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    /// One-line summary for notifications.
    pub fn summary(&self) -> String {
        format!(
            "{} committed, {} skipped, {} failed",
            self.committed(),
            self.skipped(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> VaultPath {
        VaultPath::parse(s).unwrap()
    }

    #[test]
    fn test_report_counts_and_summary() {
        let report = PassReport {
            outcomes: vec![
                SyncOutcome::Committed {
                    path: path("a.md"),
                    version_marker: "m1".to_string(),
                },
                SyncOutcome::Skipped {
                    path: path("b.md"),
                    reason: SkipReason::Unchanged,
                },
                SyncOutcome::Failed {
                    path: path("c.md"),
                    kind: FailureKind::Permanent,
                    message: "conflict".to_string(),
                },
            ],
            duration: Duration::from_secs(1),
        };

        assert_eq!(report.committed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.summary(), "1 committed, 1 skipped, 1 failed");
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_failure_kind_from_error() {
        assert_eq!(
            FailureKind::from(&Error::Network("timeout".to_string())),
            FailureKind::Transient
        );
        assert_eq!(
            FailureKind::from(&Error::RateLimited("slow down".to_string())),
            FailureKind::Transient
        );
        assert_eq!(
            FailureKind::from(&Error::Conflict("sha mismatch".to_string())),
            FailureKind::Permanent
        );
        assert_eq!(
            FailureKind::from(&Error::Auth("bad token".to_string())),
            FailureKind::Permanent
        );
    }
}
