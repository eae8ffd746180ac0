//! Change detection between local and remote file state.

use chrono::{DateTime, Utc};

use gitvault_common::VaultPath;
use gitvault_remote::RemoteFileState;

/// A local file captured at the start of its handling within a pass.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    /// Path relative to the vault root.
    pub path: VaultPath,
    /// Full file content.
    pub content: Vec<u8>,
    /// Last local modification time.
    pub modified: DateTime<Utc>,
}

/// Decide whether `local` needs to be committed over `remote`.
///
/// A file absent on the remote always counts as changed. Otherwise the
/// comparison is byte-exact; no whitespace or encoding normalization is
/// applied. Pure; callers must obtain `remote` from a read immediately
/// preceding this call so the answer reflects the remote state at commit
/// time.
pub fn has_changed(remote: &RemoteFileState, local: &FileSnapshot) -> bool {
    match &remote.content {
        None => true,
        Some(remote_content) => remote_content != &local.content,
    }
}
