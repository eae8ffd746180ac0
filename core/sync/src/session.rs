//! Single-active-pass guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide flag guarding against overlapping sync passes.
///
/// Manual triggers and scheduled ticks both acquire through here; a tick
/// that finds the flag set is shed, not queued.
#[derive(Debug, Clone, Default)]
pub struct SyncSession {
    in_progress: Arc<AtomicBool>,
}

impl SyncSession {
    /// Create a new session with no pass in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to mark a pass as started.
    ///
    /// Returns a guard that clears the flag when dropped, on every exit
    /// path including early return and panic, or `None` if a pass is
    /// already in progress.
    pub fn try_begin(&self) -> Option<PassGuard> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard {
                flag: self.in_progress.clone(),
            })
    }

    /// Whether a pass currently holds the guard.
    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }
}

/// RAII marker for a running pass.
#[derive(Debug)]
pub struct PassGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
