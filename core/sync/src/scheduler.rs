//! Interval scheduling for unattended sync passes.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

/// Owns the periodic sync timer.
///
/// One timer at a time: re-starting replaces the previous schedule
/// instead of stacking a second one, and stopping cancels only the timer,
/// so a pass already started by a tick runs to its natural end. Shedding
/// of overlapping passes happens at the engine's session gate, not here.
#[derive(Debug, Default)]
pub struct SyncScheduler {
    timer: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    /// Create a scheduler with no timer running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking every `interval`, replacing any previous schedule.
    ///
    /// The first tick fires one full interval from now. Each tick spawns
    /// `on_tick` into its own task, so a slow pass neither delays the
    /// timer nor dies with it.
    pub fn start<F, Fut>(&mut self, interval: Duration, on_tick: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop();
        info!("auto-sync scheduled every {:?}", interval);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("sync tick");
                tokio::spawn(on_tick());
            }
        });
        self.timer = Some(handle);
    }

    /// Whether the timer is running.
    pub fn is_running(&self) -> bool {
        self.timer.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Cancel the timer. Safe to call when not running.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            info!("auto-sync stopped");
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_ticks_fire_on_interval() {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();

        let mut scheduler = SyncScheduler::new();
        scheduler.start(Duration::from_millis(10), move || {
            let count = count_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert!(scheduler.is_running());

        sleep(Duration::from_millis(100)).await;
        scheduler.stop();
        assert!(count.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_restart_replaces_timer() {
        let fast = Arc::new(AtomicU32::new(0));
        let fast_clone = fast.clone();

        let mut scheduler = SyncScheduler::new();
        scheduler.start(Duration::from_millis(5), move || {
            let count = fast_clone.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });

        // Replace with a schedule that will not fire during the test.
        scheduler.start(Duration::from_secs(3600), || async {});

        sleep(Duration::from_millis(50)).await;
        let after_restart = fast.load(Ordering::SeqCst);
        sleep(Duration::from_millis(50)).await;

        // The fast timer is gone, so its counter stopped moving.
        assert_eq!(fast.load(Ordering::SeqCst), after_restart);
        assert!(scheduler.is_running());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut scheduler = SyncScheduler::new();
        scheduler.stop();
        scheduler.start(Duration::from_millis(10), || async {});
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_in_flight_tick_survives_stop() {
        let finished = Arc::new(AtomicU32::new(0));
        let finished_clone = finished.clone();

        let mut scheduler = SyncScheduler::new();
        scheduler.start(Duration::from_millis(5), move || {
            let finished = finished_clone.clone();
            async move {
                sleep(Duration::from_millis(30)).await;
                finished.fetch_add(1, Ordering::SeqCst);
            }
        });

        // Let one tick start, then cancel the timer while its work is
        // still sleeping.
        sleep(Duration::from_millis(10)).await;
        scheduler.stop();
        sleep(Duration::from_millis(50)).await;

        assert!(finished.load(Ordering::SeqCst) >= 1);
    }
}
