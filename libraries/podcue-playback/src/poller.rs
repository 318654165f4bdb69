//! Position poller
//!
//! Samples the playhead on a fixed cadence while a session plays. Start and
//! stop are idempotent so repeated play/pause toggles never stack timers.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Runs a sampling callback on a fixed interval
pub struct PositionPoller {
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PositionPoller {
    /// Create a stopped poller
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: Mutex::new(None),
        }
    }

    /// Sampling cadence
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start sampling with `tick`
    ///
    /// The first tick fires one interval after start. Returns `false` when
    /// already running or when called outside a tokio runtime.
    pub fn start<F>(&self, mut tick: F) -> bool
    where
        F: FnMut() + Send + 'static,
    {
        let mut task = self.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("Position poller needs a tokio runtime, not starting");
            return false;
        };

        let period = self.interval.max(Duration::from_millis(1));
        *task = Some(runtime.spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick();
            }
        }));

        tracing::debug!("Position poller started ({:?})", period);
        true
    }

    /// Stop sampling; returns whether a running poller was stopped
    pub fn stop(&self) -> bool {
        match self.lock().take() {
            Some(handle) => {
                handle.abort();
                tracing::debug!("Position poller stopped");
                true
            }
            None => false,
        }
    }

    /// Whether the poller is running
    pub fn is_running(&self) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PositionPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.lock().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let tick_count = Arc::clone(&count);
        (count, move || {
            tick_count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_on_interval() {
        let poller = PositionPoller::new(Duration::from_secs(1));
        let (count, tick) = counter();

        assert!(poller.start(tick));
        time::sleep(Duration::from_millis(3_500)).await;

        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let poller = PositionPoller::new(Duration::from_secs(1));
        let (first, tick) = counter();
        let (second, other_tick) = counter();

        assert!(poller.start(tick));
        assert!(!poller.start(other_tick));
        time::sleep(Duration::from_millis(2_500)).await;

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_halts_ticks() {
        let poller = PositionPoller::new(Duration::from_secs(1));
        let (count, tick) = counter();

        assert!(!poller.stop());
        poller.start(tick);
        time::sleep(Duration::from_millis(1_500)).await;
        assert!(poller.stop());
        assert!(!poller.stop());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn can_restart_after_stop() {
        let poller = PositionPoller::new(Duration::from_secs(1));
        let (count, tick) = counter();
        let (_, other_tick) = counter();

        poller.start(other_tick);
        poller.stop();
        assert!(poller.start(tick));

        time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn start_without_runtime_fails() {
        let poller = PositionPoller::new(Duration::from_secs(1));
        assert!(!poller.start(|| {}));
        assert!(!poller.is_running());
    }
}
