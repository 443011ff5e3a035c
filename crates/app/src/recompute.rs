//! Trailing-edge debouncing of view recomputes.
//!
//! Every state change calls [`RecomputeScheduler::schedule`]. A change
//! arriving before the pending timer fires cancels it and arms a new one, so
//! a burst of changes produces exactly one recompute, after the last change.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Delay between the last state change and the recompute.
pub const DEFAULT_RECOMPUTE_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct RecomputeScheduler {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    generation: Arc<watch::Sender<u64>>,
}

impl RecomputeScheduler {
    pub fn new(delay: Duration) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            delay,
            pending: Mutex::new(None),
            generation: Arc::new(tx),
        }
    }

    /// Cancel any pending recompute and arm a new one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            generation.send_modify(|g| *g += 1);
            tracing::trace!(generation = *generation.borrow(), "View recompute due");
        }));
    }

    /// Receiver that changes once per delivered recompute.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Number of recomputes delivered so far.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Default for RecomputeScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_RECOMPUTE_DELAY)
    }
}

impl Drop for RecomputeScheduler {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_one_recompute() {
        let scheduler = RecomputeScheduler::new(Duration::from_millis(50));
        let mut rx = scheduler.subscribe();

        scheduler.schedule();
        tokio::time::advance(Duration::from_millis(20)).await;
        scheduler.schedule();
        scheduler.schedule();
        assert!(scheduler.is_pending());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);

        // Cancelled timers never fire.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(scheduler.generation(), 1);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_fires_before_the_delay() {
        let scheduler = RecomputeScheduler::new(Duration::from_millis(50));
        scheduler.schedule();
        tokio::time::advance(Duration::from_millis(10)).await;
        assert_eq!(scheduler.generation(), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(scheduler.generation(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn later_changes_fire_again() {
        let scheduler = RecomputeScheduler::default();
        let mut rx = scheduler.subscribe();

        scheduler.schedule();
        rx.changed().await.unwrap();
        scheduler.schedule();
        rx.changed().await.unwrap();

        assert_eq!(scheduler.generation(), 2);
    }
}
