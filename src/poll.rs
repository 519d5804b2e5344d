//! Fixed-interval auto-refresh for a resource binding

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::resource::Resource;

/// Drives `refresh()` on a binding once per period while enabled.
///
/// The first refresh fires only after a full period elapses; the
/// immediate mount-time fetch is the binding's own job. Disabling stops
/// future ticks right away without waiting for an in-flight refresh,
/// and re-enabling starts a fresh interval. Dropping the poller aborts
/// its task, so the timer is released on every exit path.
pub struct Poller {
    enabled: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the polling task.
    pub fn start<T, D>(resource: Resource<T, D>, period: Duration, enabled: bool) -> Self
    where
        T: Clone + Send + Sync + 'static,
        D: Clone + Send + Sync + 'static,
    {
        let (tx, rx) = watch::channel(enabled);
        let handle = tokio::spawn(run(resource, period, rx));
        Self {
            enabled: tx,
            handle,
        }
    }

    /// Turn periodic refresh on or off.
    pub fn set_enabled(&self, enabled: bool) {
        let _ = self.enabled.send(enabled);
    }

    /// Flip the current setting, returning the new value.
    pub fn toggle(&self) -> bool {
        let next = !self.is_enabled();
        self.set_enabled(next);
        next
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run<T, D>(resource: Resource<T, D>, period: Duration, mut enabled: watch::Receiver<bool>)
where
    T: Clone + Send + Sync + 'static,
    D: Clone + Send + 'static,
{
    loop {
        if !*enabled.borrow_and_update() {
            // parked until the setting changes
            if enabled.changed().await.is_err() {
                return;
            }
            continue;
        }

        debug!(period_ms = period.as_millis() as u64, "polling enabled");
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick of a fresh interval completes immediately;
        // consume it so no refresh fires before one period elapses
        interval.tick().await;

        loop {
            // biased: a pending disable must win over a due tick, or a
            // refresh that overran the period could fire once more
            // after set_enabled(false)
            tokio::select! {
                biased;
                changed = enabled.changed() => {
                    match changed {
                        Err(_) => return,
                        Ok(()) => {
                            if !*enabled.borrow_and_update() {
                                debug!("polling disabled");
                                break;
                            }
                        }
                    }
                }
                _ = interval.tick() => {
                    resource.refresh().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_resource(counter: Arc<AtomicUsize>) -> Resource<usize, ()> {
        Resource::new((), 0usize, move |_| {
            let counter = Arc::clone(&counter);
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resource = counting_resource(Arc::clone(&calls));
        let _poller = Poller::start(resource, Duration::from_millis(3000), true);

        // nothing fires before the first period elapses
        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(9000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn disable_stops_future_ticks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resource = counting_resource(Arc::clone(&calls));
        let poller = Poller::start(resource, Duration::from_millis(3000), true);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        poller.set_enabled(false);
        tokio::time::sleep(Duration::from_millis(9000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "no ticks after disable");
    }

    #[tokio::test(start_paused = true)]
    async fn disable_during_slow_refresh_stops_the_next_tick() {
        // each refresh takes four periods, so by the time it finishes
        // the next tick is already due alongside the pending disable
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch_calls = Arc::clone(&calls);
        let resource = Resource::new((), 0usize, move |_| {
            let calls = Arc::clone(&fetch_calls);
            async move {
                let started = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(started)
            }
        });
        let poller = Poller::start(resource, Duration::from_millis(50), true);

        // first tick at 50ms starts a refresh that runs until 250ms
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        poller.set_enabled(false);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "no refresh may start after disable, even mid-refresh"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reenable_resumes_without_immediate_fire() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resource = counting_resource(Arc::clone(&calls));
        let poller = Poller::start(resource, Duration::from_millis(3000), true);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        poller.set_enabled(false);
        tokio::time::sleep(Duration::from_millis(500)).await;

        poller.set_enabled(true);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "re-enable must not fire immediately");

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn starts_disabled_when_asked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resource = counting_resource(Arc::clone(&calls));
        let poller = Poller::start(resource, Duration::from_millis(3000), false);
        assert!(!poller.is_enabled());

        tokio::time::sleep(Duration::from_millis(9000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        poller.set_enabled(true);
        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_the_timer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resource = counting_resource(Arc::clone(&calls));
        let poller = Poller::start(resource, Duration::from_millis(3000), true);

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(poller);
        tokio::time::sleep(Duration::from_millis(9000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
