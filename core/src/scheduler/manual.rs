//! Timer driver fired by hand

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::driver::{TickFn, TimerDriver, TimerHandle};

struct ManualTimer {
    interval: Duration,
    tick: TickFn,
    fired: u64,
}

/// Deterministic driver: timers only fire when `fire`/`fire_all` is called.
///
/// Useful for tests and for embedding the tracker in an external event loop.
#[derive(Default)]
pub struct ManualTimerDriver {
    next_id: AtomicU64,
    timers: Mutex<BTreeMap<TimerHandle, ManualTimer>>,
}

impl ManualTimerDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_timers<R>(&self, f: impl FnOnce(&mut BTreeMap<TimerHandle, ManualTimer>) -> R) -> R {
        let mut timers = match self.timers.lock() {
            Ok(t) => t,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut timers)
    }

    /// Fires one timer. Returns false if the handle is not active.
    pub async fn fire(&self, handle: TimerHandle) -> bool {
        let tick = self.with_timers(|timers| {
            timers.get_mut(&handle).map(|t| {
                t.fired += 1;
                t.tick.clone()
            })
        });

        match tick {
            Some(tick) => {
                tick().await;
                true
            }
            None => false,
        }
    }

    /// Fires every active timer once, in creation order. Returns how many fired.
    pub async fn fire_all(&self) -> usize {
        let handles = self.active_handles();
        let mut fired = 0;
        for handle in handles {
            // A previous tick may have cancelled this one.
            if self.fire(handle).await {
                fired += 1;
            }
        }
        fired
    }

    pub fn active_handles(&self) -> Vec<TimerHandle> {
        self.with_timers(|timers| timers.keys().copied().collect())
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.with_timers(|timers| timers.contains_key(&handle))
    }

    pub fn interval_of(&self, handle: TimerHandle) -> Option<Duration> {
        self.with_timers(|timers| timers.get(&handle).map(|t| t.interval))
    }

    pub fn fire_count(&self, handle: TimerHandle) -> Option<u64> {
        self.with_timers(|timers| timers.get(&handle).map(|t| t.fired))
    }
}

impl TimerDriver for ManualTimerDriver {
    fn set_recurring(&self, interval: Duration, tick: TickFn) -> TimerHandle {
        let handle = TimerHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.with_timers(|timers| {
            timers.insert(
                handle,
                ManualTimer {
                    interval,
                    tick,
                    fired: 0,
                },
            )
        });
        handle
    }

    fn cancel_recurring(&self, handle: TimerHandle) {
        self.with_timers(|timers| timers.remove(&handle));
    }

    fn active_timers(&self) -> usize {
        self.with_timers(|timers| timers.len())
    }
}
