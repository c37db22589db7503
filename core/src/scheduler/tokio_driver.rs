//! Timer driver backed by tokio tasks

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::driver::{TickFn, TimerDriver, TimerHandle};

/// Spawns one tokio task per recurring timer. Must be used inside a tokio runtime.
#[derive(Default)]
pub struct TokioTimerDriver {
    next_id: AtomicU64,
    timers: Mutex<HashMap<TimerHandle, JoinHandle<()>>>,
}

impl TokioTimerDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerDriver for TokioTimerDriver {
    fn set_recurring(&self, interval: Duration, tick: TickFn) -> TimerHandle {
        let handle = TimerHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let period = interval.max(Duration::from_millis(1));

        let join = tokio::spawn(async move {
            // First fire one full period after start, not immediately.
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tick().await;
            }
        });

        let mut timers = match self.timers.lock() {
            Ok(t) => t,
            Err(poisoned) => poisoned.into_inner(),
        };
        timers.insert(handle, join);
        tracing::trace!(%handle, period_ms = period.as_millis() as u64, "timer started");
        handle
    }

    fn cancel_recurring(&self, handle: TimerHandle) {
        let join = {
            let mut timers = match self.timers.lock() {
                Ok(t) => t,
                Err(poisoned) => poisoned.into_inner(),
            };
            timers.remove(&handle)
        };
        if let Some(join) = join {
            join.abort();
            tracing::trace!(%handle, "timer cancelled");
        }
    }

    fn active_timers(&self) -> usize {
        match self.timers.lock() {
            Ok(t) => t.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl Drop for TokioTimerDriver {
    fn drop(&mut self) {
        let timers = match self.timers.get_mut() {
            Ok(t) => t,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (_, join) in timers.drain() {
            join.abort();
        }
    }
}
