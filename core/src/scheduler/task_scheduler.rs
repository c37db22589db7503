//! Per-task probe timer ownership

use std::sync::Arc;
use std::time::Duration;

use super::driver::{TickFn, TimerDriver, TimerHandle};
use crate::error::TrackerError;
use crate::state::{TaskId, TaskRegistry};

pub const DEFAULT_PROBE_INTERVAL_MS: u64 = 2000;

/// Owns the recurring probe of every processing task.
///
/// The handle lives on the task itself; `start` and `stop` are the only places that set or
/// clear it, so a task holds at most one timer at any time.
#[derive(Clone)]
pub struct TaskScheduler {
    driver: Arc<dyn TimerDriver>,
    interval: Duration,
}

impl TaskScheduler {
    pub fn new(driver: Arc<dyn TimerDriver>, interval: Duration) -> Self {
        Self { driver, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn driver(&self) -> &Arc<dyn TimerDriver> {
        &self.driver
    }

    /// Starts the probe for `id` and records the handle on the task.
    pub fn start(
        &self,
        registry: &mut TaskRegistry,
        id: TaskId,
        tick: TickFn,
    ) -> Result<TimerHandle, TrackerError> {
        if let Some(existing) = registry.get(id)?.timer() {
            return Err(TrackerError::TimerActive { id, handle: existing });
        }

        let handle = self.driver.set_recurring(self.interval, tick);
        registry.update(id, |task| task.timer = Some(handle))?;
        tracing::debug!(task_id = %id, %handle, "probe timer started");
        Ok(handle)
    }

    /// Releases the task's probe timer. Returns false when there was nothing to release.
    pub fn stop(&self, registry: &mut TaskRegistry, id: TaskId) -> bool {
        let mut released = None;
        if registry
            .update(id, |task| released = task.timer.take())
            .is_err()
        {
            return false;
        }

        match released {
            Some(handle) => {
                self.driver.cancel_recurring(handle);
                tracing::debug!(task_id = %id, %handle, "probe timer stopped");
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("interval", &self.interval)
            .field("active_timers", &self.driver.active_timers())
            .finish()
    }
}
