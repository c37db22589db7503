//! Recurring timer primitive

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked on every timer fire.
pub type TickFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Ownership token for one recurring timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerHandle(pub(crate) u64);

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Environment scheduling primitive.
///
/// After `cancel_recurring` returns, the callback registered under that handle must not be
/// invoked again. Cancelling an unknown or already cancelled handle is a no-op.
pub trait TimerDriver: Send + Sync {
    fn set_recurring(&self, interval: Duration, tick: TickFn) -> TimerHandle;
    fn cancel_recurring(&self, handle: TimerHandle);
    fn active_timers(&self) -> usize;
}
