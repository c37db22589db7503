//! Task scheduler: recurring probe timers and the drivers that fire them.

mod driver;
mod manual;
mod task_scheduler;
mod tokio_driver;

pub use driver::{TickFn, TimerDriver, TimerHandle};
pub use manual::ManualTimerDriver;
pub use task_scheduler::{TaskScheduler, DEFAULT_PROBE_INTERVAL_MS};
pub use tokio_driver::TokioTimerDriver;
