//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `uptrack_core::api` instead of reaching into internal modules.

pub use crate::config::{load_default, load_from_path, LoggingConfig, TrackerConfig};
pub use crate::error::{CliError, ConfigError, TrackerError, ValidationError, REJECTION_MESSAGE};
pub use crate::outcome::{
    OutcomeEngine, OutcomePolicy, ProbeOutcome, RandomSource, ScriptedRandom, SeededRandom,
    ThreadRandom, MAX_RETRIES,
};
pub use crate::scheduler::{
    ManualTimerDriver, TaskScheduler, TimerDriver, TimerHandle, TokioTimerDriver,
};
pub use crate::state::{Task, TaskEvent, TaskId, TaskStats, TaskStatus};
pub use crate::tracker::{TrackerBuilder, UploadTracker};
pub use crate::validate::{validate, FileDescriptor, UploadPolicy, MAX_UPLOAD_BYTES};
