//! Task state: data model, registry and the lifecycle transition table.

pub mod registry;
pub mod transitions;
pub mod types;

pub use registry::TaskRegistry;
pub use transitions::{Effect, LifecycleEvent, StateTransition, Transition, TransitionError};
pub use types::{Task, TaskEvent, TaskId, TaskStats, TaskStatus};
