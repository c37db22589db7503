//! Lifecycle controller: turns submissions, cancellations and probe ticks into task
//! transitions.
//!
//! ```text
//! submit_file ─▶ UploadPolicy::validate ─▶ TaskRegistry::create (Pending)
//!                                          ─▶ TaskScheduler::start (Processing)
//! probe tick  ─▶ OutcomeEngine::decide ─▶ StateTransition::next ─▶ registry update
//! cancel_task ─▶ TaskScheduler::stop ─▶ Cancelled
//! ```

mod builder;
mod controller;

pub use builder::TrackerBuilder;
pub use controller::UploadTracker;
