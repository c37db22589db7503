//! uptrack-core: lifecycle tracking for simulated upload tasks.
//!
//! Accepted files become tasks that are probed on a fixed interval until a random
//! outcome, the retry cap, or a cancellation ends them.

pub mod api;
pub mod config;
pub mod error;
pub mod outcome;
pub mod scheduler;
pub mod state;
pub mod tracker;
pub mod validate;
