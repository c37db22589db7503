#[allow(clippy::module_inception)]
pub mod error;
pub mod tracker;

pub use error::{CliError, ConfigError};
pub use tracker::{TrackerError, ValidationError, REJECTION_MESSAGE};
