use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;
use crate::outcome::{
    OutcomePolicy, DEFAULT_FAIL_PROBABILITY, DEFAULT_SUCCESS_PROBABILITY, MAX_RETRIES,
};
use crate::scheduler::DEFAULT_PROBE_INTERVAL_MS;
use crate::validate::{UploadPolicy, MAX_UPLOAD_BYTES};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub events: EventsConfig,
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validation.validate()?;
        self.processing.validate()?;
        if self.events.channel_capacity == 0 {
            return Err(ConfigError::Zero {
                field: "events.channel_capacity",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "uptrack_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub allow_images: bool,

    /// Size limit, exclusive. The user-facing rejection text stays fixed at
    /// "under 2MB" whatever this is set to; the actual limit shows up in
    /// `ValidationError::reason` and the `Rejected` event.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,
}

fn default_max_size_bytes() -> u64 {
    MAX_UPLOAD_BYTES
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allow_images: false,
            max_size_bytes: default_max_size_bytes(),
        }
    }
}

impl ValidationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size_bytes == 0 {
            return Err(ConfigError::Zero {
                field: "validation.max_size_bytes",
            });
        }
        Ok(())
    }

    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            allow_images: self.allow_images,
            max_size_bytes: self.max_size_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_fail_probability")]
    pub fail_probability: f64,

    #[serde(default = "default_success_probability")]
    pub success_probability: f64,

    /// Fixed seed for reproducible outcomes; OS randomness when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_interval_ms() -> u64 {
    DEFAULT_PROBE_INTERVAL_MS
}

fn default_max_retries() -> u32 {
    MAX_RETRIES
}

fn default_fail_probability() -> f64 {
    DEFAULT_FAIL_PROBABILITY
}

fn default_success_probability() -> f64 {
    DEFAULT_SUCCESS_PROBABILITY
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_retries: default_max_retries(),
            fail_probability: default_fail_probability(),
            success_probability: default_success_probability(),
            seed: None,
        }
    }
}

impl ProcessingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Zero {
                field: "processing.interval_ms",
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Zero {
                field: "processing.max_retries",
            });
        }
        for (field, value) in [
            ("processing.fail_probability", self.fail_probability),
            ("processing.success_probability", self.success_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange { field, value });
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn outcome_policy(&self) -> OutcomePolicy {
        OutcomePolicy {
            max_retries: self.max_retries,
            fail_probability: self.fail_probability,
            success_probability: self.success_probability,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}
