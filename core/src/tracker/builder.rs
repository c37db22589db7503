use std::sync::Arc;
use std::time::Duration;

use super::controller::UploadTracker;
use crate::config::TrackerConfig;
use crate::outcome::{OutcomeEngine, OutcomePolicy, RandomSource, SeededRandom, ThreadRandom};
use crate::scheduler::{TaskScheduler, TimerDriver, TokioTimerDriver, DEFAULT_PROBE_INTERVAL_MS};
use crate::validate::UploadPolicy;

/// Assembles an [`UploadTracker`] from its collaborators.
///
/// Unset collaborators default to a [`TokioTimerDriver`] and [`ThreadRandom`].
pub struct TrackerBuilder {
    policy: UploadPolicy,
    outcome: OutcomePolicy,
    interval: Duration,
    channel_capacity: usize,
    driver: Option<Arc<dyn TimerDriver>>,
    rng: Option<Arc<dyn RandomSource>>,
}

impl Default for TrackerBuilder {
    fn default() -> Self {
        Self {
            policy: UploadPolicy::default(),
            outcome: OutcomePolicy::default(),
            interval: Duration::from_millis(DEFAULT_PROBE_INTERVAL_MS),
            channel_capacity: 256,
            driver: None,
            rng: None,
        }
    }
}

impl TrackerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &TrackerConfig) -> Self {
        let rng: Arc<dyn RandomSource> = match cfg.processing.seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };
        Self {
            policy: cfg.validation.policy(),
            outcome: cfg.processing.outcome_policy(),
            interval: cfg.processing.interval(),
            channel_capacity: cfg.events.channel_capacity,
            driver: None,
            rng: Some(rng),
        }
    }

    pub fn policy(mut self, policy: UploadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn outcome_policy(mut self, outcome: OutcomePolicy) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn driver(mut self, driver: Arc<dyn TimerDriver>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn random_source(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn build(self) -> UploadTracker {
        let driver: Arc<dyn TimerDriver> = match self.driver {
            Some(driver) => driver,
            None => Arc::new(TokioTimerDriver::new()),
        };
        let rng: Arc<dyn RandomSource> = match self.rng {
            Some(rng) => rng,
            None => Arc::new(ThreadRandom),
        };
        UploadTracker::new(
            self.policy,
            TaskScheduler::new(driver, self.interval),
            OutcomeEngine::new(self.outcome, rng),
            self.channel_capacity,
        )
    }
}

impl UploadTracker {
    pub fn builder() -> TrackerBuilder {
        TrackerBuilder::new()
    }

    pub fn from_config(cfg: &TrackerConfig) -> Self {
        TrackerBuilder::from_config(cfg).build()
    }
}
