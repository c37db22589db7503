//! Probabilistic probe outcome resolution

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::random::RandomSource;

pub const MAX_RETRIES: u32 = 3;
pub const DEFAULT_FAIL_PROBABILITY: f64 = 0.10;
pub const DEFAULT_SUCCESS_PROBABILITY: f64 = 0.30;

/// Result of a single probe tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Retry budget already spent; decided without sampling
    Exhausted,
    /// Simulated server error; currently retried like `Neither`
    FailRoll,
    SuccessRoll,
    /// Still processing on the simulated server
    Neither,
}

impl ProbeOutcome {
    /// Whether the task stays in processing and consumes a retry.
    pub fn is_retry(self) -> bool {
        matches!(self, Self::FailRoll | Self::Neither)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomePolicy {
    pub max_retries: u32,
    pub fail_probability: f64,
    pub success_probability: f64,
}

impl Default for OutcomePolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            fail_probability: DEFAULT_FAIL_PROBABILITY,
            success_probability: DEFAULT_SUCCESS_PROBABILITY,
        }
    }
}

#[derive(Clone)]
pub struct OutcomeEngine {
    policy: OutcomePolicy,
    rng: Arc<dyn RandomSource>,
}

impl OutcomeEngine {
    pub fn new(policy: OutcomePolicy, rng: Arc<dyn RandomSource>) -> Self {
        Self { policy, rng }
    }

    pub fn policy(&self) -> &OutcomePolicy {
        &self.policy
    }

    /// Decides the outcome of one probe for a task that has used `retries` cycles.
    ///
    /// The cap is checked before sampling, so an exhausted task never consumes a draw.
    /// Both samples are always drawn otherwise.
    pub fn decide(&self, retries: u32) -> ProbeOutcome {
        if self.is_exhausted(retries) {
            return ProbeOutcome::Exhausted;
        }

        let fail_sample = self.rng.next_f64();
        let success_sample = self.rng.next_f64();

        if fail_sample < self.policy.fail_probability {
            ProbeOutcome::FailRoll
        } else if success_sample < self.policy.success_probability {
            ProbeOutcome::SuccessRoll
        } else {
            ProbeOutcome::Neither
        }
    }

    pub fn is_exhausted(&self, retries: u32) -> bool {
        retries >= self.policy.max_retries
    }
}

impl std::fmt::Debug for OutcomeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ScriptedRandom;

    fn engine(samples: Vec<f64>) -> (OutcomeEngine, Arc<ScriptedRandom>) {
        let rng = Arc::new(ScriptedRandom::new(samples));
        (
            OutcomeEngine::new(OutcomePolicy::default(), rng.clone()),
            rng,
        )
    }

    #[test]
    fn test_fail_roll_takes_precedence() {
        let (engine, _) = engine(vec![0.05, 0.0]);
        assert_eq!(engine.decide(0), ProbeOutcome::FailRoll);
    }

    #[test]
    fn test_success_roll_on_second_sample() {
        let (engine, _) = engine(vec![0.2]);
        assert_eq!(engine.decide(0), ProbeOutcome::SuccessRoll);
    }

    #[test]
    fn test_neither_when_both_samples_high() {
        let (engine, _) = engine(vec![0.5]);
        assert_eq!(engine.decide(2), ProbeOutcome::Neither);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let (engine, _) = engine(vec![0.10, 0.30]);
        assert_eq!(engine.decide(0), ProbeOutcome::Neither);
    }

    #[test]
    fn test_exhausted_without_drawing() {
        let (engine, rng) = engine(vec![0.0]);
        assert_eq!(engine.decide(MAX_RETRIES), ProbeOutcome::Exhausted);
        assert_eq!(engine.decide(MAX_RETRIES + 1), ProbeOutcome::Exhausted);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_draws_two_samples_per_decision() {
        let (engine, rng) = engine(vec![0.9]);
        engine.decide(0);
        engine.decide(1);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_retry_outcomes() {
        assert!(ProbeOutcome::FailRoll.is_retry());
        assert!(ProbeOutcome::Neither.is_retry());
        assert!(!ProbeOutcome::SuccessRoll.is_retry());
        assert!(!ProbeOutcome::Exhausted.is_retry());
    }
}
