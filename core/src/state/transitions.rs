//! Task lifecycle transition table

use super::types::TaskStatus;
use crate::outcome::ProbeOutcome;
use thiserror::Error;

/// Event applied to a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Pending task picked up for processing
    AutoAdvance,
    /// Probe tick resolved to an outcome
    Probe(ProbeOutcome),
    CancelRequested,
}

/// Side effect the controller must perform together with the status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartTimer,
    StopTimer,
    IncrementRetries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub to: TaskStatus,
    pub effect: Effect,
}

/// Event that has no transition from the task's current status.
///
/// None of these reach callers: the controller drops them as no-ops.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("probe tick ignored for task in {status} state")]
    StaleTick { status: TaskStatus },
    #[error("task in {status} state cannot be cancelled")]
    NotCancellable { status: TaskStatus },
    #[error("invalid transition from {from} on {event:?}")]
    InvalidTransition {
        from: TaskStatus,
        event: LifecycleEvent,
    },
}

pub struct StateTransition;

impl StateTransition {
    /// Resolves `event` against `from`.
    pub fn next(from: TaskStatus, event: LifecycleEvent) -> Result<Transition, TransitionError> {
        use LifecycleEvent::*;
        use TaskStatus::*;

        let transition = match (from, event) {
            (Pending, AutoAdvance) => Transition {
                to: Processing,
                effect: Effect::StartTimer,
            },
            (Processing, Probe(ProbeOutcome::Exhausted)) => Transition {
                to: Failed,
                effect: Effect::StopTimer,
            },
            (Processing, Probe(ProbeOutcome::SuccessRoll)) => Transition {
                to: Success,
                effect: Effect::StopTimer,
            },
            (Processing, Probe(ProbeOutcome::FailRoll)) => Transition {
                to: Processing,
                effect: Effect::IncrementRetries,
            },
            (Processing, Probe(ProbeOutcome::Neither)) => Transition {
                to: Processing,
                effect: Effect::IncrementRetries,
            },
            (Processing, CancelRequested) => Transition {
                to: Cancelled,
                effect: Effect::StopTimer,
            },
            (status, Probe(_)) => return Err(TransitionError::StaleTick { status }),
            (status, CancelRequested) => return Err(TransitionError::NotCancellable { status }),
            (from, event) => return Err(TransitionError::InvalidTransition { from, event }),
        };

        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TaskStatus; 5] = [
        TaskStatus::Pending,
        TaskStatus::Processing,
        TaskStatus::Success,
        TaskStatus::Failed,
        TaskStatus::Cancelled,
    ];

    #[test]
    fn test_pending_advances_with_timer() {
        let t = StateTransition::next(TaskStatus::Pending, LifecycleEvent::AutoAdvance).unwrap();
        assert_eq!(t.to, TaskStatus::Processing);
        assert_eq!(t.effect, Effect::StartTimer);
    }

    #[test]
    fn test_probe_outcomes_from_processing() {
        let cases = [
            (ProbeOutcome::Exhausted, TaskStatus::Failed, Effect::StopTimer),
            (ProbeOutcome::SuccessRoll, TaskStatus::Success, Effect::StopTimer),
            (
                ProbeOutcome::FailRoll,
                TaskStatus::Processing,
                Effect::IncrementRetries,
            ),
            (
                ProbeOutcome::Neither,
                TaskStatus::Processing,
                Effect::IncrementRetries,
            ),
        ];
        for (outcome, to, effect) in cases {
            let t = StateTransition::next(TaskStatus::Processing, LifecycleEvent::Probe(outcome))
                .unwrap();
            assert_eq!(t, Transition { to, effect }, "outcome {outcome:?}");
        }
    }

    #[test]
    fn test_probe_outside_processing_is_stale() {
        for status in ALL.into_iter().filter(|s| *s != TaskStatus::Processing) {
            let err = StateTransition::next(status, LifecycleEvent::Probe(ProbeOutcome::SuccessRoll))
                .unwrap_err();
            assert_eq!(err, TransitionError::StaleTick { status });
        }
    }

    #[test]
    fn test_cancel_only_from_processing() {
        for status in ALL {
            let result = StateTransition::next(status, LifecycleEvent::CancelRequested);
            if status == TaskStatus::Processing {
                assert_eq!(result.unwrap().to, TaskStatus::Cancelled);
            } else {
                assert_eq!(result.unwrap_err(), TransitionError::NotCancellable { status });
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_transitions() {
        let events = [
            LifecycleEvent::AutoAdvance,
            LifecycleEvent::Probe(ProbeOutcome::Neither),
            LifecycleEvent::CancelRequested,
        ];
        for status in ALL.into_iter().filter(|s| s.is_terminal()) {
            for event in events {
                assert!(StateTransition::next(status, event).is_err());
            }
        }
    }
}
