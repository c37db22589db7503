//! Outcome engine: decides what each probe tick does to a processing task.

mod engine;
mod random;

pub use engine::{
    OutcomeEngine, OutcomePolicy, ProbeOutcome, DEFAULT_FAIL_PROBABILITY,
    DEFAULT_SUCCESS_PROBABILITY, MAX_RETRIES,
};
pub use random::{RandomSource, ScriptedRandom, SeededRandom, ThreadRandom};
