#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use uptrack_core::api::{
    FileDescriptor, ManualTimerDriver, RandomSource, ScriptedRandom, TaskId, UploadPolicy,
    UploadTracker,
};

pub const MIB: u64 = 1024 * 1024;

/// Tracker wired to a hand-fired timer driver and a scripted random source.
pub struct Harness {
    pub tracker: UploadTracker,
    pub driver: Arc<ManualTimerDriver>,
    pub rng: Arc<ScriptedRandom>,
}

pub fn harness(samples: Vec<f64>) -> Harness {
    harness_with_policy(samples, UploadPolicy::default())
}

pub fn harness_with_policy(samples: Vec<f64>, policy: UploadPolicy) -> Harness {
    let driver = Arc::new(ManualTimerDriver::new());
    let rng = Arc::new(ScriptedRandom::new(samples));
    let tracker = UploadTracker::builder()
        .policy(policy)
        .driver(driver.clone())
        .random_source(rng.clone())
        .build();
    Harness {
        tracker,
        driver,
        rng,
    }
}

pub fn harness_with_source(rng: Arc<dyn RandomSource>) -> (UploadTracker, Arc<ManualTimerDriver>) {
    let driver = Arc::new(ManualTimerDriver::new());
    let tracker = UploadTracker::builder()
        .driver(driver.clone())
        .random_source(rng)
        .interval(Duration::from_millis(10))
        .build();
    (tracker, driver)
}

pub fn pdf(name: &str, size_bytes: u64) -> FileDescriptor {
    FileDescriptor::pdf(name, size_bytes)
}

impl Harness {
    pub async fn submit_pdf(&self, name: &str) -> TaskId {
        self.tracker
            .submit_file(pdf(name, MIB))
            .await
            .expect("1 MiB pdf must be accepted")
    }

    /// Fires the task's own probe timer. Returns false when the task has none.
    pub async fn tick(&self, id: TaskId) -> bool {
        let Some(handle) = self.tracker.get_task(id).await.and_then(|t| t.timer()) else {
            return false;
        };
        self.driver.fire(handle).await
    }
}
