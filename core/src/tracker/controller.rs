//! Lifecycle controller

use chrono::Utc;
use futures::FutureExt;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::error::{TrackerError, ValidationError};
use crate::outcome::{OutcomeEngine, ProbeOutcome};
use crate::scheduler::{TaskScheduler, TickFn};
use crate::state::{
    Effect, LifecycleEvent, StateTransition, Task, TaskEvent, TaskId, TaskRegistry, TaskStats,
    TaskStatus, Transition,
};
use crate::validate::{FileDescriptor, UploadPolicy};

/// Tracks upload tasks from submission to a terminal status.
///
/// Every mutation (`submit_file`, `cancel_task`, `on_tick`) holds the registry lock for the
/// whole transition, so status, retries and the timer handle change together and a probe
/// that was stopped can never be applied afterwards.
#[derive(Clone)]
pub struct UploadTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    registry: Mutex<TaskRegistry>,
    scheduler: TaskScheduler,
    engine: OutcomeEngine,
    policy: UploadPolicy,
    event_tx: broadcast::Sender<TaskEvent>,
}

impl UploadTracker {
    pub fn new(
        policy: UploadPolicy,
        scheduler: TaskScheduler,
        engine: OutcomeEngine,
        channel_capacity: usize,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(channel_capacity.max(1));
        let inner = TrackerInner {
            registry: Mutex::new(TaskRegistry::new()),
            scheduler,
            engine,
            policy,
            event_tx,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.inner.policy
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.inner.scheduler
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Invokes `callback` for every change to a task's status or retries.
    ///
    /// The forwarder ends when the tracker is dropped.
    pub fn on_task_changed<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: Fn(&TaskEvent) + Send + 'static,
    {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if event.task_id().is_some() {
                            callback(&event);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "task change subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn emit(&self, event: TaskEvent) {
        let _ = self.inner.event_tx.send(event);
    }

    /// Validates `file`, then creates its task and starts processing it.
    pub async fn submit_file(&self, file: FileDescriptor) -> Result<TaskId, ValidationError> {
        if let Err(err) = self.inner.policy.validate(&file) {
            tracing::warn!(name = %file.display_name, reason = %err.reason(), "file rejected");
            self.emit(TaskEvent::Rejected {
                name: file.display_name,
                reason: err.reason(),
                timestamp: Utc::now(),
            });
            return Err(err);
        }

        let mut registry = self.inner.registry.lock().await;
        let id = registry.create(file.display_name.clone(), file.mime_type, file.size_bytes);
        tracing::info!(task_id = %id, name = %file.display_name, "task submitted");
        self.emit(TaskEvent::Submitted {
            task_id: id,
            name: file.display_name,
            timestamp: Utc::now(),
        });

        if let Err(err) = self.step(&mut registry, id, LifecycleEvent::AutoAdvance) {
            tracing::error!(task_id = %id, error = %err, "failed to start processing");
        }

        Ok(id)
    }

    /// Cancels a processing task. Returns false (and changes nothing) for any other task.
    pub async fn cancel_task(&self, id: TaskId) -> bool {
        let mut registry = self.inner.registry.lock().await;
        self.cancel_locked(&mut registry, id)
    }

    /// Cancels every processing task. Returns how many were cancelled.
    pub async fn cancel_all(&self) -> usize {
        let mut registry = self.inner.registry.lock().await;
        registry
            .ids_with_status(TaskStatus::Processing)
            .into_iter()
            .filter(|id| self.cancel_locked(&mut registry, *id))
            .count()
    }

    /// Cancels in-flight work and releases every probe timer.
    pub async fn shutdown(&self) {
        let cancelled = self.cancel_all().await;
        tracing::info!(cancelled, "tracker shut down");
    }

    fn cancel_locked(&self, registry: &mut TaskRegistry, id: TaskId) -> bool {
        match self.step(registry, id, LifecycleEvent::CancelRequested) {
            Ok(task) => {
                tracing::info!(task_id = %id, retries = task.retries, "task cancelled");
                true
            }
            Err(err) => {
                tracing::debug!(task_id = %id, error = %err, "cancel ignored");
                false
            }
        }
    }

    /// Handles one probe tick for `id`.
    ///
    /// Ticks for tasks that are no longer processing (or no longer exist) are dropped
    /// without drawing from the random source.
    pub async fn on_tick(&self, id: TaskId) {
        let mut registry = self.inner.registry.lock().await;

        let (status, retries) = match registry.get(id) {
            Ok(task) => (task.status, task.retries),
            Err(_) => {
                tracing::trace!(task_id = %id, "tick for unknown task dropped");
                return;
            }
        };
        if status != TaskStatus::Processing {
            tracing::debug!(task_id = %id, %status, "stale tick ignored");
            return;
        }

        let outcome = self.inner.engine.decide(retries);
        tracing::debug!(task_id = %id, retries, ?outcome, "probe tick");

        let task = match self.step(&mut registry, id, LifecycleEvent::Probe(outcome)) {
            Ok(task) => task,
            Err(err) => {
                tracing::debug!(task_id = %id, error = %err, "tick not applied");
                return;
            }
        };

        // The retry that reaches the cap fails the task in the same step.
        if outcome.is_retry() && self.inner.engine.is_exhausted(task.retries) {
            let exhausted = LifecycleEvent::Probe(ProbeOutcome::Exhausted);
            if let Err(err) = self.step(&mut registry, id, exhausted) {
                tracing::error!(task_id = %id, error = %err, "failed to close exhausted task");
            }
        }
    }

    /// Resolves and applies one lifecycle event, emitting the resulting change events.
    fn step(
        &self,
        registry: &mut TaskRegistry,
        id: TaskId,
        event: LifecycleEvent,
    ) -> Result<Task, TrackerError> {
        let from = registry.get(id)?.status;
        let transition = StateTransition::next(from, event)?;
        let task = self.apply(registry, id, transition)?;

        if let (Effect::IncrementRetries, LifecycleEvent::Probe(outcome)) =
            (transition.effect, event)
        {
            self.emit(TaskEvent::Retried {
                task_id: id,
                retries: task.retries,
                outcome,
                timestamp: Utc::now(),
            });
        }
        if from != task.status {
            if task.status.is_terminal() {
                tracing::info!(task_id = %id, status = %task.status, retries = task.retries, "task finished");
            }
            self.emit(TaskEvent::StatusChanged {
                task_id: id,
                from,
                to: task.status,
                retries: task.retries,
                timestamp: Utc::now(),
            });
        }

        Ok(task)
    }

    /// Timer effects run before the status change: a timer exists before the task is
    /// observable as processing, and is gone before it is observable as anything else.
    fn apply(
        &self,
        registry: &mut TaskRegistry,
        id: TaskId,
        transition: Transition,
    ) -> Result<Task, TrackerError> {
        match transition.effect {
            Effect::StartTimer => {
                self.inner.scheduler.start(registry, id, self.tick_fn(id))?;
            }
            Effect::StopTimer => {
                self.inner.scheduler.stop(registry, id);
            }
            Effect::IncrementRetries => {}
        }

        let increment = transition.effect == Effect::IncrementRetries;
        let max_retries = self.inner.engine.policy().max_retries;
        registry.update(id, |task| {
            if increment {
                task.retries = (task.retries + 1).min(max_retries);
                task.touch();
            }
            if task.status != transition.to {
                task.transition_to(transition.to);
            }
        })
    }

    fn tick_fn(&self, id: TaskId) -> TickFn {
        let weak = Arc::downgrade(&self.inner);
        Arc::new(move || {
            let weak = weak.clone();
            async move {
                if let Some(inner) = weak.upgrade() {
                    UploadTracker { inner }.on_tick(id).await;
                }
            }
            .boxed()
        })
    }

    /// Snapshot of every task in submission order.
    pub async fn list_tasks(&self) -> Vec<Task> {
        self.inner.registry.lock().await.list()
    }

    pub async fn get_task(&self, id: TaskId) -> Option<Task> {
        self.inner.registry.lock().await.get(id).ok().cloned()
    }

    pub async fn stats(&self) -> TaskStats {
        self.inner.registry.lock().await.stats()
    }

    /// True when no task is pending or processing.
    pub async fn is_idle(&self) -> bool {
        self.stats().await.active() == 0
    }

    /// Removes finished tasks from the list. Returns how many were removed.
    pub async fn clear_finished(&self) -> usize {
        let removed = self.inner.registry.lock().await.remove_terminal();
        tracing::debug!(removed, "finished tasks cleared");
        removed
    }
}

impl Drop for TrackerInner {
    fn drop(&mut self) {
        for task in self.registry.get_mut().iter() {
            if let Some(handle) = task.timer() {
                self.scheduler.driver().cancel_recurring(handle);
            }
        }
    }
}

impl std::fmt::Debug for UploadTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadTracker")
            .field("policy", &self.inner.policy)
            .field("scheduler", &self.inner.scheduler)
            .field("engine", &self.inner.engine)
            .finish_non_exhaustive()
    }
}
