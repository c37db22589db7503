//! In-memory task registry

use std::collections::HashMap;

use super::types::{Task, TaskId, TaskStats, TaskStatus};
use crate::error::TrackerError;

/// Authoritative task collection, keyed by id and kept in insertion order.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    index: HashMap<TaskId, usize>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new pending task and returns its id.
    pub fn create(&mut self, name: String, mime_type: String, size_bytes: u64) -> TaskId {
        let task = Task::new(name, mime_type, size_bytes);
        let id = task.id;
        self.index.insert(id, self.tasks.len());
        self.tasks.push(task);
        id
    }

    pub fn get(&self, id: TaskId) -> Result<&Task, TrackerError> {
        self.index
            .get(&id)
            .map(|&pos| &self.tasks[pos])
            .ok_or(TrackerError::NotFound(id))
    }

    /// Applies `f` to the task and returns the updated snapshot.
    pub fn update<F>(&mut self, id: TaskId, f: F) -> Result<Task, TrackerError>
    where
        F: FnOnce(&mut Task),
    {
        let pos = *self.index.get(&id).ok_or(TrackerError::NotFound(id))?;
        let task = &mut self.tasks[pos];
        f(task);
        Ok(task.clone())
    }

    pub fn list(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn ids_with_status(&self, status: TaskStatus) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|t| t.status == status)
            .map(|t| t.id)
            .collect()
    }

    pub fn stats(&self) -> TaskStats {
        let mut stats = TaskStats::default();
        for task in &self.tasks {
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Processing => stats.processing += 1,
                TaskStatus::Success => stats.success += 1,
                TaskStatus::Failed => stats.failed += 1,
                TaskStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }

    /// Drops terminal tasks, keeping the relative order of the rest.
    pub fn remove_terminal(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.status.is_terminal());
        self.reindex();
        before - self.tasks.len()
    }

    fn reindex(&mut self) {
        self.index = self
            .tasks
            .iter()
            .enumerate()
            .map(|(pos, t)| (t.id, pos))
            .collect();
    }
}
