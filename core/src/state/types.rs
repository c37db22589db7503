//! Task state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::scheduler::TimerHandle;

/// Opaque unique identifier of a tracked task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepted, not yet probing
    Pending,
    /// Probe timer active
    Processing,
    Success,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Success, Failed and Cancelled have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Cancelled)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A tracked upload task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Display label taken from the source file
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub status: TaskStatus,
    /// Probe cycles consumed while processing
    pub retries: u32,
    /// Active probe timer; present only while processing
    #[serde(skip)]
    pub(crate) timer: Option<TimerHandle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub(crate) fn new(name: String, mime_type: String, size_bytes: u64) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            name,
            mime_type,
            size_bytes,
            status: TaskStatus::Pending,
            retries: 0,
            timer: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// Moves the task to `status`, keeping `retries` consistent with it.
    pub(crate) fn transition_to(&mut self, status: TaskStatus) {
        if status == TaskStatus::Processing && self.status != TaskStatus::Processing {
            self.retries = 0;
        }
        self.status = status;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Per-status task counts
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub pending: usize,
    pub processing: usize,
    pub success: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl TaskStats {
    pub fn total(&self) -> usize {
        self.pending + self.processing + self.success + self.failed + self.cancelled
    }

    pub fn active(&self) -> usize {
        self.pending + self.processing
    }
}

/// Observable change to the task collection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    Submitted {
        task_id: TaskId,
        name: String,
        timestamp: DateTime<Utc>,
    },
    StatusChanged {
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
        retries: u32,
        timestamp: DateTime<Utc>,
    },
    Retried {
        task_id: TaskId,
        retries: u32,
        outcome: crate::outcome::ProbeOutcome,
        timestamp: DateTime<Utc>,
    },
    Rejected {
        name: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl TaskEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Submitted { timestamp, .. }
            | Self::StatusChanged { timestamp, .. }
            | Self::Retried { timestamp, .. }
            | Self::Rejected { timestamp, .. } => *timestamp,
        }
    }

    /// Task the event refers to; rejections never create one.
    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            Self::Submitted { task_id, .. }
            | Self::StatusChanged { task_id, .. }
            | Self::Retried { task_id, .. } => Some(*task_id),
            Self::Rejected { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(TaskStatus::Success.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new("a.pdf".into(), "application/pdf".into(), 10);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.retries, 0);
        assert!(!task.has_timer());
    }

    #[test]
    fn test_entering_processing_resets_retries() {
        let mut task = Task::new("a.pdf".into(), "application/pdf".into(), 10);
        task.retries = 2;
        task.transition_to(TaskStatus::Processing);
        assert_eq!(task.retries, 0);

        task.retries = 3;
        task.transition_to(TaskStatus::Failed);
        assert_eq!(task.retries, 3);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
