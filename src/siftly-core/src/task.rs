use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ApiError;

/// Lifecycle state of an asynchronous task.
///
/// `Enqueued` and `Processing` are pending; every other state is terminal and
/// never transitions again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskStatus {
    pub fn is_pending(self) -> bool {
        match self {
            TaskStatus::Enqueued | TaskStatus::Processing => true,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        !self.is_pending()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Enqueued => "enqueued",
            TaskStatus::Processing => "processing",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of mutating operation a task performs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TaskType {
    IndexCreation,
    IndexUpdate,
    IndexDeletion,
    IndexSwap,
    DocumentAdditionOrUpdate,
    DocumentDeletion,
    SettingsUpdate,
    DumpCreation,
    TaskCancelation,
    TaskDeletion,
    SnapshotCreation,
    /// Any kind this client does not know about yet
    #[serde(other)]
    Unknown,
}

/// Summary returned by the server when it accepts a mutating request.
///
/// This is the task handle: `task_uid` is what the poller queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub task_uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub enqueued_at: DateTime<Utc>,
}

/// Full task record as reported by `GET /tasks/{uid}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canceled_by: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Present only when the task failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// ISO 8601 duration, e.g. `PT0.012S`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }

    pub fn is_failure(&self) -> bool {
        self.status == TaskStatus::Failed
    }
}

/// One page of `GET /tasks`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksResults {
    pub results: Vec<Task>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub next: Option<u64>,
}

/// Filters for `GET /tasks`
#[derive(Debug, Clone, Default)]
pub struct TasksQuery {
    pub index_uids: Vec<String>,
    pub statuses: Vec<TaskStatus>,
    pub types: Vec<TaskType>,
    pub limit: Option<u32>,
    pub from: Option<u64>,
}

impl TasksQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index_uid(mut self, uid: impl Into<String>) -> Self {
        self.index_uids.push(uid.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.types.push(task_type);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    /// Query-string pairs in the server's comma-separated list format
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.index_uids.is_empty() {
            pairs.push(("indexUids", self.index_uids.join(",")));
        }
        if !self.statuses.is_empty() {
            let statuses: Vec<&str> = self.statuses.iter().map(|s| s.as_str()).collect();
            pairs.push(("statuses", statuses.join(",")));
        }
        if !self.types.is_empty() {
            let types: Vec<String> = self
                .types
                .iter()
                .filter_map(|t| serde_json::to_value(t).ok())
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            pairs.push(("types", types.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(from) = self.from {
            pairs.push(("from", from.to_string()));
        }
        pairs
    }
}

/// Anything that identifies a task for polling
pub trait AsTaskUid {
    fn task_uid(&self) -> u64;
}

impl AsTaskUid for u64 {
    fn task_uid(&self) -> u64 {
        *self
    }
}

impl AsTaskUid for TaskInfo {
    fn task_uid(&self) -> u64 {
        self.task_uid
    }
}

impl AsTaskUid for Task {
    fn task_uid(&self) -> u64 {
        self.uid
    }
}

impl<T: AsTaskUid + ?Sized> AsTaskUid for &T {
    fn task_uid(&self) -> u64 {
        (**self).task_uid()
    }
}
