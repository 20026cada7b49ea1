//! Data models
//!
//! Rust structs representing stored records.
//! All records use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// IDs
// =============================================================================

/// Generate a record ID (ULID, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
pub fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

// =============================================================================
// User
// =============================================================================

/// A registered user
///
/// `password_hash` is an argon2 PHC string and is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Task
// =============================================================================

/// Progress of a task
///
/// This is the only stored progress field; `completed` is derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Not Started")]
    #[sqlx(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    #[sqlx(rename = "Completed")]
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// How an update moves a task's status
///
/// Applied by the store inside the UPDATE, against the row's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusChange {
    /// Leave the status as stored
    #[default]
    Keep,
    /// Overwrite with this status
    Set(TaskStatus),
    /// Completed becomes In Progress; other states are left alone
    Reopen,
}

impl StatusChange {
    /// Resolve the `completed` / `status` pair of an update request.
    ///
    /// An explicit `status` wins and must agree with `completed` when both
    /// are given. `completed = true` means Completed. `completed = false`
    /// reopens a Completed task.
    ///
    /// # Errors
    /// Returns a message when `status` and `completed` contradict each other.
    pub fn from_request(
        completed: Option<bool>,
        status: Option<TaskStatus>,
    ) -> Result<Self, String> {
        match (status, completed) {
            (Some(status), Some(completed)) if status.is_completed() != completed => Err(format!(
                "status \"{}\" contradicts completed={}",
                status.as_str(),
                completed
            )),
            (Some(status), _) => Ok(Self::Set(status)),
            (None, Some(true)) => Ok(Self::Set(TaskStatus::Completed)),
            (None, Some(false)) => Ok(Self::Reopen),
            (None, None) => Ok(Self::Keep),
        }
    }

    /// Status to write, if this change names one outright
    pub fn target(&self) -> Option<TaskStatus> {
        match self {
            Self::Set(status) => Some(*status),
            Self::Keep | Self::Reopen => None,
        }
    }

    pub fn is_reopen(&self) -> bool {
        matches!(self, Self::Reopen)
    }
}

/// A task owned by a user
///
/// `user_id` is not checked against the users table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub thingstodo: String,
    pub due_date: String,
    pub status: TaskStatus,
    /// Set when the task enters Completed, cleared when it leaves
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Whether the write that returned this row moved the task into Completed.
    ///
    /// A write stamps `completed_at` and `updated_at` with the same instant
    /// only on that transition.
    pub fn completed_by_last_write(&self) -> bool {
        self.completed_at == Some(self.updated_at)
    }
}

/// Fields for a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub user_id: String,
    pub title: String,
    pub thingstodo: String,
    pub due_date: String,
}

/// Partial overwrite of a task; `None` leaves the stored value unchanged
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub thingstodo: Option<String>,
    pub due_date: Option<String>,
    pub status: StatusChange,
}
