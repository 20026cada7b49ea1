//! Task service
//!
//! CRUD for tasks scoped by owning user, plus the status rules that keep
//! `completed` and `status` in agreement.

use std::sync::Arc;

use crate::data::{Database, NewTask, StatusChange, Task, TaskChanges, TaskStatus};
use crate::error::AppError;
use crate::metrics::{TASKS_COMPLETED_TOTAL, TASKS_CREATED_TOTAL, TASKS_DELETED_TOTAL};

/// Requested changes to a task; `None` fields are left as they are
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub thingstodo: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
    pub status: Option<TaskStatus>,
}

/// Task service
pub struct TaskService {
    db: Arc<Database>,
}

impl TaskService {
    /// Create new task service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a task in the Not Started state.
    ///
    /// `user_id` is stored as given; the owner is not looked up.
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, AppError> {
        let task = self.db.insert_task(&new_task).await?;

        TASKS_CREATED_TOTAL.inc();
        tracing::info!(task_id = %task.id, user_id = %task.user_id, "Task created");
        Ok(task)
    }

    /// All tasks owned by `user_id`, oldest first
    pub async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, AppError> {
        self.db.list_tasks_for_user(user_id).await
    }

    /// Apply a partial update
    ///
    /// The status rules are resolved against the stored status by the store
    /// in the same write.
    ///
    /// # Errors
    /// - `NotFound` if no task has this ID
    /// - `Validation` if `status` and `completed` disagree
    pub async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Task, AppError> {
        let status = StatusChange::from_request(update.completed, update.status)
            .map_err(AppError::Validation)?;

        let changes = TaskChanges {
            title: update.title,
            thingstodo: update.thingstodo,
            due_date: update.due_date,
            status,
        };

        let task = self
            .db
            .update_task(task_id, &changes)
            .await?
            .ok_or(AppError::NotFound("Task"))?;

        if task.completed_by_last_write() {
            TASKS_COMPLETED_TOTAL.inc();
        }
        tracing::info!(task_id, status = task.status.as_str(), "Task updated");
        Ok(task)
    }

    /// Mark a task Completed, leaving its other fields alone
    ///
    /// Completing an already Completed task succeeds without counting a
    /// second completion.
    ///
    /// # Errors
    /// `NotFound` if no task has this ID
    pub async fn complete_task(&self, task_id: &str) -> Result<Task, AppError> {
        let task = self
            .db
            .complete_task(task_id)
            .await?
            .ok_or(AppError::NotFound("Task"))?;

        if task.completed_by_last_write() {
            TASKS_COMPLETED_TOTAL.inc();
            tracing::info!(task_id, "Task marked as completed");
        } else {
            tracing::debug!(task_id, "Task was already completed");
        }
        Ok(task)
    }

    /// Delete a task. Deleting an unknown ID is not an error.
    pub async fn delete_task(&self, task_id: &str) -> Result<(), AppError> {
        if self.db.delete_task(task_id).await? {
            TASKS_DELETED_TOTAL.inc();
            tracing::info!(task_id, "Task deleted");
        } else {
            tracing::debug!(task_id, "Delete of unknown task ignored");
        }
        Ok(())
    }
}
