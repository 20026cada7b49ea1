//! SQLite database operations
//!
//! All store access goes through this module. Every operation is bounded by
//! the configured query timeout and recorded in the database metrics.

use std::future::Future;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use super::models::*;
use crate::error::AppError;

/// Pool sizing and time bounds for [`Database::connect`]
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub max_connections: u32,
    pub query_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            query_timeout: Duration::from_secs(10),
        }
    }
}

/// Database connection pool wrapper.
///
/// Acquired once at startup and shared by every request through `AppState`.
pub struct Database {
    pool: Pool<Sqlite>,
    query_timeout: Duration,
}

fn is_unique_violation(error: &AppError) -> bool {
    matches!(
        error,
        AppError::Database(sqlx::Error::Database(db_error)) if db_error.is_unique_violation()
    )
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    /// * `options` - Pool size and query timeout
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path, options: ConnectOptions) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
            }
        }

        let connect_options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.query_timeout)
            .connect_with(connect_options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Migration(e.to_string())
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self {
            pool,
            query_timeout: options.query_timeout,
        })
    }

    /// Close the pool, waiting for checked-out connections to be returned
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Run one store operation under the query timeout and record it.
    pub(super) async fn run<T, F>(
        &self,
        operation: &str,
        table: &str,
        query: F,
    ) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let started = Instant::now();
        let result = tokio::time::timeout(self.query_timeout, query).await;
        let (outcome, result) = match result {
            Ok(Ok(value)) => ("ok", Ok(value)),
            Ok(Err(error)) => ("error", Err(AppError::Database(error))),
            Err(_) => {
                tracing::warn!(
                    operation,
                    table,
                    timeout_secs = self.query_timeout.as_secs_f64(),
                    "Store operation timed out"
                );
                ("timeout", Err(AppError::StoreTimeout))
            }
        };
        crate::metrics::observe_db_query(operation, table, outcome, started.elapsed());
        result
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Find a user by exact email match
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.run(
            "select",
            "users",
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool),
        )
        .await
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.run(
            "select",
            "users",
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    /// Insert a new user
    ///
    /// # Errors
    /// `DuplicateEmail` if the email is already taken.
    pub async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let now = Utc::now();
        let user = User {
            id: new_id(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.run(
            "insert",
            "users",
            sqlx::query(
                r#"
                INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool),
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateEmail
            } else {
                e
            }
        })?;

        Ok(user)
    }

    /// Overwrite a user's name and email.
    ///
    /// # Returns
    /// `true` if updated, `false` if no matching user exists.
    ///
    /// # Errors
    /// `DuplicateEmail` if another user already has `email`.
    pub async fn update_user_profile(
        &self,
        id: &str,
        name: &str,
        email: &str,
    ) -> Result<bool, AppError> {
        let result = self
            .run(
                "update",
                "users",
                sqlx::query("UPDATE users SET name = ?, email = ?, updated_at = ? WHERE id = ?")
                    .bind(name)
                    .bind(email)
                    .bind(Utc::now())
                    .bind(id)
                    .execute(&self.pool),
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::DuplicateEmail
                } else {
                    e
                }
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Count registered users
    pub async fn count_users(&self) -> Result<i64, AppError> {
        self.run(
            "count",
            "users",
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool),
        )
        .await
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Insert a new task in the Not Started state
    pub async fn insert_task(&self, new_task: &NewTask) -> Result<Task, AppError> {
        let now = Utc::now();
        let task = Task {
            id: new_id(),
            user_id: new_task.user_id.clone(),
            title: new_task.title.clone(),
            thingstodo: new_task.thingstodo.clone(),
            due_date: new_task.due_date.clone(),
            status: TaskStatus::default(),
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        self.run(
            "insert",
            "tasks",
            sqlx::query(
                r#"
                INSERT INTO tasks (
                    id, user_id, title, thingstodo, due_date, status, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&task.id)
            .bind(&task.user_id)
            .bind(&task.title)
            .bind(&task.thingstodo)
            .bind(&task.due_date)
            .bind(task.status)
            .bind(task.created_at)
            .bind(task.updated_at)
            .execute(&self.pool),
        )
        .await?;

        Ok(task)
    }

    /// Get a task by ID
    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        self.run(
            "select",
            "tasks",
            sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    /// All tasks owned by `user_id`, oldest first
    pub async fn list_tasks_for_user(&self, user_id: &str) -> Result<Vec<Task>, AppError> {
        self.run(
            "select",
            "tasks",
            sqlx::query_as::<_, Task>(
                "SELECT * FROM tasks WHERE user_id = ? ORDER BY created_at ASC, id ASC",
            )
            .bind(user_id)
            .fetch_all(&self.pool),
        )
        .await
    }

    /// Apply a partial update in one statement.
    ///
    /// The status change is resolved against the stored status inside the
    /// UPDATE. `completed_at` is stamped with the same instant as
    /// `updated_at` only when the task enters Completed, kept while it stays
    /// Completed, and cleared when it leaves.
    ///
    /// # Returns
    /// The updated task, or `None` if no task has this ID.
    pub async fn update_task(
        &self,
        id: &str,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let target = changes.status.target();
        let reopen = changes.status.is_reopen();
        let now = Utc::now();

        self.run(
            "update",
            "tasks",
            sqlx::query_as::<_, Task>(
                r#"
                UPDATE tasks
                SET title = COALESCE(?, title),
                    thingstodo = COALESCE(?, thingstodo),
                    due_date = COALESCE(?, due_date),
                    status = COALESCE(
                        ?,
                        CASE WHEN ? AND status = 'Completed' THEN 'In Progress' ELSE status END
                    ),
                    completed_at = CASE
                        WHEN ? = 'Completed' THEN
                            CASE WHEN status = 'Completed' THEN completed_at ELSE ? END
                        WHEN ? IS NOT NULL OR ? THEN NULL
                        ELSE completed_at
                    END,
                    updated_at = ?
                WHERE id = ?
                RETURNING *
                "#,
            )
            .bind(changes.title.as_deref())
            .bind(changes.thingstodo.as_deref())
            .bind(changes.due_date.as_deref())
            .bind(target)
            .bind(reopen)
            .bind(target)
            .bind(now)
            .bind(target)
            .bind(reopen)
            .bind(now)
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    /// Mark a task Completed.
    ///
    /// # Returns
    /// The updated task, or `None` if no task has this ID.
    pub async fn complete_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        self.update_task(
            id,
            &TaskChanges {
                status: StatusChange::Set(TaskStatus::Completed),
                ..TaskChanges::default()
            },
        )
        .await
    }

    /// Delete a task
    ///
    /// # Returns
    /// `true` if a task was removed.
    pub async fn delete_task(&self, id: &str) -> Result<bool, AppError> {
        let result = self
            .run(
                "delete",
                "tasks",
                sqlx::query("DELETE FROM tasks WHERE id = ?")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
