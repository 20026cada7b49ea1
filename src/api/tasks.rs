//! Task endpoints

use axum::extract::{Path, State};
use axum::response::Json;

use super::dto::{
    CreateTaskRequest, ListTasksQuery, MessageResponse, TaskCompletedResponse, TaskListResponse,
    TaskResponse, TaskResponseEnvelope, UpdateTaskRequest,
};
use super::extract::{ApiJson, ApiQuery};
use crate::AppState;
use crate::data::NewTask;
use crate::error::AppError;
use crate::service::TaskUpdate;

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<Json<TaskResponseEnvelope>, AppError> {
    let task = state
        .tasks
        .create_task(NewTask {
            user_id: req.user_id,
            title: req.title,
            thingstodo: req.thingstodo,
            due_date: req.due_date,
        })
        .await?;

    Ok(Json(TaskResponseEnvelope {
        success: true,
        message: "Task added successfully".to_string(),
        task: task.into(),
    }))
}

/// GET /api/tasks?userId=
pub async fn list_tasks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListTasksQuery>,
) -> Result<Json<TaskListResponse>, AppError> {
    let tasks = state.tasks.list_tasks(&query.user_id).await?;

    Ok(Json(TaskListResponse {
        success: true,
        tasks: tasks.into_iter().map(TaskResponse::from).collect(),
    }))
}

/// PUT /api/tasks/:task_id
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponseEnvelope>, AppError> {
    let task = state
        .tasks
        .update_task(
            &task_id,
            TaskUpdate {
                title: req.title,
                thingstodo: req.thingstodo,
                due_date: req.due_date,
                completed: req.completed,
                status: req.status,
            },
        )
        .await?;

    Ok(Json(TaskResponseEnvelope {
        success: true,
        message: "Task updated successfully".to_string(),
        task: task.into(),
    }))
}

/// PUT /api/tasks/:task_id/completed
pub async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskCompletedResponse>, AppError> {
    let task = state.tasks.complete_task(&task_id).await?;

    Ok(Json(TaskCompletedResponse {
        success: true,
        message: "Task marked as completed".to_string(),
        updated_task: task.into(),
    }))
}

/// DELETE /api/tasks/:task_id
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.tasks.delete_task(&task_id).await?;

    Ok(Json(MessageResponse::ok("Task deleted successfully")))
}
