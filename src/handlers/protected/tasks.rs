// handlers/protected/tasks.rs - /api/tasks and /api/tasks/:id
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::api::{filter, paginate, PageRequest, ValidJson, Validator};
use crate::error::{ApiError, ErrorCode};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Task, TaskPriority, TaskStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub project_id: Option<String>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub project_id: Option<u64>,
    pub assigned_to: Option<u64>,
    pub due_date: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::not_found_with("Task not found", ErrorCode::TaskNotFound)
}

fn task_id(raw: &str) -> Result<u64, ApiError> {
    filter::path_id(raw, "Invalid task ID", ErrorCode::InvalidTaskId)
}

fn parse_status(raw: Option<&str>) -> Result<Option<TaskStatus>, ApiError> {
    filter::enum_param("status", raw, ErrorCode::InvalidStatus)
}

fn parse_priority(raw: Option<&str>) -> Result<Option<TaskPriority>, ApiError> {
    filter::enum_param("priority", raw, ErrorCode::InvalidPriority)
}

fn parse_due_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match filter::non_empty(raw) {
        None => Ok(None),
        Some(raw) => filter::parse_instant(raw)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(format!("Invalid dueDate: '{}'", raw), ErrorCode::InvalidDate)),
    }
}

/// GET /api/tasks
pub async fn list(State(state): State<AppState>, Query(query): Query<TaskQuery>) -> ApiResult<Vec<Task>> {
    let page = PageRequest::from_params(query.page.as_deref(), query.limit.as_deref(), &state.config.pagination);
    let status = parse_status(query.status.as_deref())?;
    let priority = parse_priority(query.priority.as_deref())?;
    let project_id = filter::id_param("projectId", query.project_id.as_deref(), ErrorCode::InvalidProjectId)?;
    let assigned_to = filter::id_param("assignedTo", query.assigned_to.as_deref(), ErrorCode::InvalidUserId)?;

    let tasks: Vec<Task> = state
        .tasks
        .all()
        .await?
        .into_iter()
        .filter(|t| status.map_or(true, |s| t.status == s))
        .filter(|t| priority.map_or(true, |p| t.priority == p))
        .filter(|t| project_id.map_or(true, |id| t.project_id == id))
        .filter(|t| assigned_to.map_or(true, |id| t.assigned_to == Some(id)))
        .collect();

    Ok(ApiResponse::page(paginate(tasks, page)).message("Tasks retrieved successfully"))
}

/// POST /api/tasks
pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<TaskRequest>,
) -> ApiResult<Task> {
    let mut v = Validator::new();
    let title = v.require_text("title", &body.title, "Title is required");
    let description = v.require_text("description", &body.description, "Description is required");
    let project_id = v.require("projectId", body.project_id, "projectId is required");

    let (Some(title), Some(description), Some(project_id)) = (title, description, project_id) else {
        return Err(v.into_error());
    };

    let status = parse_status(body.status.as_deref())?.unwrap_or(TaskStatus::Todo);
    let priority = parse_priority(body.priority.as_deref())?.unwrap_or(TaskPriority::Medium);
    let due_date = parse_due_date(body.due_date.as_deref())?;

    let task = Task {
        id: state.tasks.next_id(),
        title: title.to_string(),
        description: description.to_string(),
        status,
        priority,
        project_id,
        assigned_to: body.assigned_to,
        due_date,
        created_at: Utc::now(),
        updated_at: None,
    };
    let task = state.tasks.insert(task).await?;

    info!("Created task {} in project {}", task.id, task.project_id);
    Ok(ApiResponse::created(task).message("Task created successfully"))
}

/// GET /api/tasks/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Task> {
    let id = task_id(&id)?;
    let task = state.tasks.find(&id.to_string()).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(task).message("Task retrieved successfully"))
}

/// PUT /api/tasks/:id - full replacement; omitted assignedTo / dueDate are cleared
pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<TaskRequest>,
) -> ApiResult<Task> {
    let id = task_id(&id)?;
    let mut task = state.tasks.find(&id.to_string()).await?.ok_or_else(not_found)?;

    let mut v = Validator::new();
    let title = v.require_text("title", &body.title, "Title is required");
    let description = v.require_text("description", &body.description, "Description is required");
    let project_id = v.require("projectId", body.project_id, "projectId is required");
    let status = v.require_text("status", &body.status, "Status is required");
    let priority = v.require_text("priority", &body.priority, "Priority is required");

    let (Some(title), Some(description), Some(project_id), Some(status), Some(priority)) =
        (title, description, project_id, status, priority)
    else {
        return Err(v.into_error());
    };

    task.status = parse_status(Some(status))?.unwrap_or(task.status);
    task.priority = parse_priority(Some(priority))?.unwrap_or(task.priority);
    task.due_date = parse_due_date(body.due_date.as_deref())?;
    task.title = title.to_string();
    task.description = description.to_string();
    task.project_id = project_id;
    task.assigned_to = body.assigned_to;
    task.updated_at = Some(Utc::now());

    let task = state.tasks.replace(task).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(task).message("Task updated successfully"))
}

/// PATCH /api/tasks/:id
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<TaskRequest>,
) -> ApiResult<Task> {
    let id = task_id(&id)?;
    let mut task = state.tasks.find(&id.to_string()).await?.ok_or_else(not_found)?;

    if let Some(status) = parse_status(body.status.as_deref())? {
        task.status = status;
    }
    if let Some(priority) = parse_priority(body.priority.as_deref())? {
        task.priority = priority;
    }
    if let Some(due_date) = parse_due_date(body.due_date.as_deref())? {
        task.due_date = Some(due_date);
    }
    if let Some(title) = filter::non_empty(body.title.as_deref()) {
        task.title = title.to_string();
    }
    if let Some(description) = filter::non_empty(body.description.as_deref()) {
        task.description = description.to_string();
    }
    if let Some(project_id) = body.project_id {
        task.project_id = project_id;
    }
    if let Some(assigned_to) = body.assigned_to {
        task.assigned_to = Some(assigned_to);
    }
    task.updated_at = Some(Utc::now());

    let task = state.tasks.replace(task).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(task).message("Task updated successfully"))
}

/// DELETE /api/tasks/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Task> {
    let id = task_id(&id)?;
    let task = state.tasks.remove(&id.to_string()).await?.ok_or_else(not_found)?;
    info!("Deleted task {}", task.id);
    Ok(ApiResponse::success(task).message("Task deleted successfully"))
}
