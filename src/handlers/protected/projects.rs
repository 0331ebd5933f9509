// handlers/protected/projects.rs - /api/projects and /api/projects/:id
use axum::extract::{Path, Query, State};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::api::{filter, paginate, PageRequest, ValidJson, Validator};
use crate::error::{ApiError, ErrorCode};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Project, ProjectStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<u64>,
}

fn not_found() -> ApiError {
    ApiError::not_found_with("Project not found", ErrorCode::ProjectNotFound)
}

fn project_id(raw: &str) -> Result<u64, ApiError> {
    filter::path_id(raw, "Invalid project ID", ErrorCode::InvalidProjectId)
}

fn parse_status(raw: Option<&str>) -> Result<Option<ProjectStatus>, ApiError> {
    filter::enum_param("status", raw, ErrorCode::InvalidStatus)
}

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<Vec<Project>> {
    let page = PageRequest::from_params(query.page.as_deref(), query.limit.as_deref(), &state.config.pagination);
    let status = parse_status(query.status.as_deref())?;
    let user_id = filter::id_param("userId", query.user_id.as_deref(), ErrorCode::InvalidUserId)?;

    let projects: Vec<Project> = state
        .projects
        .all()
        .await?
        .into_iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .filter(|p| user_id.map_or(true, |id| p.user_id == id))
        .collect();

    Ok(ApiResponse::page(paginate(projects, page)).message("Projects retrieved successfully"))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<ProjectRequest>,
) -> ApiResult<Project> {
    let mut v = Validator::new();
    let name = v.require_text("name", &body.name, "Name is required");
    let description = v.require_text("description", &body.description, "Description is required");
    let user_id = v.require("userId", body.user_id, "userId is required");

    let (Some(name), Some(description), Some(user_id)) = (name, description, user_id) else {
        return Err(v.into_error());
    };
    let status = parse_status(body.status.as_deref())?.unwrap_or(ProjectStatus::Planning);

    let project = Project {
        id: state.projects.next_id(),
        name: name.to_string(),
        description: description.to_string(),
        status,
        user_id,
        created_at: Utc::now(),
        updated_at: None,
    };
    let project = state.projects.insert(project).await?;

    info!("Created project {} '{}'", project.id, project.name);
    Ok(ApiResponse::created(project).message("Project created successfully"))
}

/// GET /api/projects/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Project> {
    let id = project_id(&id)?;
    let project = state.projects.find(&id.to_string()).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(project).message("Project retrieved successfully"))
}

/// PUT /api/projects/:id - full replacement of the editable fields
pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<ProjectRequest>,
) -> ApiResult<Project> {
    let id = project_id(&id)?;
    let mut project = state.projects.find(&id.to_string()).await?.ok_or_else(not_found)?;

    let mut v = Validator::new();
    let name = v.require_text("name", &body.name, "Name is required");
    let description = v.require_text("description", &body.description, "Description is required");
    let user_id = v.require("userId", body.user_id, "userId is required");
    let status = v.require_text("status", &body.status, "Status is required");

    let (Some(name), Some(description), Some(user_id), Some(status)) = (name, description, user_id, status)
    else {
        return Err(v.into_error());
    };

    project.status = parse_status(Some(status))?.unwrap_or(project.status);
    project.name = name.to_string();
    project.description = description.to_string();
    project.user_id = user_id;
    project.updated_at = Some(Utc::now());

    let project = state.projects.replace(project).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(project).message("Project updated successfully"))
}

/// PATCH /api/projects/:id
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<ProjectRequest>,
) -> ApiResult<Project> {
    let id = project_id(&id)?;
    let mut project = state.projects.find(&id.to_string()).await?.ok_or_else(not_found)?;

    if let Some(status) = parse_status(body.status.as_deref())? {
        project.status = status;
    }
    if let Some(name) = filter::non_empty(body.name.as_deref()) {
        project.name = name.to_string();
    }
    if let Some(description) = filter::non_empty(body.description.as_deref()) {
        project.description = description.to_string();
    }
    if let Some(user_id) = body.user_id {
        project.user_id = user_id;
    }
    project.updated_at = Some(Utc::now());

    let project = state.projects.replace(project).await?.ok_or_else(not_found)?;
    Ok(ApiResponse::success(project).message("Project updated successfully"))
}

/// DELETE /api/projects/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Project> {
    let id = project_id(&id)?;
    let project = state.projects.remove(&id.to_string()).await?.ok_or_else(not_found)?;
    info!("Deleted project {}", project.id);
    Ok(ApiResponse::success(project).message("Project deleted successfully"))
}
