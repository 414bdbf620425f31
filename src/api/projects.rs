//! Project and pinshot API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{ActiveProject, CreatePinshotRequest, CreateProjectRequest, Pinshot, Project};
use crate::AppState;

/// GET /api/projects - List all projects.
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    let projects = state.repo.list_projects().await?;
    success(projects)
}

/// GET /api/projects/{id} - Get a full project snapshot.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    match state.repo.get_project(&id).await? {
        Some(project) => success(project),
        None => Err(AppError::NotFound(format!("Project {} not found", id))),
    }
}

/// POST /api/projects - Create a new project; it becomes active.
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<Project> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Project name is required".to_string()));
    }

    let project = state.repo.create_project(request.name.trim()).await?;
    success(project)
}

/// DELETE /api/projects/{id} - Delete a project.
///
/// Deleting the last remaining project is rejected.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_project(&id).await?;
    success(())
}

/// GET /api/projects/active - Get the active project marker.
pub async fn get_active_project(State(state): State<AppState>) -> ApiResult<ActiveProject> {
    let project_id = state.repo.active_project_id().await?;
    success(ActiveProject { project_id })
}

/// POST /api/projects/{id}/activate - Mark a project as active.
pub async fn activate_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ActiveProject> {
    state.repo.set_active_project(&id).await?;
    success(ActiveProject { project_id: id })
}

/// POST /api/projects/{id}/pinshots - Append a screenshot to a project.
pub async fn create_pinshot(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CreatePinshotRequest>,
) -> ApiResult<Pinshot> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Pinshot name is required".to_string(),
        ));
    }

    let pinshot = state
        .repo
        .add_pinshot(&id, request.name.trim(), request.image.as_deref())
        .await?;
    success(pinshot)
}
