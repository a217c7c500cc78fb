// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use super::check_user;
use crate::auth::AuthUser;
use crate::database::projects;
use crate::error::{AppError, AppResult};
use crate::extract::IdPath;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use common::{FieldErrors, Project, ProjectFields, ProjectInput, WriteMode};
use tracing::{debug, info};

const NAME_TAKEN: &str = "project with this name already exists.";

/// Checks what the payload alone cannot: a unique name and an existing manager.
async fn check_references(
    state: &AppState,
    fields: &ProjectFields,
    project_id: Option<i64>,
) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if projects::name_taken(&state.pool, &fields.name, project_id).await? {
        errors.add("name", NAME_TAKEN);
    }
    check_user(
        &state.pool,
        &mut errors,
        "project_manager",
        fields.project_manager_id,
    )
    .await?;
    Ok(errors.into_result(())?)
}

/// GET /api/audit/projects/
pub async fn list_projects(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Project>>> {
    let projects = projects::list_projects(&state.pool).await?;
    info!("Successfully retrieved {} projects.", projects.len());
    Ok(Json(projects))
}

/// POST /api/audit/projects/
pub async fn create_project(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let Json(input) = payload?;
    debug!("Received request from '{}' to create a project", user.username);

    let mut fields = ProjectFields::default();
    fields.apply(input.validate(WriteMode::Create)?);
    check_references(&state, &fields, None).await?;

    let project = projects::create_project(&state.pool, &fields).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/audit/projects/{id}/
pub async fn get_project(
    _user: AuthUser,
    State(state): State<AppState>,
    IdPath(project_id): IdPath,
) -> AppResult<Json<Project>> {
    let project = projects::get_project(&state.pool, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", project_id))?;
    Ok(Json(project))
}

async fn update(
    state: &AppState,
    project_id: i64,
    input: ProjectInput,
    mode: WriteMode,
) -> AppResult<Project> {
    let mut fields = projects::get_project(&state.pool, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", project_id))?
        .fields;

    fields.apply(input.validate(mode)?);
    check_references(state, &fields, Some(project_id)).await?;

    projects::update_project(&state.pool, project_id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found("Project", project_id))
}

/// PUT /api/audit/projects/{id}/
pub async fn replace_project(
    _user: AuthUser,
    State(state): State<AppState>,
    IdPath(project_id): IdPath,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> AppResult<Json<Project>> {
    let Json(input) = payload?;
    Ok(Json(update(&state, project_id, input, WriteMode::Replace).await?))
}

/// PATCH /api/audit/projects/{id}/
pub async fn patch_project(
    _user: AuthUser,
    State(state): State<AppState>,
    IdPath(project_id): IdPath,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> AppResult<Json<Project>> {
    let Json(input) = payload?;
    Ok(Json(update(&state, project_id, input, WriteMode::Partial).await?))
}

/// DELETE /api/audit/projects/{id}/
///
/// Takes the project's tasks and documents with it, stored files included.
pub async fn delete_project(
    _user: AuthUser,
    State(state): State<AppState>,
    IdPath(project_id): IdPath,
) -> AppResult<StatusCode> {
    let files = projects::delete_project(&state.pool, project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", project_id))?;

    state.storage.delete_all(&files).await;
    info!("Project with ID {} deleted successfully.", project_id);
    Ok(StatusCode::NO_CONTENT)
}
