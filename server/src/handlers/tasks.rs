// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use super::check_user;
use crate::auth::AuthUser;
use crate::database::{projects, tasks};
use crate::error::{AppError, AppResult};
use crate::extract::IdPath;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use common::validation::invalid_reference;
use common::{FieldErrors, Task, TaskFields, TaskInput, WriteMode};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct TaskFilter {
    pub project: Option<i64>,
}

async fn check_references(state: &AppState, fields: &TaskFields) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if !projects::project_exists(&state.pool, fields.project_id).await? {
        errors.add("project", invalid_reference(fields.project_id));
    }
    check_user(&state.pool, &mut errors, "assignee", fields.assignee_id).await?;
    Ok(errors.into_result(())?)
}

/// GET /api/audit/tasks/[?project=<id>]
pub async fn list_tasks(
    _user: AuthUser,
    State(state): State<AppState>,
    filter: Result<Query<TaskFilter>, QueryRejection>,
) -> AppResult<Json<Vec<Task>>> {
    let Query(filter) = filter?;
    let tasks = tasks::list_tasks(&state.pool, filter.project).await?;
    info!("Successfully retrieved {} tasks.", tasks.len());
    Ok(Json(tasks))
}

/// POST /api/audit/tasks/
pub async fn create_task(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let Json(input) = payload?;
    debug!("Received request from '{}' to create a task", user.username);

    let mut fields = TaskFields::default();
    fields.apply(input.validate(WriteMode::Create)?);
    check_references(&state, &fields).await?;

    let task = tasks::create_task(&state.pool, &fields).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/audit/tasks/{id}/
pub async fn get_task(
    _user: AuthUser,
    State(state): State<AppState>,
    IdPath(task_id): IdPath,
) -> AppResult<Json<Task>> {
    let task = tasks::get_task(&state.pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", task_id))?;
    Ok(Json(task))
}

async fn update(state: &AppState, task_id: i64, input: TaskInput, mode: WriteMode) -> AppResult<Task> {
    let mut fields = tasks::get_task(&state.pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", task_id))?
        .fields;

    fields.apply(input.validate(mode)?);
    check_references(state, &fields).await?;

    tasks::update_task(&state.pool, task_id, &fields)
        .await?
        .ok_or_else(|| AppError::not_found("Task", task_id))
}

/// PUT /api/audit/tasks/{id}/
pub async fn replace_task(
    _user: AuthUser,
    State(state): State<AppState>,
    IdPath(task_id): IdPath,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> AppResult<Json<Task>> {
    let Json(input) = payload?;
    Ok(Json(update(&state, task_id, input, WriteMode::Replace).await?))
}

/// PATCH /api/audit/tasks/{id}/
pub async fn patch_task(
    _user: AuthUser,
    State(state): State<AppState>,
    IdPath(task_id): IdPath,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> AppResult<Json<Task>> {
    let Json(input) = payload?;
    Ok(Json(update(&state, task_id, input, WriteMode::Partial).await?))
}

/// DELETE /api/audit/tasks/{id}/
pub async fn delete_task(
    _user: AuthUser,
    State(state): State<AppState>,
    IdPath(task_id): IdPath,
) -> AppResult<StatusCode> {
    let files = tasks::delete_task(&state.pool, task_id)
        .await?
        .ok_or_else(|| AppError::not_found("Task", task_id))?;

    state.storage.delete_all(&files).await;
    info!("Task with ID {} deleted successfully.", task_id);
    Ok(StatusCode::NO_CONTENT)
}
