// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::Utc;
use common::{Project, ProjectFields};
use sqlx::SqlitePool;
use tracing::{debug, info};

const PROJECT_COLUMNS: &str = "id, name, description, scope, objectives, project_manager_id, status, start_date, end_date, created_at, updated_at";

/// All projects, newest first.
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<Project>> {
    let query =
        format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
    sqlx::query_as::<_, Project>(&query)
        .fetch_all(pool)
        .await
        .context("Failed to retrieve projects from DB")
}

pub async fn get_project(pool: &SqlitePool, project_id: i64) -> Result<Option<Project>> {
    let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?");
    sqlx::query_as::<_, Project>(&query)
        .bind(project_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to retrieve project {project_id}"))
}

pub async fn create_project(pool: &SqlitePool, fields: &ProjectFields) -> Result<Project> {
    let now = Utc::now();
    debug!("Insert values: name={}, status={}", fields.name, fields.status);

    let query = format!(
        "INSERT INTO projects (name, description, scope, objectives, project_manager_id, status, start_date, end_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {PROJECT_COLUMNS}"
    );
    let project = sqlx::query_as::<_, Project>(&query)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.scope)
        .bind(&fields.objectives)
        .bind(fields.project_manager_id)
        .bind(fields.status)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("Failed to insert project into DB")?;

    info!("Project created with ID: {}", project.id);
    Ok(project)
}

/// Writes every field of `fields` and bumps `updated_at`.
/// Returns `None` when no project has this id.
pub async fn update_project(
    pool: &SqlitePool,
    project_id: i64,
    fields: &ProjectFields,
) -> Result<Option<Project>> {
    let query = format!(
        "UPDATE projects SET name = ?, description = ?, scope = ?, objectives = ?, project_manager_id = ?, \
         status = ?, start_date = ?, end_date = ?, updated_at = ? WHERE id = ? RETURNING {PROJECT_COLUMNS}"
    );
    let project = sqlx::query_as::<_, Project>(&query)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.scope)
        .bind(&fields.objectives)
        .bind(fields.project_manager_id)
        .bind(fields.status)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(Utc::now())
        .bind(project_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to update project {project_id}"))?;

    if project.is_some() {
        info!("Project {} updated", project_id);
    }
    Ok(project)
}

/// Deletes a project together with its tasks and documents.
///
/// Returns the stored file names of every document removed by the cascade
/// (including documents of other projects attached to one of these tasks),
/// or `None` when no project has this id.
pub async fn delete_project(pool: &SqlitePool, project_id: i64) -> Result<Option<Vec<String>>> {
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let files: Vec<String> = sqlx::query_scalar(
        "SELECT file FROM documents WHERE project_id = ?1 \
         OR task_id IN (SELECT id FROM tasks WHERE project_id = ?1)",
    )
    .bind(project_id)
    .fetch_all(&mut *tx)
    .await
    .with_context(|| format!("Failed to collect documents of project {project_id}"))?;

    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(project_id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to delete project {project_id}"))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    tx.commit().await.context("Failed to commit project deletion")?;
    info!(
        "Deleted project {} and {} attached documents",
        project_id,
        files.len()
    );
    Ok(Some(files))
}

pub async fn project_exists(pool: &SqlitePool, project_id: i64) -> Result<bool> {
    super::row_exists(pool, "projects", project_id).await
}

/// True when another project (not `exclude_id`) already uses `name`.
pub async fn name_taken(pool: &SqlitePool, name: &str, exclude_id: Option<i64>) -> Result<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM projects WHERE name = ? AND (? IS NULL OR id != ?))",
    )
    .bind(name)
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_one(pool)
    .await
    .context("Failed to check project name")?;
    Ok(taken)
}
