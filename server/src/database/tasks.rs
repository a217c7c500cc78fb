// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::Utc;
use common::{Task, TaskFields};
use sqlx::SqlitePool;
use tracing::{debug, info};

const TASK_COLUMNS: &str =
    "id, project_id, name, description, assignee_id, status, due_date, created_at, updated_at";

/// Tasks ordered by project name, then creation time.
/// With `project_id`, only that project's tasks.
pub async fn list_tasks(pool: &SqlitePool, project_id: Option<i64>) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT t.id, t.project_id, t.name, t.description, t.assignee_id, t.status, t.due_date, t.created_at, t.updated_at \
         FROM tasks t JOIN projects p ON p.id = t.project_id \
         WHERE (?1 IS NULL OR t.project_id = ?1) \
         ORDER BY p.name ASC, t.created_at ASC, t.id ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("Failed to retrieve tasks from DB")?;

    Ok(tasks)
}

pub async fn get_task(pool: &SqlitePool, task_id: i64) -> Result<Option<Task>> {
    let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?");
    sqlx::query_as::<_, Task>(&query)
        .bind(task_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to retrieve task {task_id}"))
}

pub async fn create_task(pool: &SqlitePool, fields: &TaskFields) -> Result<Task> {
    let now = Utc::now();
    debug!(
        "Insert values: project_id={}, name={}, status={}, due_date={:?}",
        fields.project_id, fields.name, fields.status, fields.due_date
    );

    let query = format!(
        "INSERT INTO tasks (project_id, name, description, assignee_id, status, due_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {TASK_COLUMNS}"
    );
    let task = sqlx::query_as::<_, Task>(&query)
        .bind(fields.project_id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.assignee_id)
        .bind(fields.status)
        .bind(fields.due_date)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("Failed to insert task into DB")?;

    info!("Task created successfully with ID: {}", task.id);
    Ok(task)
}

pub async fn update_task(
    pool: &SqlitePool,
    task_id: i64,
    fields: &TaskFields,
) -> Result<Option<Task>> {
    let query = format!(
        "UPDATE tasks SET project_id = ?, name = ?, description = ?, assignee_id = ?, status = ?, due_date = ?, updated_at = ? \
         WHERE id = ? RETURNING {TASK_COLUMNS}"
    );
    let task = sqlx::query_as::<_, Task>(&query)
        .bind(fields.project_id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.assignee_id)
        .bind(fields.status)
        .bind(fields.due_date)
        .bind(Utc::now())
        .bind(task_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to update task {task_id}"))?;

    if task.is_some() {
        info!("Task {} updated", task_id);
    }
    Ok(task)
}

/// Deletes a task and the documents attached to it.
/// Returns the stored file names of those documents, or `None` if the task
/// does not exist.
pub async fn delete_task(pool: &SqlitePool, task_id: i64) -> Result<Option<Vec<String>>> {
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let files: Vec<String> = sqlx::query_scalar("SELECT file FROM documents WHERE task_id = ?")
        .bind(task_id)
        .fetch_all(&mut *tx)
        .await
        .with_context(|| format!("Failed to collect documents of task {task_id}"))?;

    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task_id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to delete task {task_id}"))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    tx.commit().await.context("Failed to commit task deletion")?;
    info!("Deleted task {} and {} attached documents", task_id, files.len());
    Ok(Some(files))
}

pub async fn task_exists(pool: &SqlitePool, task_id: i64) -> Result<bool> {
    super::row_exists(pool, "tasks", task_id).await
}
