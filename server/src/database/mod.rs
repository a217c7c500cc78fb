// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! SQLite store for users, projects, tasks and documents.
//!
//! Referential actions live in the schema: deleting a project cascades to its
//! tasks and documents, deleting a task cascades to its documents, and
//! deleting a user clears the manager/assignee/uploader columns pointing at it.

pub mod documents;
pub mod projects;
pub mod reports;
pub mod tasks;
pub mod users;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

const SCHEMA: [(&str, &str); 7] = [
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL DEFAULT '',
            password_hash TEXT NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            date_joined TIMESTAMP NOT NULL
        );
        "#,
    ),
    (
        "projects",
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            scope TEXT NOT NULL DEFAULT '',
            objectives TEXT NOT NULL DEFAULT '',
            project_manager_id INTEGER NULL REFERENCES users(id) ON DELETE SET NULL,
            status TEXT NOT NULL DEFAULT 'Pending'
                CHECK (status IN ('Pending', 'In Progress', 'Completed', 'Cancelled')),
            start_date DATE NULL,
            end_date DATE NULL,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        );
        "#,
    ),
    (
        "tasks",
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            assignee_id INTEGER NULL REFERENCES users(id) ON DELETE SET NULL,
            status TEXT NOT NULL DEFAULT 'To Do'
                CHECK (status IN ('To Do', 'In Progress', 'Completed', 'Blocked', 'In Review')),
            due_date DATE NULL,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        );
        "#,
    ),
    (
        "tasks_project_index",
        "CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks (project_id);",
    ),
    (
        "documents",
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            task_id INTEGER NULL REFERENCES tasks(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT NULL,
            file TEXT NOT NULL,
            uploaded_by_id INTEGER NULL REFERENCES users(id) ON DELETE SET NULL,
            uploaded_at TIMESTAMP NOT NULL
        );
        "#,
    ),
    (
        "documents_project_index",
        "CREATE INDEX IF NOT EXISTS idx_documents_project_id ON documents (project_id);",
    ),
    (
        "documents_task_index",
        "CREATE INDEX IF NOT EXISTS idx_documents_task_id ON documents (task_id);",
    ),
];

/// Establishes the database connection pool.
/// If the database file (or its directory) does not exist, it is created.
/// The schema is brought up to date before the pool is returned.
pub async fn establish_connection_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL: {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// A private in-memory database with the full schema.
///
/// Every connection to `:memory:` opens a distinct database, so the pool is
/// pinned to a single connection that is never recycled.
pub async fn in_memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("Failed to open in-memory database")?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Creates any missing table or index.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for (name, statement) in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create '{name}'"))?;
    }
    info!("Database schema is ready.");
    Ok(())
}

/// Returns true when a row with `id` exists in `table`.
pub(crate) async fn row_exists(pool: &SqlitePool, table: &'static str, id: i64) -> Result<bool> {
    let query = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
    let exists: bool = sqlx::query_scalar(&query)
        .bind(id)
        .fetch_one(pool)
        .await
        .with_context(|| format!("Failed to look up {table} {id}"))?;
    Ok(exists)
}
