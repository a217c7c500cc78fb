// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::Utc;
use common::{Document, DocumentFields};
use sqlx::SqlitePool;
use tracing::{debug, info};

const SELECT_DOCUMENT: &str = "SELECT d.id, d.project_id, d.task_id, d.name, d.description, d.file, \
     d.uploaded_by_id, u.username AS uploaded_by_username, d.uploaded_at \
     FROM documents d LEFT JOIN users u ON u.id = d.uploaded_by_id";

/// Documents newest first, optionally narrowed to a project and/or a task.
pub async fn list_documents(
    pool: &SqlitePool,
    project_id: Option<i64>,
    task_id: Option<i64>,
) -> Result<Vec<Document>> {
    let query = format!(
        "{SELECT_DOCUMENT} WHERE (?1 IS NULL OR d.project_id = ?1) AND (?2 IS NULL OR d.task_id = ?2) \
         ORDER BY d.uploaded_at DESC, d.id DESC"
    );
    sqlx::query_as::<_, Document>(&query)
        .bind(project_id)
        .bind(task_id)
        .fetch_all(pool)
        .await
        .context("Failed to retrieve documents from DB")
}

pub async fn get_document(pool: &SqlitePool, document_id: i64) -> Result<Option<Document>> {
    let query = format!("{SELECT_DOCUMENT} WHERE d.id = ?");
    sqlx::query_as::<_, Document>(&query)
        .bind(document_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to retrieve document {document_id}"))
}

/// Records an already stored file. `file` is its name relative to the media root.
pub async fn create_document(
    pool: &SqlitePool,
    fields: &DocumentFields,
    file: &str,
    uploaded_by: Option<i64>,
) -> Result<Document> {
    debug!(
        "Insert values: project_id={}, task_id={:?}, name={}, file={}",
        fields.project_id, fields.task_id, fields.name, file
    );

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO documents (project_id, task_id, name, description, file, uploaded_by_id, uploaded_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(fields.project_id)
    .bind(fields.task_id)
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(file)
    .bind(uploaded_by)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .context("Failed to insert document into DB")?;

    info!("Document created with ID: {}", id);
    get_document(pool, id)
        .await?
        .with_context(|| format!("Document {id} vanished after insert"))
}

/// Rewrites the descriptive fields and the stored file name.
/// `uploaded_by` and `uploaded_at` never change.
pub async fn update_document(
    pool: &SqlitePool,
    document_id: i64,
    fields: &DocumentFields,
    file: &str,
) -> Result<Option<Document>> {
    let result = sqlx::query(
        "UPDATE documents SET project_id = ?, task_id = ?, name = ?, description = ?, file = ? WHERE id = ?",
    )
    .bind(fields.project_id)
    .bind(fields.task_id)
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(file)
    .bind(document_id)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to update document {document_id}"))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    info!("Document {} updated", document_id);
    get_document(pool, document_id).await
}

/// Deletes the record and returns the stored file name it pointed at.
pub async fn delete_document(pool: &SqlitePool, document_id: i64) -> Result<Option<String>> {
    let file: Option<String> =
        sqlx::query_scalar("DELETE FROM documents WHERE id = ? RETURNING file")
            .bind(document_id)
            .fetch_optional(pool)
            .await
            .with_context(|| format!("Failed to delete document {document_id}"))?;

    if file.is_some() {
        info!("Deleted document {}", document_id);
    }
    Ok(file)
}
