// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::AuthUser;
use crate::database::{documents, projects, tasks};
use crate::error::{AppError, AppResult};
use crate::extract::{DocumentForm, IdPath, RequestOrigin, UploadedFile};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use common::validation::{NO_FILE, invalid_reference};
use common::{Document, DocumentChanges, DocumentFields, FieldErrors, WriteMode};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct DocumentFilter {
    pub project: Option<i64>,
    pub task: Option<i64>,
}

fn with_url(mut document: Document, origin: &RequestOrigin, state: &AppState) -> Document {
    document.file_url = origin.file_url(&state.storage, &document.file);
    document
}

async fn check_references(state: &AppState, fields: &DocumentFields) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if !projects::project_exists(&state.pool, fields.project_id).await? {
        errors.add("project", invalid_reference(fields.project_id));
    }
    if let Some(task_id) = fields.task_id {
        if !tasks::task_exists(&state.pool, task_id).await? {
            errors.add("task", invalid_reference(task_id));
        }
    }
    Ok(errors.into_result(())?)
}

/// Validates `form` against `mode`, returning the field changes and the new
/// file if one was sent.
fn validate(
    form: DocumentForm,
    mode: WriteMode,
) -> AppResult<(DocumentChanges, Option<UploadedFile>)> {
    let has_file = form.has_file();
    let DocumentForm {
        input,
        file,
        errors,
    } = form;
    let changes = input.validate(mode, has_file, errors)?;
    Ok((changes, file))
}

/// GET /api/audit/documents/[?project=<id>][&task=<id>]
pub async fn list_documents(
    _user: AuthUser,
    State(state): State<AppState>,
    origin: RequestOrigin,
    filter: Result<Query<DocumentFilter>, QueryRejection>,
) -> AppResult<Json<Vec<Document>>> {
    let Query(filter) = filter?;
    let documents = documents::list_documents(&state.pool, filter.project, filter.task).await?;
    info!("Successfully retrieved {} documents.", documents.len());
    Ok(Json(
        documents
            .into_iter()
            .map(|d| with_url(d, &origin, &state))
            .collect(),
    ))
}

/// POST /api/audit/documents/
///
/// The uploader is always the caller, whatever the request says.
pub async fn create_document(
    user: AuthUser,
    State(state): State<AppState>,
    origin: RequestOrigin,
    form: DocumentForm,
) -> AppResult<(StatusCode, Json<Document>)> {
    debug!("Received document upload from '{}'", user.username);

    let (changes, file) = validate(form, WriteMode::Create)?;
    let mut fields = DocumentFields::default();
    fields.apply(changes);
    check_references(&state, &fields).await?;

    let Some(upload) = file else {
        let mut errors = FieldErrors::new();
        errors.add("file", NO_FILE);
        return Err(errors.into());
    };

    let stored = state.storage.save(&upload.file_name, &upload.data).await?;
    let document =
        match documents::create_document(&state.pool, &fields, &stored, Some(user.user_id)).await {
            Ok(document) => document,
            Err(e) => {
                state.storage.delete_all(&[stored]).await;
                return Err(e.into());
            }
        };

    Ok((StatusCode::CREATED, Json(with_url(document, &origin, &state))))
}

/// GET /api/audit/documents/{id}/
pub async fn get_document(
    _user: AuthUser,
    State(state): State<AppState>,
    origin: RequestOrigin,
    IdPath(document_id): IdPath,
) -> AppResult<Json<Document>> {
    let document = documents::get_document(&state.pool, document_id)
        .await?
        .ok_or_else(|| AppError::not_found("Document", document_id))?;
    Ok(Json(with_url(document, &origin, &state)))
}

/// Applies an update. A new file replaces the stored one, which is removed
/// once the record points at its successor.
async fn update(
    state: &AppState,
    document_id: i64,
    form: DocumentForm,
    mode: WriteMode,
) -> AppResult<Document> {
    let existing = documents::get_document(&state.pool, document_id)
        .await?
        .ok_or_else(|| AppError::not_found("Document", document_id))?;

    let (changes, file) = validate(form, mode)?;
    let mut fields = existing.fields;
    fields.apply(changes);
    check_references(state, &fields).await?;

    let Some(upload) = file else {
        return documents::update_document(&state.pool, document_id, &fields, &existing.file)
            .await?
            .ok_or_else(|| AppError::not_found("Document", document_id));
    };

    let stored = state.storage.save(&upload.file_name, &upload.data).await?;
    match documents::update_document(&state.pool, document_id, &fields, &stored).await {
        Ok(Some(document)) => {
            state.storage.delete_all(&[existing.file]).await;
            Ok(document)
        }
        Ok(None) => {
            state.storage.delete_all(&[stored]).await;
            Err(AppError::not_found("Document", document_id))
        }
        Err(e) => {
            state.storage.delete_all(&[stored]).await;
            Err(e.into())
        }
    }
}

/// PUT /api/audit/documents/{id}/
pub async fn replace_document(
    _user: AuthUser,
    State(state): State<AppState>,
    origin: RequestOrigin,
    IdPath(document_id): IdPath,
    form: DocumentForm,
) -> AppResult<Json<Document>> {
    let document = update(&state, document_id, form, WriteMode::Replace).await?;
    Ok(Json(with_url(document, &origin, &state)))
}

/// PATCH /api/audit/documents/{id}/
pub async fn patch_document(
    _user: AuthUser,
    State(state): State<AppState>,
    origin: RequestOrigin,
    IdPath(document_id): IdPath,
    form: DocumentForm,
) -> AppResult<Json<Document>> {
    let document = update(&state, document_id, form, WriteMode::Partial).await?;
    Ok(Json(with_url(document, &origin, &state)))
}

/// DELETE /api/audit/documents/{id}/
pub async fn delete_document(
    _user: AuthUser,
    State(state): State<AppState>,
    IdPath(document_id): IdPath,
) -> AppResult<StatusCode> {
    let file = documents::delete_document(&state.pool, document_id)
        .await?
        .ok_or_else(|| AppError::not_found("Document", document_id))?;

    state.storage.delete_all(&[file]).await;
    info!("Document with ID {} deleted successfully.", document_id);
    Ok(StatusCode::NO_CONTENT)
}
