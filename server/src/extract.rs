// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Request extractors shared by the handlers.

use crate::error::AppError;
use crate::state::AppState;
use crate::storage::MediaStorage;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Path, Request};
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::request::Parts;
use axum::{Form, Json};
use common::DocumentInput;
use common::validation::{self, EMPTY_FILE, FieldErrors, REQUIRED};
use std::convert::Infallible;
use tracing::debug;

const NOT_A_FILE: &str = "The submitted data was not a file. Check the encoding type on the form.";

/// `scheme://host[:port]` of the current request, used to build absolute
/// file URLs. `None` when the request carries no host.
#[derive(Debug, Clone)]
pub struct RequestOrigin(pub Option<String>);

impl RequestOrigin {
    pub fn file_url(&self, storage: &MediaStorage, name: &str) -> Option<String> {
        self.0
            .as_deref()
            .map(|origin| storage.absolute_url(origin, name))
    }
}

impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let host = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()));
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .or_else(|| parts.uri.scheme_str())
            .unwrap_or("http")
            .to_string();

        Ok(RequestOrigin(host.map(|host| format!("{scheme}://{host}"))))
    }
}

/// Numeric record id from the `{id}` path segment. Anything that is not an
/// integer is answered with a JSON 404.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(IdPath(id))
    }
}

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// A document write request in any of the accepted encodings:
/// `multipart/form-data` (the only one that can carry a file),
/// `application/x-www-form-urlencoded`, or JSON.
///
/// Form fields arrive as text, so malformed ids are collected in `errors`
/// and reported together with the rest of the validation.
#[derive(Debug, Default)]
pub struct DocumentForm {
    pub input: DocumentInput,
    pub file: Option<UploadedFile>,
    pub errors: FieldErrors,
}

impl DocumentForm {
    /// True when a file part was sent, even an unusable one.
    pub fn has_file(&self) -> bool {
        self.file.is_some() || self.errors.contains("file")
    }

    fn set_text(&mut self, field: &str, value: String) {
        match field {
            "project" => match validation::parse_optional_id(&mut self.errors, "project", &value) {
                Some(Some(id)) => self.input.project = Some(id),
                Some(None) => self.errors.add("project", REQUIRED),
                None => {}
            },
            "task" => {
                if let Some(task) = validation::parse_optional_id(&mut self.errors, "task", &value)
                {
                    self.input.task = Some(task);
                }
            }
            "name" => self.input.name = Some(Some(value)),
            "description" => {
                let description = (!value.trim().is_empty()).then_some(value);
                self.input.description = Some(description);
            }
            "file" => self.errors.add("file", NOT_A_FILE),
            other => debug!("Ignoring form field '{}'", other),
        }
    }

    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = DocumentForm::default();
        for (field, value) in pairs {
            form.set_text(&field, value);
        }
        form
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = DocumentForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match (name.as_str(), field.file_name().map(str::to_string)) {
                ("file", Some(file_name)) => {
                    let data = field.bytes().await?;
                    if data.is_empty() {
                        form.errors.add("file", EMPTY_FILE);
                    } else {
                        form.file = Some(UploadedFile {
                            file_name,
                            data: data.to_vec(),
                        });
                    }
                }
                (_, Some(_)) => debug!("Ignoring file part '{}'", name),
                (_, None) => {
                    let text = field.text().await?;
                    form.set_text(&name, text);
                }
            }
        }
        Ok(form)
    }
}

impl FromRequest<AppState> for DocumentForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state).await?;
            Ok(Self::from_pairs(pairs))
        } else {
            let Json(input) = Json::<DocumentInput>::from_request(req, state).await?;
            Ok(DocumentForm {
                input,
                ..Default::default()
            })
        }
    }
}
