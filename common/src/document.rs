// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::validation::{self, FieldErrors, NO_FILE, REQUIRED, WriteMode, present};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct DocumentFields {
    #[serde(rename = "project")]
    pub project_id: i64,
    #[serde(rename = "task")]
    pub task_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
}

impl DocumentFields {
    pub fn apply(&mut self, changes: DocumentChanges) {
        if let Some(project_id) = changes.project_id {
            self.project_id = project_id;
        }
        if let Some(task_id) = changes.task_id {
            self.task_id = task_id;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
    }
}

/// A file uploaded in support of a project (and optionally one of its tasks).
///
/// `file` is the path relative to the media root. `file_url` is not stored; the
/// server fills it in from the request's host before responding.
/// `uploaded_by_username` comes from a join on the users table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Document {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: DocumentFields,
    pub file: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(rename = "uploaded_by")]
    pub uploaded_by_id: Option<i64>,
    pub uploaded_by_username: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Text part of a document create or update request.
///
/// `uploaded_by` and `uploaded_at` are deliberately absent: the uploader is
/// always the authenticated caller.
#[derive(Deserialize, Debug, Default)]
pub struct DocumentInput {
    pub project: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub task: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentChanges {
    pub project_id: Option<i64>,
    pub task_id: Option<Option<i64>>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

impl DocumentInput {
    /// Validates the text fields together with the presence of a file part.
    ///
    /// `errors` carries any failures already found while decoding form fields.
    pub fn validate(
        self,
        mode: WriteMode,
        has_file: bool,
        mut errors: FieldErrors,
    ) -> Result<DocumentChanges, FieldErrors> {
        if self.project.is_none() && mode.requires_all() && !errors.contains("project") {
            errors.add("project", REQUIRED);
        }
        let name = validation::required_text(&mut errors, "name", self.name, mode);
        if !has_file && mode.requires_all() {
            errors.add("file", NO_FILE);
        }

        errors.into_result(DocumentChanges {
            project_id: self.project,
            task_id: self.task,
            name,
            description: self
                .description
                .map(|d| d.map(|text| text.trim().to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_without_file_is_rejected() {
        let input = DocumentInput {
            project: Some(1),
            name: Some(Some("Doc no file".into())),
            ..Default::default()
        };
        let err = input
            .validate(WriteMode::Create, false, FieldErrors::new())
            .unwrap_err();
        assert_eq!(err.get("file"), Some(&[NO_FILE.to_string()][..]));
        assert!(!err.contains("name"));
    }

    #[test]
    fn test_partial_update_without_file_is_fine() {
        let input = DocumentInput {
            description: Some(None),
            ..Default::default()
        };
        let changes = input
            .validate(WriteMode::Partial, false, FieldErrors::new())
            .unwrap();
        assert_eq!(changes.description, Some(None));
    }

    #[test]
    fn test_decode_errors_are_kept() {
        let mut decode_errors = FieldErrors::new();
        decode_errors.add("project", validation::INVALID_INTEGER);
        let err = DocumentInput {
            name: Some(Some("Evidence".into())),
            ..Default::default()
        }
        .validate(WriteMode::Create, true, decode_errors)
        .unwrap_err();
        assert_eq!(
            err.get("project"),
            Some(&[validation::INVALID_INTEGER.to_string()][..])
        );
    }

    #[test]
    fn test_uploader_in_payload_is_ignored() {
        let input: DocumentInput = serde_json::from_str(
            r#"{"project": 1, "name": "n", "uploaded_by": 99, "uploaded_at": "x"}"#,
        )
        .unwrap();
        assert_eq!(input.project, Some(1));
    }
}
