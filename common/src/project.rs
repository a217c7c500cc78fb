// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::status::ProjectStatus;
use crate::validation::{self, FieldErrors, WriteMode, present};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The client-writable columns of a project.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct ProjectFields {
    pub name: String,
    pub description: String,
    pub scope: String,
    pub objectives: String,
    #[serde(rename = "project_manager")]
    pub project_manager_id: Option<i64>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ProjectFields {
    /// Overwrites every field the changes carry.
    pub fn apply(&mut self, changes: ProjectChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(scope) = changes.scope {
            self.scope = scope;
        }
        if let Some(objectives) = changes.objectives {
            self.objectives = objectives;
        }
        if let Some(manager) = changes.project_manager_id {
            self.project_manager_id = manager;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(start_date) = changes.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            self.end_date = end_date;
        }
    }
}

/// An audit project as stored and as returned by the API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: ProjectFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a project create or update request.
///
/// `created_at`/`updated_at` are not part of it, so client values for them are
/// dropped during deserialization.
#[derive(Deserialize, Debug, Default)]
pub struct ProjectInput {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub scope: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub objectives: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub project_manager: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present")]
    pub end_date: Option<Option<NaiveDate>>,
}

/// Validated project changes. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub scope: Option<String>,
    pub objectives: Option<String>,
    pub project_manager_id: Option<Option<i64>>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
}

impl ProjectInput {
    /// Checks the payload shape. References to users and name uniqueness need
    /// the database and are checked by the server.
    pub fn validate(self, mode: WriteMode) -> Result<ProjectChanges, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = validation::required_text(&mut errors, "name", self.name, mode);
        let status = match validation::non_null(&mut errors, "status", self.status) {
            Some(raw) => match raw.parse::<ProjectStatus>() {
                Ok(status) => Some(status),
                Err(e) => {
                    errors.add("status", e.to_string());
                    None
                }
            },
            None => None,
        };

        let changes = ProjectChanges {
            name,
            description: validation::optional_text(&mut errors, "description", self.description),
            scope: validation::optional_text(&mut errors, "scope", self.scope),
            objectives: validation::optional_text(&mut errors, "objectives", self.objectives),
            project_manager_id: self.project_manager,
            status,
            start_date: self.start_date,
            end_date: self.end_date,
        };
        errors.into_result(changes)
    }
}
