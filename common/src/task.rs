// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::status::TaskStatus;
use crate::validation::{self, FieldErrors, REQUIRED, WriteMode, present};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct TaskFields {
    #[serde(rename = "project")]
    pub project_id: i64,
    pub name: String,
    pub description: String,
    #[serde(rename = "assignee")]
    pub assignee_id: Option<i64>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
}

impl TaskFields {
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(project_id) = changes.project_id {
            self.project_id = project_id;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(assignee) = changes.assignee_id {
            self.assignee_id = assignee;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
    }
}

/// A unit of audit work. Always belongs to one project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub fields: TaskFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Default)]
pub struct TaskInput {
    pub project: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub assignee: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub project_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<Option<i64>>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskInput {
    pub fn validate(self, mode: WriteMode) -> Result<TaskChanges, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.project.is_none() && mode.requires_all() {
            errors.add("project", REQUIRED);
        }
        let name = validation::required_text(&mut errors, "name", self.name, mode);
        let status = validation::non_null(&mut errors, "status", self.status);
        let status = match status.map(|raw| raw.parse::<TaskStatus>()) {
            Some(Ok(status)) => Some(status),
            Some(Err(e)) => {
                errors.add("status", e.to_string());
                None
            }
            None => None,
        };

        let description = validation::optional_text(&mut errors, "description", self.description);

        errors.into_result(TaskChanges {
            project_id: self.project,
            name,
            description,
            assignee_id: self.assignee,
            status,
            due_date: self.due_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_project_and_name() {
        let err = TaskInput::default().validate(WriteMode::Create).unwrap_err();
        assert!(err.contains("project"));
        assert!(err.contains("name"));

        let err = serde_json::from_str::<TaskInput>(r#"{"project": 1}"#)
            .unwrap()
            .validate(WriteMode::Create)
            .unwrap_err();
        assert!(!err.contains("project"));
        assert!(err.contains("name"));
    }

    #[test]
    fn test_create_with_defaults() {
        let changes: TaskChanges = serde_json::from_str::<TaskInput>(
            r#"{"project": 4, "name": "Review ledgers"}"#,
        )
        .unwrap()
        .validate(WriteMode::Create)
        .unwrap();

        let mut fields = TaskFields::default();
        fields.apply(changes);
        assert_eq!(fields.project_id, 4);
        assert_eq!(fields.status, TaskStatus::ToDo);
        assert_eq!(fields.description, "");
        assert_eq!(fields.due_date, None);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = serde_json::from_str::<TaskInput>(r#"{"status": "Cancelled"}"#)
            .unwrap()
            .validate(WriteMode::Partial)
            .unwrap_err();
        assert_eq!(
            err.get("status"),
            Some(&["\"Cancelled\" is not a valid choice.".to_string()][..])
        );
    }

    #[test]
    fn test_null_fields_are_rejected() {
        let err = serde_json::from_str::<TaskInput>(
            r#"{"project": 1, "name": "Walkthrough", "description": null, "status": null}"#,
        )
        .unwrap()
        .validate(WriteMode::Replace)
        .unwrap_err();
        assert_eq!(err.get("status"), Some(&[validation::NULL.to_string()][..]));
        assert_eq!(err.get("description"), Some(&[validation::NULL.to_string()][..]));
        assert!(!err.contains("name"));

        let err = serde_json::from_str::<TaskInput>(r#"{"name": null}"#)
            .unwrap()
            .validate(WriteMode::Partial)
            .unwrap_err();
        assert_eq!(err.get("name"), Some(&[validation::NULL.to_string()][..]));
    }

    #[test]
    fn test_task_json_uses_reference_names() {
        let task = Task {
            id: 2,
            fields: TaskFields {
                project_id: 1,
                name: "Walkthrough".into(),
                assignee_id: None,
                status: TaskStatus::Blocked,
                ..Default::default()
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["project"], 1);
        assert!(json["assignee"].is_null());
        assert_eq!(json["status"], "Blocked");
    }
}
