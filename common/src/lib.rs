// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Wire and domain types shared by the audit tracker server and its clients.
//!
//! Records (`Project`, `Task`, `Document`) derive `sqlx::FromRow` so the server
//! can load them straight from the database, and `Serialize`/`Deserialize` so
//! they travel as JSON unchanged. Client payloads use separate `*Input` types
//! whose `validate` methods produce the per-field error map returned on a
//! bad request.

pub mod auth;
pub mod dashboard;
pub mod document;
pub mod project;
pub mod status;
pub mod task;
pub mod validation;

pub use auth::{AccessToken, HelloResponse, RefreshRequest, TokenPair, TokenRequest};
pub use dashboard::{DashboardSummary, StatusCount};
pub use document::{Document, DocumentChanges, DocumentFields, DocumentInput};
pub use project::{Project, ProjectChanges, ProjectFields, ProjectInput};
pub use status::{ProjectStatus, TaskStatus, UnknownStatus};
pub use task::{Task, TaskChanges, TaskFields, TaskInput};
pub use validation::{FieldErrors, WriteMode};
