// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use serde::{Deserialize, Serialize};

/// Number of records holding one status value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Body of `GET /api/audit/dashboard/summary/`.
///
/// Statuses nobody holds are omitted from the summaries, not zero-filled.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub project_status_summary: Vec<StatusCount>,
    pub task_status_summary: Vec<StatusCount>,
    pub overdue_tasks_count: i64,
}
