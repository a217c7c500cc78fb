// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::AuthUser;
use crate::database::reports;
use crate::error::AppResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use chrono::Utc;
use common::DashboardSummary;

/// GET /api/audit/dashboard/summary/
pub async fn summary(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DashboardSummary>> {
    let today = Utc::now().date_naive();
    let summary = reports::dashboard_summary(&state.pool, today).await?;
    Ok(Json(summary))
}
