// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::AuthUser;
use crate::database::reports::{self, ProjectReportRow};
use crate::error::AppResult;
use crate::state::AppState;
use anyhow::anyhow;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use chrono::NaiveDate;
use tracing::info;

const HEADER: [&str; 8] = [
    "Project Name",
    "Project Manager",
    "Status",
    "Start Date",
    "End Date",
    "Description",
    "Scope",
    "Objectives",
];

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Renders the projects export. Quoting and CRLF line endings follow RFC 4180.
pub fn render_projects_csv(rows: &[ProjectReportRow]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record([
            row.name.as_str(),
            row.manager_username.as_deref().unwrap_or_default(),
            row.status.as_str(),
            date_cell(row.start_date).as_str(),
            date_cell(row.end_date).as_str(),
            row.description.as_str(),
            row.scope.as_str(),
            row.objectives.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e.error()))
}

/// GET /api/audit/reports/projects/csv/
pub async fn projects_csv(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = reports::projects_for_report(&state.pool).await?;
    let body = render_projects_csv(&rows)?;
    info!("Exported {} projects to CSV.", rows.len());

    Ok((
        [
            (CONTENT_TYPE, "text/csv"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"audit_projects_report.csv\"",
            ),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProjectStatus;

    fn row(name: &str) -> ProjectReportRow {
        ProjectReportRow {
            name: name.to_string(),
            manager_username: None,
            status: ProjectStatus::Pending,
            start_date: None,
            end_date: None,
            description: String::new(),
            scope: String::new(),
            objectives: String::new(),
        }
    }

    #[test]
    fn test_empty_report_is_header_only() {
        let csv = String::from_utf8(render_projects_csv(&[]).unwrap()).unwrap();
        assert_eq!(
            csv,
            "Project Name,Project Manager,Status,Start Date,End Date,Description,Scope,Objectives\r\n"
        );
    }

    #[test]
    fn test_rows_render_dates_and_quote_when_needed() {
        let rows = vec![
            ProjectReportRow {
                manager_username: Some("report_pm".into()),
                status: ProjectStatus::InProgress,
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
                end_date: NaiveDate::from_ymd_opt(2025, 12, 31),
                description: "Cash, banks and \"other\" accounts".into(),
                ..row("A")
            },
            row("B"),
        ];
        let csv = String::from_utf8(render_projects_csv(&rows).unwrap()).unwrap();
        assert!(csv.ends_with("B,,Pending,,,,,\r\n"));
        let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "A,report_pm,In Progress,2025-01-01,2025-12-31,\"Cash, banks and \"\"other\"\" accounts\",,"
        );
        assert_eq!(lines[2], "B,,Pending,,,,,");
    }
}
