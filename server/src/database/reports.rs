// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::NaiveDate;
use common::{DashboardSummary, ProjectStatus, StatusCount};
use sqlx::SqlitePool;

/// One line of the projects export, with the manager resolved to a username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectReportRow {
    pub name: String,
    pub manager_username: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: String,
    pub scope: String,
    pub objectives: String,
}

pub async fn project_status_counts(pool: &SqlitePool) -> Result<Vec<StatusCount>> {
    sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM projects GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await
    .context("Failed to count projects by status")
}

pub async fn task_status_counts(pool: &SqlitePool) -> Result<Vec<StatusCount>> {
    sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM tasks GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await
    .context("Failed to count tasks by status")
}

/// Tasks due strictly before `today` that are not completed.
pub async fn overdue_task_count(pool: &SqlitePool, today: NaiveDate) -> Result<i64> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM tasks WHERE due_date IS NOT NULL AND due_date < ? AND status != 'Completed'",
    )
    .bind(today)
    .fetch_one(pool)
    .await
    .context("Failed to count overdue tasks")
}

pub async fn dashboard_summary(pool: &SqlitePool, today: NaiveDate) -> Result<DashboardSummary> {
    Ok(DashboardSummary {
        project_status_summary: project_status_counts(pool).await?,
        task_status_summary: task_status_counts(pool).await?,
        overdue_tasks_count: overdue_task_count(pool, today).await?,
    })
}

/// Every project ordered by name.
pub async fn projects_for_report(pool: &SqlitePool) -> Result<Vec<ProjectReportRow>> {
    sqlx::query_as::<_, ProjectReportRow>(
        "SELECT p.name, u.username AS manager_username, p.status, p.start_date, p.end_date, \
         p.description, p.scope, p.objectives \
         FROM projects p LEFT JOIN users u ON u.id = p.project_manager_id \
         ORDER BY p.name ASC",
    )
    .fetch_all(pool)
    .await
    .context("Failed to load projects for report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::{create_test_user, setup_test_db};
    use crate::database::{projects, tasks};
    use chrono::Duration;
    use common::{ProjectFields, TaskFields, TaskStatus};

    async fn project(pool: &SqlitePool, name: &str, status: ProjectStatus) -> i64 {
        projects::create_project(
            pool,
            &ProjectFields {
                name: name.into(),
                status,
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
    }

    fn count(status: &str, count: i64) -> StatusCount {
        StatusCount {
            status: status.into(),
            count,
        }
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let pool = setup_test_db().await;
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let summary = dashboard_summary(&pool, today).await.unwrap();
        assert_eq!(summary, DashboardSummary::default());
    }

    #[tokio::test]
    async fn test_project_counts_omit_absent_statuses() {
        let pool = setup_test_db().await;
        project(&pool, "P1", ProjectStatus::Pending).await;
        project(&pool, "P2", ProjectStatus::InProgress).await;
        project(&pool, "P3", ProjectStatus::InProgress).await;
        project(&pool, "P4", ProjectStatus::Completed).await;

        let counts = project_status_counts(&pool).await.unwrap();
        assert_eq!(
            counts,
            vec![count("Completed", 1), count("In Progress", 2), count("Pending", 1)]
        );
    }

    #[tokio::test]
    async fn test_overdue_excludes_only_completed() {
        let pool = setup_test_db().await;
        let project_id = project(&pool, "P", ProjectStatus::Pending).await;
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let yesterday = today - Duration::days(1);

        for (name, status, due) in [
            ("late", TaskStatus::ToDo, Some(yesterday)),
            ("late but done", TaskStatus::Completed, Some(yesterday)),
            ("late and blocked", TaskStatus::Blocked, Some(yesterday)),
            ("due today", TaskStatus::ToDo, Some(today)),
            ("no due date", TaskStatus::ToDo, None),
        ] {
            tasks::create_task(
                &pool,
                &TaskFields {
                    project_id,
                    name: name.into(),
                    status,
                    due_date: due,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(overdue_task_count(&pool, today).await.unwrap(), 2);
        let summary = dashboard_summary(&pool, today).await.unwrap();
        assert_eq!(
            summary.task_status_summary,
            vec![count("Blocked", 1), count("Completed", 1), count("To Do", 3)]
        );
    }

    #[tokio::test]
    async fn test_report_rows_ordered_by_name_with_manager() {
        let pool = setup_test_db().await;
        let manager = create_test_user(&pool, "report_pm").await;
        projects::create_project(
            &pool,
            &ProjectFields {
                name: "B".into(),
                project_manager_id: Some(manager.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        project(&pool, "A", ProjectStatus::Completed).await;

        let rows = projects_for_report(&pool).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "A");
        assert_eq!(rows[0].manager_username, None);
        assert_eq!(rows[1].name, "B");
        assert_eq!(rows[1].manager_username.as_deref(), Some("report_pm"));
    }
}
