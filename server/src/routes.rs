// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::AuthUser;
use crate::handlers::{auth, dashboard, documents, projects, reports, tasks};
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Creates and configures the application router.
pub fn create_router(state: AppState) -> Router {
    let audit = Router::new()
        .route(
            "/projects/",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{id}/",
            get(projects::get_project)
                .put(projects::replace_project)
                .patch(projects::patch_project)
                .delete(projects::delete_project),
        )
        .route("/tasks/", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}/",
            get(tasks::get_task)
                .put(tasks::replace_task)
                .patch(tasks::patch_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/documents/",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/documents/{id}/",
            get(documents::get_document)
                .put(documents::replace_document)
                .patch(documents::patch_document)
                .delete(documents::delete_document),
        )
        .route("/dashboard/summary/", get(dashboard::summary))
        .route("/reports/projects/csv/", get(reports::projects_csv))
        .route("/hello/", get(auth::hello))
        // Uploads can exceed axum's 2 MB default.
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        // Also wraps the 405 fallbacks: no token is a 401 whatever the method.
        .layer(middleware::from_extractor_with_state::<AuthUser, AppState>(
            state.clone(),
        ));

    let media_prefix = state.config.media_url.trim_end_matches('/').to_string();

    Router::new()
        .route("/api/token/", post(auth::obtain_token))
        .route("/api/token/refresh/", post(auth::refresh_token))
        .nest("/api/audit", audit)
        .nest_service(&media_prefix, ServeDir::new(state.storage.root()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
