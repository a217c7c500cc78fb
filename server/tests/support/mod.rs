// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt; // For `collect`
use serde_json::Value;
use server::auth::jwt::{self, JwtConfig};
use server::auth::password::hash_password;
use server::config::ServerConfig;
use server::database::{self, users};
use server::routes::create_router;
use server::state::AppState;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt; // For `oneshot`

pub const TEST_USERNAME: &str = "testuser";
pub const TEST_PASSWORD: &str = "testpassword123";
pub const BOUNDARY: &str = "audit-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub config: ServerConfig,
    pub user_id: i64,
    pub token: String,
    // Dropped last: removes the media root.
    media_dir: TempDir,
}

pub fn test_config(media_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database_url: "sqlite::memory:".into(),
        media_root,
        media_url: "/media/".into(),
        cors_origins: Vec::new(),
        max_upload_bytes: 1024 * 1024,
        jwt: JwtConfig {
            secret: "integration-test-secret-that-is-long-enough".into(),
            access_token_expiry_mins: 5,
            refresh_token_expiry_mins: 60,
        },
    }
}

/// Fresh in-memory database, temporary media root and one active user with a
/// valid access token.
pub async fn spawn_app() -> TestApp {
    let pool = database::in_memory_pool().await.unwrap();
    let media_dir = tempfile::tempdir().unwrap();
    let config = test_config(media_dir.path().to_path_buf());

    let hash = hash_password(TEST_PASSWORD).unwrap();
    let user = users::create_user(&pool, TEST_USERNAME, "testuser@example.com", &hash)
        .await
        .unwrap();
    let token = jwt::issue_access_token(user.id, &config.jwt).unwrap();

    let router = create_router(AppState::new(pool.clone(), config.clone()));
    TestApp {
        router,
        pool,
        config,
        user_id: user.id,
        token,
        media_dir,
    }
}

impl TestApp {
    pub fn media_root(&self) -> PathBuf {
        self.media_dir.path().to_path_buf()
    }

    pub fn stored_path(&self, name: &str) -> PathBuf {
        name.split('/')
            .fold(self.media_root(), |path, part| path.join(part))
    }

    /// Starts a request carrying the test user's token and a `Host` header.
    pub fn authed(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Host", "testserver")
            .header("Authorization", format!("Bearer {}", self.token))
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(self.authed("GET", uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(self.authed("DELETE", uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn send_json(&self, method: &str, uri: &str, payload: Value) -> (StatusCode, Value) {
        let request = self
            .authed(method, uri)
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn send_multipart(
        &self,
        method: &str,
        uri: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        let request = self
            .authed(method, uri)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields, file)))
            .unwrap();
        self.send(request).await
    }

    pub async fn create_project(&self, name: &str) -> Value {
        let (status, body) = self
            .send_json(
                "POST",
                "/api/audit/projects/",
                serde_json::json!({ "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    pub async fn create_task(&self, project_id: i64, name: &str) -> Value {
        let (status, body) = self
            .send_json(
                "POST",
                "/api/audit/tasks/",
                serde_json::json!({ "project": project_id, "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    pub async fn upload_document(
        &self,
        project_id: i64,
        task_id: Option<i64>,
        name: &str,
        file_name: &str,
    ) -> Value {
        let project = project_id.to_string();
        let task = task_id.map(|t| t.to_string()).unwrap_or_default();
        let (status, body) = self
            .send_multipart(
                "POST",
                "/api/audit/documents/",
                &[("project", &project), ("task", &task), ("name", name)],
                Some((file_name, b"file_content")),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

/// Builds a `multipart/form-data` body delimited by [`BOUNDARY`].
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
