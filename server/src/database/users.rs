// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

/// An account that can obtain tokens. Never serialized: it carries the hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let date_joined = Utc::now();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password_hash, is_active, date_joined) VALUES (?, ?, ?, 1, ?) RETURNING *",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(date_joined)
    .fetch_one(pool)
    .await
    .with_context(|| format!("Failed to create user '{username}'"))?;

    info!("Created user '{}' with ID: {}", user.username, user.id);
    Ok(user)
}

pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to load user {user_id}"))
}

pub async fn find_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to load user '{username}'"))
}

pub async fn user_exists(pool: &SqlitePool, user_id: i64) -> Result<bool> {
    super::row_exists(pool, "users", user_id).await
}

/// Deletes a user. Projects, tasks and documents referring to them stay, with
/// the reference cleared by the schema's `ON DELETE SET NULL`.
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to delete user {user_id}"))?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        info!("Deleted user {}", user_id);
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::setup_test_db;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let pool = setup_test_db().await;
        let user = create_user(&pool, "testuser", "testuser@example.com", "hash")
            .await
            .unwrap();
        assert!(user.id > 0);
        assert!(user.is_active);

        let by_name = find_user_by_username(&pool, "testuser").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_name.email, "testuser@example.com");
        assert!(find_user_by_id(&pool, user.id + 1).await.unwrap().is_none());
        assert!(user_exists(&pool, user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_usernames_are_unique() {
        let pool = setup_test_db().await;
        create_user(&pool, "dup", "", "hash").await.unwrap();
        assert!(create_user(&pool, "dup", "", "hash").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let pool = setup_test_db().await;
        let user = create_user(&pool, "gone", "", "hash").await.unwrap();
        assert!(delete_user(&pool, user.id).await.unwrap());
        assert!(!delete_user(&pool, user.id).await.unwrap());
        assert!(!user_exists(&pool, user.id).await.unwrap());
    }
}
