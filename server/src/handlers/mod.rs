// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! HTTP handlers. Everything under `/api/audit` takes an [`AuthUser`](crate::auth::AuthUser).

pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod projects;
pub mod reports;
pub mod tasks;

use crate::database::users;
use common::FieldErrors;
use common::validation::invalid_reference;
use sqlx::SqlitePool;

/// Records an error on `field` when `user_id` names no existing user.
async fn check_user(
    pool: &SqlitePool,
    errors: &mut FieldErrors,
    field: &str,
    user_id: Option<i64>,
) -> anyhow::Result<()> {
    if let Some(id) = user_id {
        if !users::user_exists(pool, id).await? {
            errors.add(field, invalid_reference(id));
        }
    }
    Ok(())
}
