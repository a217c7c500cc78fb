// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Bearer-token authentication.
//!
//! - [`jwt`]: issuing and validating access/refresh tokens.
//! - [`password`]: Argon2id hashing for stored credentials.
//! - [`AuthUser`]: the extractor every `/api/audit` handler takes.

pub mod jwt;
pub mod password;

use crate::database::users;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jwt::{TokenType, validate_token};

/// The caller identified by the `Authorization: Bearer <access token>` header.
///
/// Rejects with 401 when the header is missing or malformed, the token is
/// invalid, expired or a refresh token, or the user is gone or inactive.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided.".into())
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
        })?;

        let claims = validate_token(token.trim(), TokenType::Access, &state.config.jwt)
            .map_err(|e| {
                tracing::debug!("Rejected access token: {}", e);
                AppError::Unauthorized("Given token not valid for any token type".into())
            })?;

        let user = users::find_user_by_id(&state.pool, claims.user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
            email: user.email,
        })
    }
}
