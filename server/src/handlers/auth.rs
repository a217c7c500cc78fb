// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::AuthUser;
use crate::auth::jwt::{self, TokenType};
use crate::auth::password::verify_password;
use crate::database::users;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use anyhow::Context;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use common::{AccessToken, HelloResponse, RefreshRequest, TokenPair, TokenRequest};
use tracing::{debug, info};

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

/// POST /api/token/
pub async fn obtain_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> AppResult<Json<TokenPair>> {
    let Json(request) = payload?;
    debug!("Token requested for '{}'", request.username);

    let user = users::find_user_by_username(&state.pool, &request.username)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| AppError::Unauthorized(BAD_CREDENTIALS.into()))?;

    let valid = verify_password(&request.password, &user.password_hash).unwrap_or_else(|e| {
        tracing::warn!("Unusable password hash for user {}: {}", user.id, e);
        false
    });
    if !valid {
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    let jwt = &state.config.jwt;
    let pair = TokenPair {
        refresh: jwt::issue_refresh_token(user.id, jwt).context("Failed to issue refresh token")?,
        access: jwt::issue_access_token(user.id, jwt).context("Failed to issue access token")?,
    };
    info!("Issued tokens for '{}'", user.username);
    Ok(Json(pair))
}

/// POST /api/token/refresh/
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> AppResult<Json<AccessToken>> {
    let Json(request) = payload?;
    let jwt = &state.config.jwt;

    let claims = jwt::validate_token(&request.refresh, TokenType::Refresh, jwt).map_err(|e| {
        debug!("Rejected refresh token: {}", e);
        AppError::Unauthorized("Token is invalid or expired".into())
    })?;

    // A refresh token outlives the account it was issued to.
    users::find_user_by_id(&state.pool, claims.user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    let access = jwt::issue_access_token(claims.user_id, jwt).context("Failed to issue access token")?;
    Ok(Json(AccessToken { access }))
}

/// GET /api/audit/hello/
pub async fn hello(user: AuthUser) -> Json<HelloResponse> {
    Json(HelloResponse {
        message: format!("Hello, {}! You are authenticated.", user.username),
        user_id: user.user_id,
        user_email: user.email,
    })
}
