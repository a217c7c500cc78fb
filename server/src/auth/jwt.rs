// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.

//! Access and refresh tokens.
//!
//! Both are HS256 JWTs carrying the user id. The `token_type` claim keeps a
//! refresh token from being accepted as an access token and the other way
//! round.

use crate::config::env_or;
use anyhow::{Result, bail};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 5;
const DEFAULT_REFRESH_EXPIRY_MINS: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub token_type: TokenType,
    pub user_id: i64,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is invalid or expired: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("token has wrong type")]
    WrongType,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_mins: i64,
}

impl JwtConfig {
    /// `JWT_SECRET` is required; `JWT_ACCESS_EXPIRY_MINS` defaults to 5 and
    /// `JWT_REFRESH_EXPIRY_MINS` to one day.
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must be set and not empty");
        }
        Ok(Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS)?,
            refresh_token_expiry_mins: env_or(
                "JWT_REFRESH_EXPIRY_MINS",
                DEFAULT_REFRESH_EXPIRY_MINS,
            )?,
        })
    }
}

fn issue(
    user_id: i64,
    token_type: TokenType,
    lifetime_mins: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        token_type,
        user_id,
        exp: now + lifetime_mins * 60,
        iat: now,
        jti: Uuid::new_v4().simple().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

pub fn issue_access_token(
    user_id: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue(user_id, TokenType::Access, config.access_token_expiry_mins, config)
}

pub fn issue_refresh_token(
    user_id: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue(user_id, TokenType::Refresh, config.refresh_token_expiry_mins, config)
}

/// Checks signature and expiry, then that the token is of the `expected` kind.
pub fn validate_token(
    token: &str,
    expected: TokenType,
    config: &JwtConfig,
) -> Result<Claims, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    if data.claims.token_type != expected {
        return Err(TokenError::WrongType);
    }
    Ok(data.claims)
}
