// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use serde::{Deserialize, Serialize};

/// Body of `POST /api/token/`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/token/refresh/`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccessToken {
    pub access: String,
}

/// Body of `GET /api/audit/hello/`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HelloResponse {
    pub message: String,
    pub user_id: i64,
    pub user_email: String,
}
