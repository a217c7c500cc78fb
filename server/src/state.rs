// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::config::ServerConfig;
use crate::storage::MediaStorage;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared state handed to every handler through `State<AppState>`.
///
/// Cheap to clone: the pool is reference counted, the rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<ServerConfig>,
    pub storage: Arc<MediaStorage>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: ServerConfig) -> Self {
        let storage = MediaStorage::new(config.media_root.clone(), config.media_url.clone());
        Self {
            pool,
            config: Arc::new(config),
            storage: Arc::new(storage),
        }
    }
}
