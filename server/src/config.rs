// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::auth::jwt::JwtConfig;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_DB_URL: &str = "sqlite://database/sqlite.db";
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_MEDIA_URL: &str = "/media/";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// | Env Var            | Default                       |
/// |--------------------|-------------------------------|
/// | `HOST`             | `0.0.0.0`                     |
/// | `PORT`             | `3000`                        |
/// | `DATABASE_URL`     | `sqlite://database/sqlite.db` |
/// | `MEDIA_ROOT`       | `media`                       |
/// | `MEDIA_URL`        | `/media/`                     |
/// | `CORS_ORIGINS`     | any origin                    |
/// | `MAX_UPLOAD_BYTES` | 25 MiB                        |
///
/// JWT settings are read by [`JwtConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Directory uploaded documents are written under.
    pub media_root: PathBuf,
    /// URL prefix stored files are served from. Always starts and ends with `/`.
    pub media_url: String,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env_or("PORT", 3000u16)?;
        let database_url = database_url();
        let media_root = PathBuf::from(
            std::env::var("MEDIA_ROOT").unwrap_or_else(|_| DEFAULT_MEDIA_ROOT.into()),
        );
        let media_url = normalize_media_url(
            &std::env::var("MEDIA_URL").unwrap_or_else(|_| DEFAULT_MEDIA_URL.into()),
        )?;
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let max_upload_bytes = env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let jwt = JwtConfig::from_env()?;

        Ok(Self {
            host,
            port,
            database_url,
            media_root,
            media_url,
            cors_origins,
            max_upload_bytes,
            jwt,
        })
    }
}

/// `DATABASE_URL`, or the default SQLite file. The user-management commands
/// need only this, not the full server configuration.
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DB_URL.into())
}

/// Reads and parses `key`, falling back to `default` when it is unset.
pub(crate) fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Makes the media prefix look like `/prefix/`. The root itself is refused
/// because it would shadow the API routes.
pub fn normalize_media_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        bail!("MEDIA_URL must not be the site root");
    }
    Ok(format!("/{trimmed}/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_media_url() {
        assert_eq!(normalize_media_url("media").unwrap(), "/media/");
        assert_eq!(normalize_media_url("/files/uploads").unwrap(), "/files/uploads/");
        assert_eq!(normalize_media_url("/media/").unwrap(), "/media/");
        assert!(normalize_media_url("/").is_err());
    }
}
