// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Sub-directory of the media root that uploaded documents go under.
const UPLOAD_PREFIX: &str = "project_documents";
const FALLBACK_FILE_NAME: &str = "upload";
const SUFFIX_LEN: usize = 7;

/// Uploaded files on the local disk, addressed by a `/`-separated name
/// relative to `root` (e.g. `project_documents/2026/10/17/report.pdf`).
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    media_url: String,
}

impl MediaStorage {
    pub fn new(root: PathBuf, media_url: String) -> Self {
        Self { root, media_url }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `data` under today's upload directory and returns the stored name.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String> {
        self.save_on(Utc::now().date_naive(), original_name, data).await
    }

    /// Writes `data` under the upload directory for `date`.
    ///
    /// An existing file is never overwritten: on a clash a random suffix is
    /// added to the file stem until the name is free.
    pub async fn save_on(&self, date: NaiveDate, original_name: &str, data: &[u8]) -> Result<String> {
        let dir = upload_dir(date);
        let file_name = sanitize_file_name(original_name);

        tokio::fs::create_dir_all(self.root.join(&dir))
            .await
            .with_context(|| format!("Failed to create upload directory {dir}"))?;

        let mut candidate = format!("{dir}/{file_name}");
        loop {
            let path = self.path(&candidate);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(data)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    file.flush().await?;
                    info!("Stored {} bytes as {}", data.len(), candidate);
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} already exists, picking another name", candidate);
                    candidate = format!("{dir}/{}", with_random_suffix(&file_name));
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", path.display()));
                }
            }
        }
    }

    /// Removes a stored file. A file that is already gone is not an error.
    pub async fn delete(&self, name: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(name)).await {
            Ok(()) => {
                info!("Removed stored file {}", name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Stored file {} was already missing", name);
                Ok(())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to remove stored file {name}")),
        }
    }

    /// Removes files left behind by a deleted record.
    ///
    /// The database row is already gone at this point, so failures are
    /// logged rather than returned.
    pub async fn delete_all(&self, names: &[String]) {
        for name in names {
            if let Err(e) = self.delete(name).await {
                warn!("Could not remove {}: {:?}", name, e);
            }
        }
    }

    pub async fn exists(&self, name: &str) -> bool {
        tokio::fs::try_exists(self.path(name)).await.unwrap_or(false)
    }

    pub fn path(&self, name: &str) -> PathBuf {
        name.split('/')
            .filter(|part| !part.is_empty() && *part != "..")
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    /// URL path the file is served under, e.g. `/media/project_documents/...`.
    pub fn url(&self, name: &str) -> String {
        format!("{}{}", self.media_url, name)
    }

    /// Absolute URL for `name` given the request origin (`http://host:port`).
    pub fn absolute_url(&self, origin: &str, name: &str) -> String {
        format!("{}{}", origin.trim_end_matches('/'), self.url(name))
    }
}

/// `project_documents/YYYY/MM/DD`.
pub fn upload_dir(date: NaiveDate) -> String {
    format!("{UPLOAD_PREFIX}/{}", date.format("%Y/%m/%d"))
}

/// Reduces a client-supplied file name to a safe single path component.
///
/// Directory parts are dropped, whitespace becomes `_`, and anything other
/// than ASCII alphanumerics, `-`, `_` and `.` is removed.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

fn with_random_suffix(file_name: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    let suffix = &random[..SUFFIX_LEN];
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{file_name}_{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: &tempfile::TempDir) -> MediaStorage {
        MediaStorage::new(dir.path().to_path_buf(), "/media/".to_string())
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("test_upload.txt"), "test_upload.txt");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\reports\\Q1 summary.pdf"), "Q1_summary.pdf");
        assert_eq!(sanitize_file_name("résumé (final).docx"), "rsum_final.docx");
        assert_eq!(sanitize_file_name(".."), "upload");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[test]
    fn test_upload_dir_is_date_partitioned() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();
        assert_eq!(upload_dir(date), "project_documents/2025/06/05");
    }

    #[test]
    fn test_random_suffix_keeps_extension() {
        let name = with_random_suffix("report.pdf");
        assert!(name.starts_with("report_"));
        assert!(name.ends_with(".pdf"));
        assert_eq!(name.len(), "report_.pdf".len() + SUFFIX_LEN);
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        let date = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();

        let name = storage.save_on(date, "evidence.txt", b"file_content").await.unwrap();
        assert_eq!(name, "project_documents/2025/06/05/evidence.txt");
        assert!(storage.exists(&name).await);
        let stored = tokio::fs::read(storage.path(&name)).await.unwrap();
        assert_eq!(stored, b"file_content");

        storage.delete(&name).await.unwrap();
        assert!(!storage.exists(&name).await);
        // Deleting again is harmless.
        storage.delete(&name).await.unwrap();
    }

    #[tokio::test]
    async fn test_name_clash_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(&dir);
        let date = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();

        let first = storage.save_on(date, "same.txt", b"one").await.unwrap();
        let second = storage.save_on(date, "same.txt", b"two").await.unwrap();
        assert_ne!(first, second);
        assert!(second.starts_with("project_documents/2025/06/05/same_"));
        assert_eq!(tokio::fs::read(storage.path(&first)).await.unwrap(), b"one");
        assert_eq!(tokio::fs::read(storage.path(&second)).await.unwrap(), b"two");
    }

    #[test]
    fn test_urls() {
        let storage = MediaStorage::new(PathBuf::from("media"), "/media/".to_string());
        let name = "project_documents/2025/06/05/a.txt";
        assert_eq!(storage.url(name), "/media/project_documents/2025/06/05/a.txt");
        assert_eq!(
            storage.absolute_url("http://testserver/", name),
            "http://testserver/media/project_documents/2025/06/05/a.txt"
        );
        assert_eq!(
            storage.path("../outside/a.txt"),
            PathBuf::from("media").join("outside").join("a.txt")
        );
    }
}
