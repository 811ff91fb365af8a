//! Filesystem layout and naming for uploads and converted artifacts.
//!
//! Stored names are `<uuid4>_<sanitized-original-name>`; the UUID token makes
//! concurrent uploads collision-free without locking. The client-visible name
//! is recovered by stripping everything up to and including the first `_`,
//! which is exactly the token separator: sanitized names may contain `_`,
//! UUIDs never do.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const MAX_FILENAME_LENGTH: usize = 255;

/// Upload and converted-artifact directories.
#[derive(Debug, Clone)]
pub struct Store {
    upload_dir: PathBuf,
    converted_dir: PathBuf,
}

impl Store {
    pub fn new(upload_dir: impl Into<PathBuf>, converted_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            converted_dir: converted_dir.into(),
        }
    }

    /// Create both directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.converted_dir)?;
        Ok(())
    }

    /// Remove leftover files from the upload area.
    ///
    /// Uploads live only between receipt and conversion, so anything found
    /// here at startup is residue from a previous crashed run.
    pub fn sweep_uploads(&self) -> Result<usize> {
        let mut removed = 0;
        if !self.upload_dir.exists() {
            return Ok(0);
        }
        for entry in std::fs::read_dir(&self.upload_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                match std::fs::remove_file(entry.path()) {
                    Ok(()) => removed += 1,
                    Err(e) => {
                        tracing::warn!("Failed to sweep upload {:?}: {}", entry.path(), e);
                    }
                }
            }
        }
        Ok(removed)
    }

    /// Write an upload to the holding area, returning its full path.
    pub async fn save_upload(&self, stored_name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.upload_dir.join(stored_name);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    /// Best-effort removal of a processed upload. Failure is logged, not fatal.
    pub fn remove_upload(&self, path: &Path) {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("Failed to remove upload {:?}: {}", path, e);
        }
    }

    /// Resolve an artifact name inside the converted directory.
    ///
    /// The name is reduced to its final path component first, so a locator
    /// can never escape the converted directory.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        let base = Path::new(name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        self.converted_dir.join(base)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn converted_dir(&self) -> &Path {
        &self.converted_dir
    }
}

/// Sanitize an original filename: strip path components, cap the length,
/// and replace anything outside `[A-Za-z0-9._-]` with `_`.
///
/// Rejects names whose remaining base contains `..`.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    let path = Path::new(filename);
    let filename_only = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(Error::validation("Filename contains invalid path traversal"));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        return Err(Error::validation("Filename is empty after sanitization"));
    }

    Ok(sanitized)
}

/// Prefix a sanitized filename with a fresh unique token.
pub fn unique_stored_name(sanitized: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), sanitized)
}

/// Derive the artifact name from a stored upload name by swapping the
/// extension for `.pdf`. The converter names its output the same way.
pub fn pdf_name(stored_name: &str) -> String {
    match stored_name.rsplit_once('.') {
        Some((stem, _ext)) => format!("{}.pdf", stem),
        None => format!("{}.pdf", stored_name),
    }
}

/// Recover the client-visible name by stripping the unique-token prefix.
pub fn display_name(stored_name: &str) -> &str {
    stored_name
        .split_once('_')
        .map(|(_, rest)| rest)
        .unwrap_or(stored_name)
}

/// Lowercased extension of a filename, if any.
pub fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
