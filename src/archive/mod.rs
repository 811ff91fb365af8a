//! ZIP assembly for batch downloads.
//!
//! The writer is generic over any `Write + Seek` sink; the shipped sink is an
//! in-memory cursor sized for PDF batches. Entry contents are streamed from
//! disk with `io::copy` rather than slurped per file.

use crate::error::{Error, Result};
use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One requested archive member: where it lives and the name it gets.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub name: String,
}

/// Sanitize an entry name to its base name, preventing path traversal inside
/// the archive. Empty or dot-only names fall back to the given default.
fn sanitize_entry_name(name: &str, fallback: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Write a ZIP of the given entries into `sink`.
///
/// Entries whose file no longer exists are silently omitted; the batch
/// already reported their conversion status once.
pub fn write_zip<W: Write + Seek>(sink: W, entries: &[ArchiveEntry]) -> Result<W> {
    let mut zip = ZipWriter::new(sink);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for (i, entry) in entries.iter().enumerate() {
        let mut file = match std::fs::File::open(&entry.path) {
            Ok(f) => f,
            Err(_) => {
                tracing::debug!("Skipping missing artifact {:?}", entry.path);
                continue;
            }
        };

        let name = sanitize_entry_name(&entry.name, &format!("file_{}.pdf", i + 1));
        zip.start_file(&name, options)
            .map_err(|e| Error::Internal(format!("Failed to add {} to archive: {}", name, e)))?;
        std::io::copy(&mut file, &mut zip)?;
    }

    zip.finish()
        .map_err(|e| Error::Internal(format!("Failed to finalize archive: {}", e)))
}

/// Build an in-memory ZIP and return its bytes.
pub fn build_zip(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    let cursor = write_zip(Cursor::new(Vec::new()), entries)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: PathBuf, name: &str) -> ArchiveEntry {
        ArchiveEntry {
            path,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_sanitize_entry_name() {
        assert_eq!(sanitize_entry_name("../../etc/passwd", "fallback"), "passwd");
        assert_eq!(sanitize_entry_name("report.pdf", "fallback"), "report.pdf");
        assert_eq!(sanitize_entry_name("", "fallback"), "fallback");
        assert_eq!(sanitize_entry_name("..", "fallback"), "fallback");
    }

    #[test]
    fn builds_archive_from_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, b"%PDF-1.4 aaa").unwrap();
        std::fs::write(&b, b"%PDF-1.4 bbb").unwrap();

        let bytes = build_zip(&[entry(a, "first.pdf"), entry(b, "second.pdf")]).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("first.pdf").is_ok());
        assert!(archive.by_name("second.pdf").is_ok());
    }

    #[test]
    fn missing_files_are_omitted_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        std::fs::write(&a, b"%PDF-1.4 aaa").unwrap();

        let bytes = build_zip(&[
            entry(a, "kept.pdf"),
            entry(dir.path().join("gone.pdf"), "gone.pdf"),
        ])
        .unwrap();

        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn empty_entry_list_yields_empty_archive() {
        let bytes = build_zip(&[]).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
