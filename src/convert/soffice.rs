//! LibreOffice conversion strategy.
//!
//! Invokes `soffice --headless --convert-to pdf` with the output directory
//! set to the requested artifact's parent. LibreOffice names its output after
//! the input's stem, so the expected intermediate is computed and renamed to
//! the requested path when they differ.

use crate::config::ConversionConfig;
use crate::convert::{Converter, ToolCommand};
use crate::error::{Error, Result};
use crate::probe;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SofficeConverter {
    binary: PathBuf,
    timeout: Duration,
}

impl SofficeConverter {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Build the host's converter: the configured binary if set, otherwise
    /// whichever candidate resolves on PATH. Falls back to the bare
    /// `soffice` name so a late install is picked up without a restart.
    pub fn from_config(config: &ConversionConfig) -> Self {
        let binary = config
            .soffice_path
            .clone()
            .or_else(probe::find_converter_binary)
            .unwrap_or_else(|| PathBuf::from(probe::CONVERTER_CANDIDATES[0]));

        Self::new(binary, Duration::from_secs(config.timeout_secs))
    }

    /// Where LibreOffice will write its output for the given input.
    fn expected_output(input: &Path, outdir: &Path) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .ok_or_else(|| Error::validation(format!("Invalid input filename: {:?}", input)))?;
        Ok(outdir.join(format!("{}.pdf", stem.to_string_lossy())))
    }
}

#[async_trait]
impl Converter for SofficeConverter {
    fn name(&self) -> &str {
        "soffice"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let outdir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| Error::Internal(format!("Output path has no parent: {:?}", output)))?;

        // Isolated user profile per invocation; concurrent soffice processes
        // sharing one profile deadlock or corrupt it.
        let profile = tempfile::tempdir()?;

        tracing::debug!("Converting {:?} -> {:?}", input, output);

        let result = ToolCommand::new(&self.binary)
            .arg("--headless")
            .arg(format!(
                "-env:UserInstallation=file://{}",
                profile.path().display()
            ))
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(outdir.to_string_lossy().to_string())
            .arg(input.to_string_lossy().to_string())
            .timeout(self.timeout)
            .execute()
            .await?;

        let intermediate = Self::expected_output(input, outdir)?;

        if !intermediate.exists() {
            // Zero exit but no output: the tool failed silently.
            return Err(Error::conversion(
                self.name(),
                format!(
                    "no PDF was produced for {:?}: {}",
                    input,
                    result.stdout.trim()
                ),
            ));
        }

        if intermediate != output {
            tokio::fs::rename(&intermediate, output).await?;
        }

        tracing::debug!("Conversion successful: {:?}", output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_output_uses_input_stem() {
        let out = SofficeConverter::expected_output(
            Path::new("/up/tok_report.docx"),
            Path::new("/conv"),
        )
        .unwrap();
        assert_eq!(out, Path::new("/conv/tok_report.pdf"));
    }

    /// Write an executable shell script standing in for soffice.
    #[cfg(unix)]
    fn write_script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-soffice");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn renames_tool_output_to_requested_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tok_report.docx");
        std::fs::write(&input, b"fake docx").unwrap();

        // The script mimics LibreOffice: the output lands in the outdir under
        // the input's stem with a .pdf extension.
        let outdir = dir.path().join("conv");
        std::fs::create_dir_all(&outdir).unwrap();
        let script = write_script(
            dir.path(),
            &format!("printf '%%PDF-1.4 fake' > {}/tok_report.pdf", outdir.display()),
        );

        let converter = SofficeConverter::new(&script, Duration::from_secs(5));
        let output = outdir.join("tok_report.pdf");
        converter.convert(&input, &output).await.unwrap();
        assert!(output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_conversion_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tok_report.docx");
        std::fs::write(&input, b"fake docx").unwrap();
        let script = write_script(dir.path(), "echo 'broken document' >&2; exit 1");

        let converter = SofficeConverter::new(&script, Duration::from_secs(5));
        let output = dir.path().join("tok_report.pdf");
        let err = converter.convert(&input, &output).await.unwrap_err();
        match err {
            Error::Conversion { message, .. } => assert!(message.contains("broken document")),
            other => panic!("expected Conversion error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_without_output_is_conversion_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tok_report.docx");
        std::fs::write(&input, b"fake docx").unwrap();
        let script = write_script(dir.path(), "exit 0");

        let converter = SofficeConverter::new(&script, Duration::from_secs(5));
        let output = dir.path().join("tok_report.pdf");
        let err = converter.convert(&input, &output).await.unwrap_err();
        assert!(matches!(err, Error::Conversion { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn overlong_conversion_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tok_report.docx");
        std::fs::write(&input, b"fake docx").unwrap();
        let script = write_script(dir.path(), "sleep 10");

        let converter = SofficeConverter::new(&script, Duration::from_millis(100));
        let output = dir.path().join("tok_report.pdf");
        let err = converter.convert(&input, &output).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }
}
