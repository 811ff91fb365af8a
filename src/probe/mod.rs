//! External tool detection.
//!
//! The conversion tool is LibreOffice, shipped as `soffice` (preferred) or
//! `libreoffice` depending on the platform packaging. Probing is a pure
//! query: it never spawns a conversion, only a `--version` lookup.

use std::path::PathBuf;
use std::process::Command;

/// Binary names the converter may be installed under, in preference order.
pub const CONVERTER_CANDIDATES: [&str; 2] = ["soffice", "libreoffice"];

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

impl ToolInfo {
    fn missing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        }
    }
}

/// Check if a tool is available and get its information.
pub fn check_tool(name: &str) -> ToolInfo {
    let result = Command::new(name).arg("--version").output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            let path = which::which(name).ok();

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path,
            }
        }
        _ => ToolInfo::missing(name),
    }
}

/// Locate the converter binary on PATH, preferring `soffice`.
pub fn find_converter_binary() -> Option<PathBuf> {
    CONVERTER_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Probe the first converter candidate that resolves on PATH.
///
/// Returns an unavailable [`ToolInfo`] named after the preferred candidate
/// when none resolves, so callers always have a name to report.
pub fn converter_status() -> ToolInfo {
    for name in CONVERTER_CANDIDATES {
        let info = check_tool(name);
        if info.available {
            return info;
        }
    }
    ToolInfo::missing(CONVERTER_CANDIDATES[0])
}

/// Check all converter candidates, for the `check-tools` subcommand.
pub fn check_tools() -> Vec<ToolInfo> {
    CONVERTER_CANDIDATES.iter().map(|n| check_tool(n)).collect()
}
