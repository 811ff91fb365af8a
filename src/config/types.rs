use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with the upload UI; served as a static fallback when set.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Maximum accepted request body size in bytes (default: 100 MiB)
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_size() -> usize {
    100 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            max_upload_size: default_max_upload_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Holding area for uploads awaiting conversion.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Where converted PDFs are written and served from.
    #[serde(default = "default_converted_dir")]
    pub converted_dir: PathBuf,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_converted_dir() -> PathBuf {
    PathBuf::from("converted")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            converted_dir: default_converted_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConversionConfig {
    /// Wall-clock bound for a single conversion subprocess (default: 60s)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Explicit path to the LibreOffice binary; discovered on PATH when unset.
    #[serde(default)]
    pub soffice_path: Option<PathBuf>,

    /// File extensions accepted for upload.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["doc".to_string(), "docx".to_string()]
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            soffice_path: None,
            allowed_extensions: default_allowed_extensions(),
        }
    }
}
