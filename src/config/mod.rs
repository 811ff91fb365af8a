mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./docpress.toml",
        "~/.config/docpress/config.toml",
        "/etc/docpress/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.server.max_upload_size == 0 {
        anyhow::bail!("max_upload_size cannot be 0");
    }

    if config.conversion.timeout_secs == 0 {
        anyhow::bail!("Conversion timeout cannot be 0");
    }

    if config.conversion.allowed_extensions.is_empty() {
        anyhow::bail!("allowed_extensions cannot be empty");
    }

    if let Some(ref dir) = config.server.static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory does not exist: {:?}", dir);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.conversion.timeout_secs, 60);
        assert_eq!(config.conversion.allowed_extensions, vec!["doc", "docx"]);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [conversion]
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.conversion.timeout_secs, 30);
        assert_eq!(config.storage.upload_dir.to_str(), Some("uploads"));
    }

    #[test]
    fn rejects_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_empty_extension_list() {
        let mut config = Config::default();
        config.conversion.allowed_extensions.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docpress.toml");
        std::fs::write(&path, "[server]\nport = 3000\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn load_config_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docpress.toml");
        std::fs::write(&path, "not valid toml [").unwrap();

        assert!(load_config(&path).is_err());
    }
}
