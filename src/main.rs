mod cli;

use docpress::{
    config,
    convert::{Converter, SofficeConverter},
    probe, server, storage,
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::sync::Arc;

async fn start_server(
    host: String,
    port: u16,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting docpress server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    // Explicit dependency check before the listener accepts traffic.
    // Missing LibreOffice is a warning, not a startup failure: /health
    // reports degraded and conversions fail with a clear error.
    let tool = probe::converter_status();
    match (tool.available, &tool.path) {
        (true, Some(path)) => {
            tracing::info!(
                "Found {} at {} ({})",
                tool.name,
                path.display(),
                tool.version.as_deref().unwrap_or("unknown version")
            );
        }
        _ => {
            tracing::warn!("LibreOffice not found on PATH. Conversions will fail until it is installed.");
        }
    }

    let converter: Arc<dyn Converter> = Arc::new(SofficeConverter::from_config(&config.conversion));

    server::start_server(config, converter).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "docpress=trace,tower_http=debug".to_string()
        } else {
            "docpress=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Convert { input, out_dir } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert_file(&input, out_dir.as_deref(), cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("docpress {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn convert_file(
    input: &std::path::Path,
    out_dir: Option<&std::path::Path>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    let filename = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid input filename: {:?}", input))?;

    let ext = storage::extension(filename).unwrap_or_default();
    let allowed = &config.conversion.allowed_extensions;
    if !allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) {
        anyhow::bail!("Unsupported extension '{}', allowed: {}", ext, allowed.join(", "));
    }

    let outdir = out_dir
        .map(|p| p.to_path_buf())
        .or_else(|| input.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    std::fs::create_dir_all(&outdir)?;

    let output = outdir.join(storage::pdf_name(filename));

    tracing::info!("Converting {:?}", input);
    let converter = SofficeConverter::from_config(&config.conversion);
    converter.convert(input, &output).await?;

    println!("Converted: {}", output.display());
    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = probe::check_tools();
    let mut any_ok = false;

    for tool in &tools {
        let status = if tool.available {
            any_ok = true;
            "✓"
        } else {
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if any_ok {
        println!("Ready to convert documents.");
    } else {
        println!("LibreOffice is missing. Install it to enable conversions.");
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Upload dir: {:?}", config.storage.upload_dir);
            println!("  Converted dir: {:?}", config.storage.converted_dir);
            println!("  Max upload size: {} bytes", config.server.max_upload_size);
            println!("  Conversion timeout: {}s", config.conversion.timeout_secs);
            println!(
                "  Allowed extensions: {}",
                config.conversion.allowed_extensions.join(", ")
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
