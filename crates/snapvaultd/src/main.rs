//! snapvaultd - snapvault Server Daemon
//!
//! HTTP endpoint that accepts base64-encoded images and files them on disk
//! per user and capture angle.
//!
//! Usage:
//!   snapvaultd [OPTIONS] [config.toml]
//!
//! Options:
//!   --upload-root <path>  Store images under this directory instead of the
//!                         configured one
//!
//! If no config file is provided, built-in defaults are used (port 8000,
//! uploads/ and static/ relative to the working directory).

use std::net::SocketAddr;

use snapvault_api::{create_router, AppState};
use snapvault_core::ImageStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parsed command-line arguments
struct Args {
    /// Server config file (TOML)
    config_path: Option<String>,
    /// Overrides the configured upload root
    upload_root: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut result = Args {
        config_path: None,
        upload_root: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--upload-root" | "-r" => {
                if i + 1 < args.len() {
                    result.upload_root = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    tracing::error!("Missing argument for --upload-root");
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(arg.to_string());
                i += 1;
            }
            _ => {
                tracing::warn!("Unknown argument: {}", args[i]);
                i += 1;
            }
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"snapvaultd - snapvault Server Daemon

Usage: snapvaultd [OPTIONS] [config.toml]

Options:
  -r, --upload-root <path>  Store images under this directory instead of the
                            configured one
  -h, --help                Print this help message

Examples:
  # Run with defaults (port 8000, ./uploads, ./static)
  snapvaultd

  # Run with config file
  snapvaultd config.toml

  # Override the upload root
  snapvaultd --upload-root /var/lib/snapvault config.toml
"#
    );
}

/// Runtime settings resolved from the config file and defaults
struct Settings {
    host: String,
    port: u16,
    upload_root: String,
    static_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            upload_root: "uploads".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "snapvaultd=info,snapvault_api=info,snapvault_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting snapvaultd (snapvault Server Daemon)");

    // Parse command-line arguments
    let args = parse_args();

    // Load configuration
    let mut settings = if let Some(ref path) = args.config_path {
        tracing::info!("Loading config from: {}", path);
        load_config_file(path)?
    } else {
        tracing::info!("No config file provided, using defaults");
        Settings::default()
    };

    if let Some(root) = args.upload_root {
        settings.upload_root = root;
    }

    tracing::info!(
        upload_root = %settings.upload_root,
        static_dir = %settings.static_dir,
        "Storage configuration"
    );

    // Create the app state
    let store = ImageStore::new(&settings.upload_root);
    let state = AppState::new(store, &settings.static_dir);

    // Create the router
    let app = create_router(state);

    // Bind to address
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    // Run the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from TOML file
fn load_config_file(path: &str) -> anyhow::Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let config: toml::Value = toml::from_str(&content)?;

    let defaults = Settings::default();

    let host = config
        .get("server")
        .and_then(|s| s.get("host"))
        .and_then(|h| h.as_str())
        .unwrap_or(&defaults.host)
        .to_string();

    let port = config
        .get("server")
        .and_then(|s| s.get("port"))
        .and_then(|p| p.as_integer())
        .unwrap_or(defaults.port as i64) as u16;

    let upload_root = config
        .get("storage")
        .and_then(|s| s.get("upload_root"))
        .and_then(|r| r.as_str())
        .unwrap_or(&defaults.upload_root)
        .to_string();

    let static_dir = config
        .get("static")
        .and_then(|s| s.get("dir"))
        .and_then(|d| d.as_str())
        .unwrap_or(&defaults.static_dir)
        .to_string();

    Ok(Settings {
        host,
        port,
        upload_root,
        static_dir,
    })
}
