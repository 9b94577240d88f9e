pub mod config;
pub mod error;

pub use config::{Config, SearchConfig, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, LookupError, NetworkError, ReqwestErrorExt, StorageError};

use anyhow::Result;

/// Initialize logging for the application.
///
/// `RUST_LOG` takes precedence over `default_filter`. Output goes to stderr so it
/// never interleaves with rendered forecasts on stdout.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("SkyCast core initialized");
    Ok(())
}
