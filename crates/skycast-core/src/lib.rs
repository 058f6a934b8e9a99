pub mod config;
pub mod error;

pub use config::{
    ApiConfig, Config, LoggingConfig, TemperatureUnit, ValidationResult, WeatherConfig,
};
pub use error::{AppError, LocationError, NetworkError, ReqwestErrorExt, WeatherError};

use anyhow::Result;

/// Initialize logging.
///
/// `RUST_LOG` wins over the configured level. Output goes to stderr so it
/// never interleaves with the rendered widget on stdout.
pub fn init(default_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("SkyCast core initialized");
    Ok(())
}
