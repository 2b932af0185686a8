//! Configuration loading for Reelgraph services
//!
//! Configuration is read from environment variables with the `REELGRAPH_`
//! prefix, optionally seeded from a `.env` file via dotenvy. Every config type
//! implements [`ConfigLoader`], and `validate` must pass before the service
//! starts building its models.
//!
//! # Example
//!
//! ```no_run
//! use reelgraph_core::config::{load_dotenv, ConfigLoader, EngineConfig, ServiceConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! load_dotenv();
//!
//! let engine_config = EngineConfig::from_env()?;
//! let service_config = ServiceConfig::from_env()?;
//!
//! engine_config.validate()?;
//! service_config.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::RecommenderError;
use crate::observability::LogFormat;
use std::path::PathBuf;

/// Configuration loader trait
///
/// Provides standardized methods for loading and validating configuration from
/// environment variables.
pub trait ConfigLoader: Sized {
    /// Load configuration from environment variables, with defaults for unset values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if a set variable cannot be parsed.
    fn from_env() -> Result<Self, RecommenderError>;

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if any validation check fails.
    fn validate(&self) -> Result<(), RecommenderError>;
}

/// Recommendation engine configuration
///
/// # Environment Variables
///
/// - `REELGRAPH_DATA_DIR` (optional): MovieLens directory holding `u.data` and `u.item` (default: "data/ml-100k")
/// - `REELGRAPH_LATENT_FACTORS` (optional): SVD component count (default: 20)
/// - `REELGRAPH_SVD_MAX_ITERATIONS` (optional): Subspace iteration steps (default: 100)
/// - `REELGRAPH_SVD_TOLERANCE` (optional): Largest accepted relative SVD residual (default: 1e-6)
/// - `REELGRAPH_DEFAULT_TOP_N` (optional): Results per recommender when a request omits it (default: 10)
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub latent_factors: usize,
    pub svd_max_iterations: usize,
    pub svd_tolerance: f64,
    pub default_top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/ml-100k"),
            latent_factors: 20,
            svd_max_iterations: 100,
            svd_tolerance: 1e-6,
            default_top_n: 10,
        }
    }
}

impl ConfigLoader for EngineConfig {
    fn from_env() -> Result<Self, RecommenderError> {
        let defaults = EngineConfig::default();

        let data_dir = std::env::var("REELGRAPH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        Ok(Self {
            data_dir,
            latent_factors: parse_env_var("REELGRAPH_LATENT_FACTORS", defaults.latent_factors)?,
            svd_max_iterations: parse_env_var(
                "REELGRAPH_SVD_MAX_ITERATIONS",
                defaults.svd_max_iterations,
            )?,
            svd_tolerance: parse_env_var("REELGRAPH_SVD_TOLERANCE", defaults.svd_tolerance)?,
            default_top_n: parse_env_var("REELGRAPH_DEFAULT_TOP_N", defaults.default_top_n)?,
        })
    }

    fn validate(&self) -> Result<(), RecommenderError> {
        // Upper bound depends on the matrix shape and is checked when the model is fit
        if self.latent_factors == 0 {
            return Err(RecommenderError::ConfigurationError {
                message: "latent_factors must be greater than 0".to_string(),
                key: Some("REELGRAPH_LATENT_FACTORS".to_string()),
            });
        }

        if self.svd_max_iterations == 0 {
            return Err(RecommenderError::ConfigurationError {
                message: "svd_max_iterations must be greater than 0".to_string(),
                key: Some("REELGRAPH_SVD_MAX_ITERATIONS".to_string()),
            });
        }

        if !(self.svd_tolerance.is_finite() && self.svd_tolerance > 0.0) {
            return Err(RecommenderError::ConfigurationError {
                message: format!(
                    "svd_tolerance must be a positive number, got {}",
                    self.svd_tolerance
                ),
                key: Some("REELGRAPH_SVD_TOLERANCE".to_string()),
            });
        }

        if self.default_top_n == 0 {
            return Err(RecommenderError::ConfigurationError {
                message: "default_top_n must be greater than 0".to_string(),
                key: Some("REELGRAPH_DEFAULT_TOP_N".to_string()),
            });
        }

        Ok(())
    }
}

/// HTTP service configuration
///
/// # Environment Variables
///
/// - `REELGRAPH_SERVICE_HOST` (optional): Bind host (default: "0.0.0.0")
/// - `REELGRAPH_SERVICE_PORT` (optional): Bind port (default: 5000)
/// - `REELGRAPH_SERVICE_WORKERS` (optional): Worker threads (default: CPU count)
/// - `REELGRAPH_SERVICE_LOG_LEVEL` (optional): Log level (default: "info"). A set
///   `RUST_LOG` still takes precedence when the subscriber is installed.
/// - `REELGRAPH_SERVICE_LOG_FORMAT` (optional): "json" or "pretty" (default: "json")
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            workers: num_cpus::get(),
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

impl ConfigLoader for ServiceConfig {
    fn from_env() -> Result<Self, RecommenderError> {
        let defaults = ServiceConfig::default();

        let host = std::env::var("REELGRAPH_SERVICE_HOST")
            .or_else(|_| std::env::var("HOST"))
            .unwrap_or(defaults.host);

        let port_key = if std::env::var("REELGRAPH_SERVICE_PORT").is_ok() {
            "REELGRAPH_SERVICE_PORT"
        } else {
            "PORT"
        };
        let port = parse_env_var(port_key, defaults.port)?;

        let workers = parse_env_var("REELGRAPH_SERVICE_WORKERS", defaults.workers)?;

        // RUST_LOG directives are applied by the log filter, not read here
        let log_level =
            std::env::var("REELGRAPH_SERVICE_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_format = parse_env_var("REELGRAPH_SERVICE_LOG_FORMAT", defaults.log_format)?;

        Ok(Self {
            host,
            port,
            workers,
            log_level,
            log_format,
        })
    }

    fn validate(&self) -> Result<(), RecommenderError> {
        if self.port == 0 {
            return Err(RecommenderError::ConfigurationError {
                message: "port must be greater than 0".to_string(),
                key: Some("REELGRAPH_SERVICE_PORT".to_string()),
            });
        }

        if self.workers == 0 {
            return Err(RecommenderError::ConfigurationError {
                message: "workers must be greater than 0".to_string(),
                key: Some("REELGRAPH_SERVICE_WORKERS".to_string()),
            });
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(RecommenderError::ConfigurationError {
                message: format!(
                    "Invalid log_level '{}'. Must be one of: {}",
                    self.log_level,
                    valid_log_levels.join(", ")
                ),
                key: Some("REELGRAPH_SERVICE_LOG_LEVEL".to_string()),
            });
        }

        Ok(())
    }
}

/// Parse an environment variable, falling back to `default` when unset
///
/// # Errors
///
/// Returns a `ConfigurationError` if the value is set but cannot be parsed
fn parse_env_var<T>(key: &str, default: T) -> Result<T, RecommenderError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| RecommenderError::ConfigurationError {
                    message: format!("Failed to parse {}: {}", key, e),
                    key: Some(key.to_string()),
                })
        })
        .unwrap_or(Ok(default))
}

/// Load .env file if present
///
/// Does not return an error if the .env file is not found.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }
}
