//! Configuration module for the PoP engine.
//!
//! Provides configuration loading, validation, and environment variable
//! interpolation for the server, pricing conventions, IV solver, simulation,
//! and observability.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pop_engine::config::{Config, load_config};
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("custom/config.yaml"))?;
//!
//! println!("trials: {}", config.simulation.trials);
//! ```

mod observability;
mod pricing;
mod server;
mod simulation;

use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::pricing::IvSolverConfig;
pub use observability::{LogFormat, LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use pricing::PricingConfig;
pub use server::ServerConfig;
pub use simulation::{SimulationConfig, UnrecognizedLegPolicy};

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "POP_ENGINE_CONFIG";

/// Built-in configuration used when no config file is present.
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../../config.yaml");

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Pricing conventions.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// IV solver configuration.
    #[serde(default)]
    pub solver: IvSolverConfig,
    /// Simulation configuration.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Load the configuration the binary starts with.
///
/// An explicit path must exist. Without one, `config.yaml` in the working
/// directory is used if present, otherwise the built-in defaults (which still
/// honour environment overrides such as `SERVER_PORT`).
///
/// # Errors
///
/// Returns a `ConfigError` if the chosen source cannot be read, parsed, or validated.
pub fn load_config_or_default(explicit: Option<&str>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => load_config(Some(path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(None),
        None => load_config_from_string(DEFAULT_CONFIG_YAML),
    }
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. An unset or empty
/// variable without a default becomes the empty string.
pub fn interpolate_env_vars(input: &str) -> String {
    static ENV_VAR_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

    let Some(re) = ENV_VAR_REGEX
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").ok())
        .as_ref()
    else {
        return input.to_string();
    };

    re.replace_all(input, |caps: &Captures<'_>| {
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        match std::env::var(&caps[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` naming the first invalid field.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    fn invalid(message: impl Into<String>) -> Result<(), ConfigError> {
        Err(ConfigError::ValidationError(message.into()))
    }

    // Server
    if config.server.http_port == 0 {
        return invalid("server.http_port must be non-zero");
    }

    let metrics = &config.observability.metrics;
    if metrics.enabled && metrics.listen_addr.port() == config.server.http_port {
        return invalid("observability.metrics.listen_addr must not reuse server.http_port");
    }

    // Pricing conventions
    let rate = config.pricing.risk_free_rate;
    if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
        return invalid("pricing.risk_free_rate must be between 0.0 and 1.0");
    }

    if !config.pricing.days_per_year.is_finite() || config.pricing.days_per_year <= 0.0 {
        return invalid("pricing.days_per_year must be positive");
    }

    // Solver
    let solver = &config.solver;
    if solver.max_iterations == 0 {
        return invalid("solver.max_iterations must be positive");
    }

    if solver.tolerance.is_nan() || solver.tolerance <= 0.0 {
        return invalid("solver.tolerance must be positive");
    }

    if solver.min_vega.is_nan() || solver.min_vega <= 0.0 {
        return invalid("solver.min_vega must be positive");
    }

    if solver.min_vol.is_nan() || solver.min_vol <= 0.0 || solver.min_vol >= solver.max_vol {
        return invalid("solver.min_vol must be positive and below solver.max_vol");
    }

    if !(solver.min_vol..=solver.max_vol).contains(&solver.initial_guess) {
        return invalid("solver.initial_guess must lie within [min_vol, max_vol]");
    }

    // Simulation
    let simulation = &config.simulation;
    if simulation.trials == 0 {
        return invalid("simulation.trials must be positive");
    }

    if simulation.workers == 0 {
        return invalid("simulation.workers must be positive");
    }

    if simulation.workers as u64 > simulation.trials {
        return invalid("simulation.workers must not exceed simulation.trials");
    }

    Ok(())
}
