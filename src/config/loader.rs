//! Configuration loading from disk and environment.

use std::path::Path;
use std::fs;
use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(
        &mut config,
        std::env::var("PORT").ok().as_deref(),
        std::env::var("CONSUL_HTTP_ADDR").ok().as_deref(),
    );

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `PORT` and `CONSUL_HTTP_ADDR` values on top of file configuration.
pub fn apply_env_overrides(config: &mut GatewayConfig, port: Option<&str>, registry: Option<&str>) {
    if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(addr) = registry.map(str::trim).filter(|a| !a.is_empty()) {
        config.registry.base_url = if addr.starts_with("http://") || addr.starts_with("https://") {
            addr.to_string()
        } else {
            format!("http://{}", addr)
        };
    }
}
