use crate::config::types::{Config, EngineConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    Ok(())
}

/// Validates engine connection settings
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    validate_engine_url(&config.url)?;

    match (&config.username, &config.password) {
        (Some(_), None) | (None, Some(_)) => {
            return Err(ConfigError::Validation(
                "username and password must be given together".to_string(),
            ));
        }
        (Some(user), Some(_)) if user.is_empty() => {
            return Err(ConfigError::Validation(
                "username cannot be empty".to_string(),
            ));
        }
        _ => {}
    }

    if config.timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "timeout-secs must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates the engine server root
fn validate_engine_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}' must use the http or https scheme",
            raw
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}' cannot carry a query or fragment",
            raw
        )));
    }

    Ok(())
}
