//! Configuration validation utilities.

use std::collections::HashSet;

use super::error::{ConfigError, ConfigResult};
use super::schema::{DispatchConfig, HeraldConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
///
/// An empty token is accepted here; [`Client::from_config`](crate::Client::from_config)
/// rejects it when a session is actually built.
pub fn validate_config(config: &HeraldConfig) -> ConfigResult<()> {
    validate_token(&config.token)?;
    validate_intents(config)?;
    validate_dispatch_config(&config.dispatch)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_token(token: &str) -> ConfigResult<()> {
    if token.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation("Token cannot contain whitespace"));
    }
    Ok(())
}

fn validate_intents(config: &HeraldConfig) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    for intent in &config.intents {
        if !seen.insert(intent) {
            return Err(ConfigError::validation(format!(
                "Intent {intent} is listed more than once"
            )));
        }
    }
    Ok(())
}

fn validate_dispatch_config(dispatch: &DispatchConfig) -> ConfigResult<()> {
    if dispatch.queue_capacity == 0 {
        return Err(ConfigError::validation(
            "Dispatch queue capacity must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    for target in logging.filters.keys() {
        if target.is_empty() || target.contains(char::is_whitespace) {
            return Err(ConfigError::validation(format!(
                "Invalid log filter target: {target:?}"
            )));
        }
    }
    Ok(())
}
