use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth is optional and any u32 is a valid limit

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be >= 1, got {}",
            config.fetch_timeout_secs
        )));
    }

    if config.visited_cache_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "visited_cache_capacity must be >= 1, got {}",
            config.visited_cache_capacity
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if let Some(version) = &config.version {
        if version.trim().is_empty() || version.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "user-agent version must be a single non-empty token, got '{}'",
                version
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a seed URL given on the command line
///
/// Absolute http(s) URLs, or `file://` URLs for crawling a local mirror.
pub fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    let url = ::url::Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if !matches!(url.scheme(), "http" | "https" | "file") {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http, https or file",
            seed
        )));
    }

    Ok(())
}
