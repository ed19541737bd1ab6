use crate::config::types::{Config, CrawlParams, FetchConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on concurrent workers
const MAX_CONNECTIONS: u32 = 100;

/// Validates a configuration loaded from file
///
/// The seed URL is only checked when present, since it is usually given on
/// the command line.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_limits(&config.crawl)?;
    if !config.crawl.url.is_empty() {
        validate_seed_url(&config.crawl.url)?;
    }
    validate_fetch_config(&config.fetch)?;
    Ok(())
}

/// Validates a complete set of crawl parameters, seed URL included
pub fn validate_params(params: &CrawlParams) -> Result<(), ConfigError> {
    validate_limits(params)?;
    validate_seed_url(&params.url)
}

fn validate_limits(params: &CrawlParams) -> Result<(), ConfigError> {
    if params.connections < 1 || params.connections > MAX_CONNECTIONS {
        return Err(ConfigError::Validation(format!(
            "connections must be between 1 and {}, got {}",
            MAX_CONNECTIONS, params.connections
        )));
    }

    if params.base_timeout == 0 {
        return Err(ConfigError::Validation(
            "base-timeout must be greater than 0ms".to_string(),
        ));
    }

    Ok(())
}

fn validate_seed_url(seed: &str) -> Result<(), ConfigError> {
    if seed.is_empty() {
        return Err(ConfigError::Validation("seed url is required".to_string()));
    }

    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
