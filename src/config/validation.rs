use crate::config::types::{Config, CrawlSettings, DatabaseConfig, FetchSettings};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_settings(&config.fetch)?;
    validate_crawl_settings(&config.crawl)?;
    validate_database_config(&config.database)?;
    Ok(())
}

/// Validates fetch settings
fn validate_fetch_settings(settings: &FetchSettings) -> Result<(), ConfigError> {
    if settings.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            settings.timeout_secs
        )));
    }

    if settings.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            settings.connect_timeout_secs
        )));
    }

    if settings.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 10, got {}",
            settings.max_retries
        )));
    }

    Ok(())
}

/// Validates crawl settings
fn validate_crawl_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    if settings.max_consecutive_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max-consecutive-failures must be >= 1, got {}",
            settings.max_consecutive_failures
        )));
    }

    Ok(())
}

/// Validates database configuration
fn validate_database_config(config: &DatabaseConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database path must not be empty".to_string(),
        ));
    }

    Ok(())
}
