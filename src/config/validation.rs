use crate::config::types::{ApiConfig, Config, CrawlerConfig, OutputConfig, TargetsConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_crawler_config(&config.crawler)?;
    validate_targets(&config.targets)?;
    validate_output_config(&config.output)?;

    if let Some(path) = &config.auth.session_file {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "session_file cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.host).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid api host '{}': {}", config.host, e))
    })?;

    // http is allowed so a mirror or local stub can be pointed at
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "api host must use http or https, got '{}'",
            config.host
        )));
    }

    if config.timeout_seconds < 1 || config.timeout_seconds > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_seconds must be between 1 and 300, got {}",
            config.timeout_seconds
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.crawl_interval_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "crawl_interval_ms must be >= 100ms, got {}ms",
            config.crawl_interval_ms
        )));
    }

    if config.reply_page_size < 1 || config.reply_page_size > 50 {
        return Err(ConfigError::Validation(format!(
            "reply_page_size must be between 1 and 50, got {}",
            config.reply_page_size
        )));
    }

    if config.resume_window_hours < 1 {
        return Err(ConfigError::Validation(format!(
            "resume_window_hours must be >= 1, got {}",
            config.resume_window_hours
        )));
    }

    Ok(())
}

/// Validates crawl target lists
fn validate_targets(targets: &TargetsConfig) -> Result<(), ConfigError> {
    for video in &targets.videos {
        validate_numeric_id("videos", video)?;
    }

    for creator in &targets.creators {
        validate_numeric_id("creators", creator)?;
    }

    Ok(())
}

/// Validates a platform id (decimal digits, positive)
fn validate_numeric_id(list: &str, id: &str) -> Result<(), ConfigError> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::Validation(format!(
            "{} entries must be decimal ids, got '{}'",
            list, id
        )));
    }

    if id.chars().all(|c| c == '0') {
        return Err(ConfigError::Validation(format!(
            "{} entries must be positive, got '{}'",
            list, id
        )));
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
