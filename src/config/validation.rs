//! Configuration validation logic.

use std::path::PathBuf;

use regex::Regex;

use crate::config::loader::Config;
use crate::error::{Error, Result};
use crate::fs::check_destination_dir;

/// Minimum length for user agent.
const MIN_USER_AGENT_LENGTH: usize = 40;

/// Upper bound for concurrent transfers.
const MAX_CONCURRENT_DOWNLOADS: usize = 16;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_uid(&config.target.uid)?;
    validate_cookie(&config.my_account.cookie)?;
    validate_user_agent(&config.my_account.user_agent)?;
    validate_directory(&config.options.image_directory, "image_directory")?;
    validate_directory(&config.options.video_directory, "video_directory")?;
    validate_concurrency(config.options.concurrent_downloads)?;

    Ok(())
}

/// Validate a numeric Weibo user id.
pub fn validate_uid(uid: &str) -> Result<()> {
    let uid = uid.trim();
    if uid.is_empty() {
        return Err(Error::MissingConfig("uid".to_string()));
    }

    let uid_pattern = Regex::new(r"^\d{5,16}$").unwrap();
    if !uid_pattern.is_match(uid) {
        return Err(Error::ConfigValidation {
            field: "uid".to_string(),
            message: format!("'{}' is not a numeric Weibo user id (5-16 digits)", uid),
        });
    }

    Ok(())
}

/// Validate the session cookie string.
pub fn validate_cookie(cookie: &str) -> Result<()> {
    let cookie = cookie.trim();
    if cookie.is_empty() {
        return Err(Error::MissingConfig("cookie".to_string()));
    }

    let lower = cookie.to_lowercase();
    if lower.contains("replaceme") || lower.contains("your_cookie") {
        return Err(Error::ConfigValidation {
            field: "cookie".to_string(),
            message: "Cookie appears to be a placeholder. Copy the Cookie header from a logged-in browser session."
                .to_string(),
        });
    }

    // name=value pairs separated by ';'
    let pair_pattern = Regex::new(r"^[^=;\s]+=[^;]*(;\s*[^=;\s]+=[^;]*)*;?$").unwrap();
    if !pair_pattern.is_match(cookie) {
        return Err(Error::ConfigValidation {
            field: "cookie".to_string(),
            message: "Cookie must be a list of name=value pairs separated by ';'".to_string(),
        });
    }

    if !cookie.contains("SUB=") {
        tracing::warn!("Cookie has no SUB entry; Weibo will probably reject it");
    }

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.is_empty() {
        return Err(Error::MissingConfig("user_agent".to_string()));
    }

    if user_agent.len() < MIN_USER_AGENT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "user_agent".to_string(),
            message: format!(
                "User agent must be at least {} characters (got {})",
                MIN_USER_AGENT_LENGTH,
                user_agent.len()
            ),
        });
    }

    Ok(())
}

/// Validate that a destination directory is set, exists and is writable.
pub fn validate_directory(dir: &Option<PathBuf>, field: &str) -> Result<()> {
    let dir = dir
        .as_ref()
        .ok_or_else(|| Error::MissingConfig(field.to_string()))?;
    check_destination_dir(dir, field)
}

/// Validate the concurrent download count.
pub fn validate_concurrency(concurrent_downloads: usize) -> Result<()> {
    if concurrent_downloads == 0 || concurrent_downloads > MAX_CONCURRENT_DOWNLOADS {
        return Err(Error::ConfigValidation {
            field: "concurrent_downloads".to_string(),
            message: format!(
                "Must be between 1 and {} (got {})",
                MAX_CONCURRENT_DOWNLOADS, concurrent_downloads
            ),
        });
    }

    Ok(())
}

/// Extract a user id from a profile URL or direct id string.
pub fn parse_uid(input: &str) -> Result<String> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        // Pattern: https://weibo.com/u/1234567890 or https://weibo.com/1234567890
        let profile_pattern = Regex::new(r"weibo\.(?:com|cn)/(?:u/)?(\d{5,16})(?:[/?#]|$)").unwrap();

        if let Some(captures) = profile_pattern.captures(input) {
            if let Some(id) = captures.get(1) {
                return Ok(id.as_str().to_string());
            }
        }

        return Err(Error::ConfigValidation {
            field: "uid".to_string(),
            message: format!("Could not extract user id from URL: {}", input),
        });
    }

    validate_uid(input)?;
    Ok(input.to_string())
}
