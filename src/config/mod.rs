//! Configuration module for the weibo-wall-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Building crawl requests and settings
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{AccountConfig, Config, OptionsConfig, TargetConfig};
pub use validation::{parse_uid, validate_config};
