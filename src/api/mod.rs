//! Weibo API module.
//!
//! This module provides:
//! - HTTP client for the profile image wall endpoint
//! - API response types and cursor handling

pub mod client;
pub mod types;

pub use client::{ClientSettings, WeiboApi, API_BASE, DEFAULT_USER_AGENT, IMAGE_CDN_BASE};
pub use types::*;
