//! Error types for the weibo-wall-downloader application.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // API errors
    #[error("Authentication failed (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Failed to fetch page at cursor '{cursor}'{}: {message}", fmt_status(.status))]
    Fetch {
        status: Option<u16>,
        cursor: String,
        message: String,
    },

    // Download errors
    #[error("Download failed for {url}{}: {cause}", fmt_status(.status))]
    Download {
        url: String,
        status: Option<u16>,
        cause: String,
    },

    #[error("Failed to write {} (from {url}): {source}", .path.display())]
    DownloadWrite {
        url: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Crawl cancelled")]
    Cancelled,

    // File system errors
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

impl Error {
    /// Whether retrying the failed operation could plausibly succeed.
    ///
    /// Transport failures (no status) and 5xx responses are transient.
    /// 4xx responses, malformed payloads and local I/O failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Fetch { status, .. } | Error::Download { status, .. } => match status {
                None => true,
                Some(code) => *code >= 500,
            },
            _ => false,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CANCELLED: i32 = 1;
    pub const API_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
