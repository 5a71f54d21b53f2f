//! Weibo Wall Downloader - downloads the image wall of a Weibo profile.
//!
//! The crawler pages through `/ajax/profile/getImageWall` with the server's
//! `since_id` cursor, writes every image and live photo clip to disk, and
//! reports progress as a stream of [`ProgressEvent`]s.
//!
//! # Features
//!
//! - Cursor pagination with end-of-wall and repeated-cursor detection
//! - Images and live photo clips stored in separate directories
//! - Bounded concurrent downloads within a page
//! - Retry with exponential backoff for transient failures
//! - Cooperative cancellation
//!
//! # Example
//!
//! ```no_run
//! use weibo_wall_downloader::{start_crawl, CrawlRequest, CrawlSettings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let request = CrawlRequest::new("1234567890", "SUB=...", "images", "livephotos");
//!     let mut crawl = start_crawl(request, CrawlSettings::default());
//!
//!     while let Some(event) = crawl.next_event().await {
//!         println!("{}", event);
//!     }
//!
//!     let report = crawl.wait().await;
//!     println!("{:?}", report.status);
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::{PageCursor, WeiboApi};
pub use config::Config;
pub use download::{
    start_crawl, CrawlHandle, CrawlReport, CrawlRequest, CrawlSettings, CrawlStats, CrawlStatus,
    ProgressEvent,
};
pub use error::{Error, Result};
pub use media::{MediaItem, MediaKind, PageResult};
