//! Download module for crawling and downloading.
//!
//! This module provides:
//! - Crawl state and statistics
//! - The image wall crawl loop
//! - Media file downloading
//! - Retry with backoff
//! - Progress events

pub mod media;
pub mod progress;
pub mod retry;
pub mod state;
pub mod wall;

pub use media::{download_image, download_media_item, download_video};
pub use progress::{ProgressEvent, ProgressSender};
pub use retry::{with_retry, RetryPolicy};
pub use state::{
    CrawlPhase, CrawlReport, CrawlRequest, CrawlSettings, CrawlStats, CrawlStatus,
    DEFAULT_CONCURRENT_DOWNLOADS,
};
pub use wall::{run_crawl, start_crawl, CrawlHandle, WallCrawler};
