//! Crawl parameters and state tracking.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ClientSettings;
use crate::download::retry::RetryPolicy;
use crate::media::MediaKind;

/// Default number of concurrent transfers within a page.
pub const DEFAULT_CONCURRENT_DOWNLOADS: usize = 4;

/// What to crawl and where to store it. Fixed for the duration of a crawl.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub account_id: String,
    pub auth_cookie: String,
    pub image_dir: PathBuf,
    pub video_dir: PathBuf,
}

impl CrawlRequest {
    pub fn new(
        account_id: impl Into<String>,
        auth_cookie: impl Into<String>,
        image_dir: impl Into<PathBuf>,
        video_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            auth_cookie: auth_cookie.into(),
            image_dir: image_dir.into(),
            video_dir: video_dir.into(),
        }
    }

    /// Destination directory for a kind of media.
    pub fn dir_for(&self, kind: MediaKind) -> &Path {
        match kind {
            MediaKind::Image => &self.image_dir,
            MediaKind::LivePhotoVideo => &self.video_dir,
        }
    }
}

/// Tuning knobs for a crawl.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub client: ClientSettings,
    pub concurrent_downloads: usize,
    pub retry: RetryPolicy,
    /// Pause between consecutive page fetches.
    pub page_delay: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            client: ClientSettings::default(),
            concurrent_downloads: DEFAULT_CONCURRENT_DOWNLOADS,
            retry: RetryPolicy::default(),
            page_delay: Duration::ZERO,
        }
    }
}

/// Counters accumulated over one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_processed: u64,
    pub images_downloaded: u64,
    pub videos_downloaded: u64,
}

impl CrawlStats {
    /// Record one finished download.
    pub fn record_download(&mut self, kind: MediaKind) {
        match kind {
            MediaKind::Image => self.images_downloaded += 1,
            MediaKind::LivePhotoVideo => self.videos_downloaded += 1,
        }
    }

    /// Record one fully processed page.
    pub fn increment_page(&mut self) {
        self.pages_processed += 1;
    }

    /// Get total downloaded count.
    pub fn total_downloaded(&self) -> u64 {
        self.images_downloaded + self.videos_downloaded
    }
}

/// Phase of the crawl state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlPhase {
    #[default]
    Idle,
    Fetching,
    Downloading,
    Terminated,
    Failed,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlPhase::Idle => write!(f, "idle"),
            CrawlPhase::Fetching => write!(f, "fetching"),
            CrawlPhase::Downloading => write!(f, "downloading"),
            CrawlPhase::Terminated => write!(f, "terminated"),
            CrawlPhase::Failed => write!(f, "failed"),
        }
    }
}

/// How a crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    Completed,
    Cancelled,
    Failed,
}

/// Final outcome of a crawl task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlReport {
    pub status: CrawlStatus,
    pub stats: CrawlStats,
}
