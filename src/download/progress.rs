//! Progress events sent from a running crawl to whoever displays it.

use std::fmt;

use tokio::sync::mpsc;

use crate::download::state::CrawlStats;
use crate::error::Error;

/// Something that happened during a crawl.
#[derive(Debug)]
pub enum ProgressEvent {
    Info(String),
    PageSummary { page: u64, images: u64, videos: u64 },
    Completed { total_images: u64, total_videos: u64 },
    Cancelled { stats: CrawlStats },
    Failed { error: Error, stats: CrawlStats },
}

impl ProgressEvent {
    /// Whether this is the last event of a crawl.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Completed { .. }
                | ProgressEvent::Cancelled { .. }
                | ProgressEvent::Failed { .. }
        )
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Info(message) => write!(f, "{}", message),
            ProgressEvent::PageSummary {
                page,
                images,
                videos,
            } => write!(
                f,
                "page {} downloaded {} images, {} live photos",
                page, images, videos
            ),
            ProgressEvent::Completed {
                total_images,
                total_videos,
            } => write!(
                f,
                "download complete: {} images, {} live photos",
                total_images, total_videos
            ),
            ProgressEvent::Cancelled { stats } => write!(
                f,
                "crawl cancelled after {} pages: {} images, {} live photos",
                stats.pages_processed, stats.images_downloaded, stats.videos_downloaded
            ),
            ProgressEvent::Failed { error, stats } => write!(
                f,
                "crawl failed after {} pages ({} images, {} live photos): {}",
                stats.pages_processed, stats.images_downloaded, stats.videos_downloaded, error
            ),
        }
    }
}

/// Sending half of the progress channel.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    pub fn new(tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }

    /// Send an event. A receiver that has gone away is not an error.
    pub fn emit(&self, event: ProgressEvent) {
        tracing::debug!("progress: {}", event);
        let _ = self.tx.send(event);
    }
}

/// Create a connected sender/receiver pair.
pub fn channel() -> (ProgressSender, mpsc::UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender::new(tx), rx)
}
