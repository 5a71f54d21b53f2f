//! Image wall crawl loop.

use std::collections::HashSet;
use std::path::Path;

use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{PageCursor, WeiboApi};
use crate::download::media::{download_image, download_video};
use crate::download::progress::{self, ProgressEvent, ProgressSender};
use crate::download::retry::with_retry;
use crate::download::state::{
    CrawlPhase, CrawlReport, CrawlRequest, CrawlSettings, CrawlStats, CrawlStatus,
};
use crate::error::{Error, Result};
use crate::fs::check_destination_dir;
use crate::media::{MediaItem, MediaKind};

/// Drives one crawl of a profile's image wall.
pub struct WallCrawler {
    api: WeiboApi,
    request: CrawlRequest,
    settings: CrawlSettings,
    events: ProgressSender,
    cancel: CancellationToken,
    stats: CrawlStats,
    phase: CrawlPhase,
    consumed_cursors: HashSet<PageCursor>,
}

impl WallCrawler {
    pub fn new(
        request: CrawlRequest,
        settings: CrawlSettings,
        events: ProgressSender,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let api = WeiboApi::new(&request.account_id, &request.auth_cookie, &settings.client)?;

        Ok(Self {
            api,
            request,
            settings,
            events,
            cancel,
            stats: CrawlStats::default(),
            phase: CrawlPhase::Idle,
            consumed_cursors: HashSet::new(),
        })
    }

    /// Run the crawl to its end and emit exactly one terminal event.
    pub async fn run(mut self) -> CrawlReport {
        self.events.emit(ProgressEvent::Info(format!(
            "crawl started for {}",
            self.request.account_id
        )));

        let result = self.crawl().await;
        let stats = self.stats;

        match result {
            Ok(()) => {
                self.set_phase(CrawlPhase::Terminated);
                self.events.emit(ProgressEvent::Completed {
                    total_images: stats.images_downloaded,
                    total_videos: stats.videos_downloaded,
                });
                CrawlReport {
                    status: CrawlStatus::Completed,
                    stats,
                }
            }
            Err(Error::Cancelled) => {
                self.set_phase(CrawlPhase::Terminated);
                tracing::info!("Crawl of {} cancelled", self.request.account_id);
                self.events.emit(ProgressEvent::Cancelled { stats });
                CrawlReport {
                    status: CrawlStatus::Cancelled,
                    stats,
                }
            }
            Err(error) => {
                self.set_phase(CrawlPhase::Failed);
                tracing::error!("Crawl of {} failed: {}", self.request.account_id, error);
                self.events.emit(ProgressEvent::Failed { error, stats });
                CrawlReport {
                    status: CrawlStatus::Failed,
                    stats,
                }
            }
        }
    }

    async fn crawl(&mut self) -> Result<()> {
        check_destination_dir(&self.request.image_dir, "image_directory")?;
        check_destination_dir(&self.request.video_dir, "video_directory")?;

        let mut cursor = PageCursor::Start;

        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            self.set_phase(CrawlPhase::Fetching);
            self.consumed_cursors.insert(cursor.clone());

            let api = &self.api;
            let what = format!("Fetching page at cursor '{}'", cursor);
            let page = with_retry(&self.settings.retry, &self.cancel, &what, || {
                api.fetch_page(&cursor)
            })
            .await?;

            tracing::debug!(
                "Page at cursor '{}': {} images, {} videos, {} ignored, next cursor '{}'",
                cursor,
                page.images.len(),
                page.videos.len(),
                page.ignored,
                page.next_cursor
            );

            if page.next_cursor.is_end() {
                self.events.emit(ProgressEvent::Info(
                    "reached last page, no more data".to_string(),
                ));
                return Ok(());
            }

            let repeated = self.consumed_cursors.contains(&page.next_cursor);

            self.set_phase(CrawlPhase::Downloading);
            let images = self.download_all(&page.images).await?;
            let videos = self.download_all(&page.videos).await?;

            self.stats.increment_page();
            self.events.emit(ProgressEvent::PageSummary {
                page: self.stats.pages_processed,
                images,
                videos,
            });

            if repeated {
                tracing::warn!("Server returned already used cursor '{}'", page.next_cursor);
                self.events.emit(ProgressEvent::Info(format!(
                    "server repeated cursor '{}', stopping",
                    page.next_cursor
                )));
                return Ok(());
            }

            cursor = page.next_cursor;

            if !self.settings.page_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.settings.page_delay) => {}
                    _ = self.cancel.cancelled() => return Err(Error::Cancelled),
                }
            }
        }
    }

    /// Download `items` in order with bounded concurrency, returning how many
    /// were written. Stops at the first failure; transfers still in flight are
    /// dropped and leave no file behind.
    async fn download_all(&mut self, items: &[MediaItem]) -> Result<u64> {
        let api = &self.api;
        let request = &self.request;
        let retry = &self.settings.retry;
        let cancel = &self.cancel;

        let mut downloads = stream::iter(items.to_vec())
            .map(|item| async move {
                let item = &item;
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                let dir: &Path = request.dir_for(item.kind);
                let what = format!("Downloading {}", item.resolved_url);
                with_retry(retry, cancel, &what, || async move {
                    match item.kind {
                        MediaKind::Image => download_image(api, item, dir).await,
                        MediaKind::LivePhotoVideo => download_video(api, item, dir).await,
                    }
                })
                .await?;
                Ok(item.kind)
            })
            .buffered(self.settings.concurrent_downloads.max(1));

        let mut count = 0;
        while let Some(result) = downloads.next().await {
            let kind = result?;
            self.stats.record_download(kind);
            count += 1;
        }

        Ok(count)
    }

    fn set_phase(&mut self, phase: CrawlPhase) {
        if self.phase != phase {
            tracing::debug!("Crawl phase: {} -> {}", self.phase, phase);
            self.phase = phase;
        }
    }
}

/// Run a crawl on the current task, reporting through `events`.
pub async fn run_crawl(
    request: CrawlRequest,
    settings: CrawlSettings,
    events: ProgressSender,
    cancel: CancellationToken,
) -> CrawlReport {
    match WallCrawler::new(request, settings, events.clone(), cancel) {
        Ok(crawler) => crawler.run().await,
        Err(error) => {
            let stats = CrawlStats::default();
            events.emit(ProgressEvent::Failed { error, stats });
            CrawlReport {
                status: CrawlStatus::Failed,
                stats,
            }
        }
    }
}

/// Handle to a crawl running on a background task.
pub struct CrawlHandle {
    events: mpsc::UnboundedReceiver<ProgressEvent>,
    cancel: CancellationToken,
    task: JoinHandle<CrawlReport>,
}

impl CrawlHandle {
    /// Next progress event; `None` once the crawl has finished and all
    /// events were received.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Ask the crawl to stop at the next page or download boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the crawl task to finish.
    pub async fn wait(self) -> CrawlReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Crawl task panicked: {}", e);
                CrawlReport {
                    status: CrawlStatus::Failed,
                    stats: CrawlStats::default(),
                }
            }
        }
    }
}

/// Start crawling on a background task. Must be called within a tokio runtime.
pub fn start_crawl(request: CrawlRequest, settings: CrawlSettings) -> CrawlHandle {
    let (events, rx) = progress::channel();
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_crawl(request, settings, events, cancel.clone()));

    CrawlHandle {
        events: rx,
        cancel,
        task,
    }
}
