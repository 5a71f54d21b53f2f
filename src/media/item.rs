//! Media item representation.

use crate::api::types::PageCursor;
use crate::error::Result;
use crate::fs::naming::{image_filename, video_filename};

/// Kind of media found on the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    LivePhotoVideo,
}

impl MediaKind {
    /// Label used in log and progress messages.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::LivePhotoVideo => "live photo",
        }
    }
}

/// A downloadable media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub kind: MediaKind,

    /// Server-side id (`pid`) of the asset.
    pub source_id: String,

    /// Download URL.
    pub resolved_url: String,
}

impl MediaItem {
    /// Filename the item is stored under in its destination directory.
    pub fn file_name(&self) -> Result<String> {
        match self.kind {
            MediaKind::Image => image_filename(&self.resolved_url),
            MediaKind::LivePhotoVideo => video_filename(&self.resolved_url),
        }
    }
}

/// Classified content of a single wall page.
#[derive(Debug, Clone, Default)]
pub struct PageResult {
    pub images: Vec<MediaItem>,
    pub videos: Vec<MediaItem>,
    /// Entries whose type was not recognized.
    pub ignored: usize,
    pub next_cursor: PageCursor,
}

impl PageResult {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty()
    }
}
