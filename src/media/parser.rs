//! Classification of raw wall entries.

use crate::api::types::RawItem;
use crate::media::item::{MediaItem, MediaKind};

/// Entry type for a still image.
const TYPE_PIC: &str = "pic";

/// Entry type for a live photo (image plus short video clip).
const TYPE_LIVEPHOTO: &str = "livephoto";

/// Partition of a page's entries.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedPage {
    pub images: Vec<MediaItem>,
    pub videos: Vec<MediaItem>,
    pub ignored: usize,
}

/// Map a raw entry to a media item.
///
/// Unknown types, and known types missing the field their URL is built from,
/// yield `None`.
pub fn classify(raw: &RawItem, image_cdn_base: &str) -> Option<MediaItem> {
    match raw.kind.as_deref()? {
        TYPE_PIC => {
            let pid = non_empty(raw.pid.as_deref())?;
            Some(MediaItem {
                kind: MediaKind::Image,
                source_id: pid.to_string(),
                resolved_url: image_url(image_cdn_base, pid),
            })
        }
        TYPE_LIVEPHOTO => {
            let video = non_empty(raw.video.as_deref())?;
            Some(MediaItem {
                kind: MediaKind::LivePhotoVideo,
                source_id: raw.pid.clone().unwrap_or_default(),
                resolved_url: video.to_string(),
            })
        }
        _ => None,
    }
}

/// Classify every entry of a page, keeping server order within each kind.
pub fn classify_page(items: &[RawItem], image_cdn_base: &str) -> ClassifiedPage {
    let mut page = ClassifiedPage::default();

    for raw in items {
        match classify(raw, image_cdn_base) {
            Some(item) => match item.kind {
                MediaKind::Image => page.images.push(item),
                MediaKind::LivePhotoVideo => page.videos.push(item),
            },
            None => {
                tracing::debug!(
                    "Ignoring wall entry of type {:?} (pid {:?})",
                    raw.kind,
                    raw.pid
                );
                page.ignored += 1;
            }
        }
    }

    page
}

/// Build the full-size CDN URL for an image id.
pub fn image_url(image_cdn_base: &str, pid: &str) -> String {
    if image_cdn_base.ends_with('/') {
        format!("{}{}.jpg", image_cdn_base, pid)
    } else {
        format!("{}/{}.jpg", image_cdn_base, pid)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
