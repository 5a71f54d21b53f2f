//! Media file downloading.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Response;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::api::WeiboApi;
use crate::error::{Error, Result};
use crate::media::{MediaItem, MediaKind};

/// Download an image into `dest_dir` as `<pid>.jpg`.
pub async fn download_image(api: &WeiboApi, item: &MediaItem, dest_dir: &Path) -> Result<PathBuf> {
    debug_assert_eq!(item.kind, MediaKind::Image);
    download_media_item(api, item, dest_dir).await
}

/// Download a live photo clip into `dest_dir` as `<basename>.mp4`.
pub async fn download_video(api: &WeiboApi, item: &MediaItem, dest_dir: &Path) -> Result<PathBuf> {
    debug_assert_eq!(item.kind, MediaKind::LivePhotoVideo);
    download_media_item(api, item, dest_dir).await
}

/// Download a media item to the specified directory.
///
/// The body is written to `<name>.part` and renamed into place once complete,
/// so an existing file with the same name is only replaced by a whole one.
pub async fn download_media_item(
    api: &WeiboApi,
    item: &MediaItem,
    target_dir: &Path,
) -> Result<PathBuf> {
    let filename = item.file_name()?;
    let output_path = target_dir.join(&filename);

    let response = api.download_file(&item.resolved_url).await?;

    let part = PartialFile::new(target_dir.join(format!("{}.part", filename)));
    write_body(response, &item.resolved_url, part.path()).await?;
    part.commit(&output_path)
        .await
        .map_err(|source| Error::DownloadWrite {
            url: item.resolved_url.clone(),
            path: output_path.clone(),
            source,
        })?;

    tracing::debug!("Downloaded {}: {}", item.kind.label(), output_path.display());

    Ok(output_path)
}

/// A `.part` file that is removed when dropped before [`PartialFile::commit`].
///
/// Covers both failed writes and transfers whose future is dropped mid-body.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Move the finished file to `dest`, replacing anything already there.
    async fn commit(mut self, dest: &Path) -> std::io::Result<()> {
        tokio::fs::rename(&self.path, dest).await?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Stream a response body to `output_path`.
async fn write_body(response: Response, url: &str, output_path: &Path) -> Result<()> {
    let write_error = |source: std::io::Error| Error::DownloadWrite {
        url: url.to_string(),
        path: output_path.to_path_buf(),
        source,
    };

    let mut file = File::create(output_path).await.map_err(write_error)?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Download {
            url: url.to_string(),
            status: None,
            cause: format!("Stream error: {}", e),
        })?;
        file.write_all(&chunk).await.map_err(write_error)?;
    }

    file.flush().await.map_err(write_error)?;

    Ok(())
}
