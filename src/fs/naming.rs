//! Filename derivation and sanitizing.

use url::Url;

use crate::error::{Error, Result};

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename is `.`/`..` or contains path separators.
pub fn sanitize_filename(name: &str) -> Result<String> {
    if name == "." || name == ".." {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Last segment of a URL's path, ignoring any query string or fragment.
pub fn last_path_segment(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .ok_or_else(|| Error::InvalidFilename(format!("URL has no file name: {}", url)))
}

/// Filename for an image: the trailing path segment of its URL.
pub fn image_filename(url: &str) -> Result<String> {
    sanitize_filename(&last_path_segment(url)?)
}

/// Filename for a live photo clip: the trailing path segment with its
/// extension replaced by `.mp4`.
pub fn video_filename(url: &str) -> Result<String> {
    let segment = last_path_segment(url)?;
    let stem = match segment.rfind('.') {
        Some(dot_pos) if dot_pos > 0 => &segment[..dot_pos],
        _ => segment.as_str(),
    };
    sanitize_filename(&format!("{}.mp4", stem))
}
