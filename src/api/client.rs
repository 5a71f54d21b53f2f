//! Weibo API HTTP client.

use std::time::Duration;

use reqwest::{header, Client, Response, StatusCode};

use crate::api::types::{ImageWallResponse, PageCursor};
use crate::error::{Error, Result};
use crate::media::{classify_page, PageResult};

/// Weibo web API base URL.
pub const API_BASE: &str = "https://weibo.com";

/// CDN base serving full-size images.
pub const IMAGE_CDN_BASE: &str = "https://wx1.sinaimg.cn/large/";

/// Profile page the wall is browsed from; used as the `Referer`.
const PROFILE_BASE: &str = "https://weibo.com/u/";

/// Image wall endpoint path.
const IMAGE_WALL_PATH: &str = "/ajax/profile/getImageWall";

/// Weibo's `ok` marker for a session that is not logged in.
const NOT_LOGGED_IN: i64 = -100;

/// Longest response excerpt quoted in error messages.
const MAX_BODY_EXCERPT: usize = 300;

/// Desktop browser user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36 Edg/125.0.0.0";

/// Connection settings for [`WeiboApi`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_base: String,
    pub image_cdn_base: String,
    pub user_agent: String,
    /// Connect timeout, per-read timeout on bodies, and the overall limit
    /// for a page request. Media transfers have no overall limit.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base: API_BASE.to_string(),
            image_cdn_base: IMAGE_CDN_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Weibo API client bound to one account and one session cookie.
pub struct WeiboApi {
    client: Client,
    account_id: String,
    api_base: String,
    image_cdn_base: String,
    request_timeout: Duration,
}

impl WeiboApi {
    /// Create a client that sends the cookie and profile referer on every request.
    pub fn new(account_id: &str, cookie: &str, settings: &ClientSettings) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            header::HeaderValue::from_str(cookie).map_err(|_| Error::ConfigValidation {
                field: "cookie".to_string(),
                message: "Cookie contains characters not allowed in an HTTP header".to_string(),
            })?,
        );
        headers.insert(
            header::REFERER,
            header::HeaderValue::from_str(&profile_referer(account_id)).map_err(|_| {
                Error::ConfigValidation {
                    field: "uid".to_string(),
                    message: format!("Invalid account id: '{}'", account_id),
                }
            })?,
        );

        let client = Client::builder()
            .user_agent(&settings.user_agent)
            .default_headers(headers)
            .connect_timeout(settings.request_timeout)
            .read_timeout(settings.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            account_id: account_id.to_string(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            image_cdn_base: settings.image_cdn_base.clone(),
            request_timeout: settings.request_timeout,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Fetch and classify one page of the image wall.
    pub async fn fetch_page(&self, cursor: &PageCursor) -> Result<PageResult> {
        let url = format!("{}{}", self.api_base, IMAGE_WALL_PATH);
        let fetch_error = |status: Option<u16>, message: String| Error::Fetch {
            status,
            cursor: cursor.to_string(),
            message,
        };

        tracing::debug!("GET {} (uid={}, sinceid={})", url, self.account_id, cursor);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("uid", self.account_id.as_str()),
                ("sinceid", cursor.as_query_value()),
                ("has_album", "true"),
            ])
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| fetch_error(None, e.to_string()))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        // Weibo answers a stale or rejected session with assorted 4xx codes
        // (401, 403, 432 among them).
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Auth error response: {}", excerpt(&body));
            return Err(Error::Authentication {
                status: status.as_u16(),
                message: if body.trim().is_empty() {
                    "session cookie was rejected".to_string()
                } else {
                    excerpt(&body)
                },
            });
        }

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(fetch_error(Some(status.as_u16()), excerpt(&body)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| fetch_error(None, format!("Failed to read response body: {}", e)))?;
        tracing::debug!("Image wall response length: {} bytes", text.len());

        parse_wall_page(&text, cursor, &self.image_cdn_base)
    }

    /// Start downloading a file, failing on any status other than 200.
    pub async fn download_file(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Download {
                url: url.to_string(),
                status: None,
                cause: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(Error::Download {
                url: url.to_string(),
                status: Some(response.status().as_u16()),
                cause: format!("unexpected HTTP status {}", response.status()),
            });
        }

        Ok(response)
    }
}

/// `Referer` for requests made on behalf of a profile.
pub fn profile_referer(account_id: &str) -> String {
    format!("{}{}?tabtype=album", PROFILE_BASE, account_id)
}

/// Parse an image wall response body fetched at `cursor`.
pub fn parse_wall_page(text: &str, cursor: &PageCursor, image_cdn_base: &str) -> Result<PageResult> {
    let malformed = |message: String| Error::Fetch {
        status: Some(StatusCode::OK.as_u16()),
        cursor: cursor.to_string(),
        message,
    };

    let response: ImageWallResponse = serde_json::from_str(text).map_err(|e| {
        malformed(format!(
            "Failed to parse image wall: {} - Response: {}",
            e,
            excerpt(text)
        ))
    })?;

    let data = match response.data {
        Some(data) => data,
        None if response.ok == Some(NOT_LOGGED_IN) => {
            return Err(Error::Authentication {
                status: StatusCode::OK.as_u16(),
                message: "session is not logged in".to_string(),
            });
        }
        None => return Err(malformed("response has no 'data' object".to_string())),
    };

    let list = data
        .list
        .ok_or_else(|| malformed("response has no 'data.list' array".to_string()))?;

    let page = classify_page(&list, image_cdn_base);

    Ok(PageResult {
        images: page.images,
        videos: page.videos,
        ignored: page.ignored,
        next_cursor: PageCursor::from_raw(data.since_id),
    })
}

fn excerpt(text: &str) -> String {
    text.chars().take(MAX_BODY_EXCERPT).collect()
}
