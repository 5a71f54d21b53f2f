//! API response type definitions.

use std::fmt;

use serde::Deserialize;

/// Envelope returned by `/ajax/profile/getImageWall`.
#[derive(Debug, Deserialize)]
pub struct ImageWallResponse {
    /// Weibo status marker; `-100` means the session is not logged in.
    pub ok: Option<i64>,
    pub data: Option<ImageWallData>,
}

/// Payload of an image wall page.
#[derive(Debug, Deserialize)]
pub struct ImageWallData {
    pub list: Option<Vec<RawItem>>,
    pub since_id: Option<RawCursor>,
}

/// One entry of the wall, before classification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub pid: Option<String>,
    pub video: Option<String>,
}

/// `since_id` as sent by the server, either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawCursor {
    Number(i64),
    Text(String),
}

/// Position in the paginated wall.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PageCursor {
    /// No cursor yet; the first request sends an empty `sinceid`.
    #[default]
    Start,
    /// Opaque continuation token.
    Token(String),
    /// Terminal sentinel: there are no further pages.
    End,
}

impl PageCursor {
    /// Normalize the server's `since_id` into a cursor.
    ///
    /// Zero (numeric or string), empty strings and a missing value all mark
    /// the end of the wall.
    pub fn from_raw(raw: Option<RawCursor>) -> Self {
        match raw {
            None | Some(RawCursor::Number(0)) => PageCursor::End,
            Some(RawCursor::Number(n)) => PageCursor::Token(n.to_string()),
            Some(RawCursor::Text(s)) => {
                let s = s.trim();
                if s.is_empty() || s == "0" {
                    PageCursor::End
                } else {
                    PageCursor::Token(s.to_string())
                }
            }
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, PageCursor::End)
    }

    /// Value for the `sinceid` query parameter.
    pub fn as_query_value(&self) -> &str {
        match self {
            PageCursor::Start | PageCursor::End => "",
            PageCursor::Token(token) => token,
        }
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageCursor::Start => write!(f, "start"),
            PageCursor::Token(token) => write!(f, "{}", token),
            PageCursor::End => write!(f, "end"),
        }
    }
}
