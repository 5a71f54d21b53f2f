//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{parse_uid, Config};
use crate::error::Result;

/// Weibo image wall downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "weibo-wall-downloader",
    version,
    about = "Download the image wall of a Weibo profile",
    long_about = "Downloads every image and live photo clip on a Weibo profile's image wall.\n\n\
                  Requires the Cookie header of a logged-in browser session."
)]
pub struct Args {
    /// User id or profile URL to download from.
    #[arg(short, long, env = "WEIBO_UID")]
    pub uid: Option<String>,

    /// Cookie header of a logged-in session.
    #[arg(short, long, env = "WEIBO_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent")]
    pub user_agent: Option<String>,

    /// Directory for images.
    #[arg(short = 'i', long = "image-dir")]
    pub image_directory: Option<PathBuf>,

    /// Directory for live photo clips.
    #[arg(short = 'v', long = "video-dir")]
    pub video_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Concurrent downloads within a page.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Retries for transient network and server errors (0 disables).
    #[arg(long)]
    pub retries: Option<u32>,

    /// Milliseconds to wait between page requests.
    #[arg(long)]
    pub page_delay: Option<u64>,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) -> Result<()> {
        if let Some(uid) = self.uid {
            config.target.uid = parse_uid(&uid)?;
        }

        if let Some(cookie) = self.cookie {
            config.my_account.cookie = cookie;
        }

        if let Some(user_agent) = self.user_agent {
            config.my_account.user_agent = user_agent;
        }

        if let Some(dir) = self.image_directory {
            config.options.image_directory = Some(dir);
        }

        if let Some(dir) = self.video_directory {
            config.options.video_directory = Some(dir);
        }

        if let Some(concurrency) = self.concurrency {
            config.options.concurrent_downloads = concurrency;
        }

        if let Some(retries) = self.retries {
            config.options.max_retries = retries;
        }

        if let Some(delay) = self.page_delay {
            config.options.page_delay_ms = delay;
        }

        Ok(())
    }
}
