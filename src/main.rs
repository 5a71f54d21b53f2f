//! Weibo Wall Downloader - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use weibo_wall_downloader::{
    cli::Args,
    config::{validate_config, Config},
    download::{start_crawl, ProgressEvent},
    error::{exit_codes, Error, Result},
    output::{
        create_spinner, print_banner, print_config_summary, print_crawl_stats, print_error,
        print_info, print_progress_event, print_warning,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            ExitCode::from(exit_code_for(&e) as u8)
        }
    }
}

fn exit_code_for(error: &Error) -> i32 {
    match error {
        Error::Config(_)
        | Error::ConfigValidation { .. }
        | Error::MissingConfig(_)
        | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
        Error::Authentication { .. } | Error::Fetch { .. } => exit_codes::API_ERROR,
        Error::Download { .. } | Error::DownloadWrite { .. } | Error::InvalidFilename(_) => {
            exit_codes::DOWNLOAD_ERROR
        }
        Error::Cancelled => exit_codes::CANCELLED,
        _ => exit_codes::UNEXPECTED_ERROR,
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config)?;

    validate_config(&config)?;

    let request = config.crawl_request()?;
    let settings = config.crawl_settings();

    print_config_summary(
        &request.account_id,
        &request.image_dir.display().to_string(),
        &request.video_dir.display().to_string(),
        settings.concurrent_downloads,
    );

    let uid = request.account_id.clone();
    let mut handle = start_crawl(request, settings);

    // Ctrl-C stops the crawl at the next page or download boundary
    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            print_warning("Interrupted, stopping crawl...");
            cancel.cancel();
        }
    });

    let spinner = create_spinner("Crawling page 1...");
    let mut exit_code = exit_codes::SUCCESS;

    while let Some(event) = handle.next_event().await {
        spinner.suspend(|| print_progress_event(&event));

        match &event {
            ProgressEvent::PageSummary { page, .. } => {
                spinner.set_message(format!("Crawling page {}...", page + 1));
            }
            ProgressEvent::Failed { error, .. } => exit_code = exit_code_for(error),
            ProgressEvent::Cancelled { .. } => exit_code = exit_codes::CANCELLED,
            _ => {}
        }

        if event.is_terminal() {
            break;
        }
    }

    spinner.finish_and_clear();

    let report = handle.wait().await;
    print_crawl_stats(&uid, &report);

    Ok(exit_code)
}
