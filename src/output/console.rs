//! Console output utilities.

use console::style;

use crate::download::ProgressEvent;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print a crawl progress event with a prefix matching its kind.
pub fn print_progress_event(event: &ProgressEvent) {
    let message = event.to_string();
    match event {
        ProgressEvent::Info(_) => print_info(&message),
        ProgressEvent::PageSummary { .. } => {
            println!("{} {}", style("PAGE").blue().bold(), message)
        }
        ProgressEvent::Completed { .. } => print_success(&message),
        ProgressEvent::Cancelled { .. } => print_warning(&message),
        ProgressEvent::Failed { .. } => print_error(&message),
    }
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Weibo Wall Downloader                             ║
║     Images and live photos from a profile's album     ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(uid: &str, image_dir: &str, video_dir: &str, concurrency: usize) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  User id:      {}", uid);
    println!("  Images:       {}", image_dir);
    println!("  Live photos:  {}", video_dir);
    println!("  Concurrency:  {}", concurrency);
    println!();
}
