//! Statistics reporting.

use console::style;

use crate::download::{CrawlReport, CrawlStatus};

/// Print the final statistics of a crawl.
pub fn print_crawl_stats(uid: &str, report: &CrawlReport) {
    let status = match report.status {
        CrawlStatus::Completed => style("completed").green(),
        CrawlStatus::Cancelled => style("cancelled").yellow(),
        CrawlStatus::Failed => style("failed").red(),
    };

    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style(format!("Statistics for {}:", uid)).bold());
    println!("  Status:       {}", status);
    println!("  Pages:        {}", report.stats.pages_processed);
    println!("  Images:       {}", report.stats.images_downloaded);
    println!("  Live photos:  {}", report.stats.videos_downloaded);
    println!("  Total:        {} downloaded", report.stats.total_downloaded());
    println!("{}", style("═".repeat(50)).dim());
}
