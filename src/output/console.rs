//! Console summary printed at the end of a crawl

use crate::output::CrawlReport;
use std::io::{self, Write};

/// Prints the report to stdout
pub fn print_report(report: &CrawlReport) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_report(&mut out, report) {
        tracing::error!("Failed to print report: {}", e);
    }
}

/// Writes the console layout of the report to any writer
pub fn write_report<W: Write>(out: &mut W, report: &CrawlReport) -> io::Result<()> {
    writeln!(out, "\n--- Analysis Complete ---")?;
    writeln!(out, "Crawled {} unique pages.", report.pages_crawled())?;
    writeln!(out, "External domains this site depends on:")?;
    for host in &report.external_hosts {
        writeln!(out, "- {}", host)?;
    }

    let stats = &report.stats;
    if stats.failed_pages() > 0 || stats.links_dropped > 0 {
        writeln!(out)?;
        writeln!(
            out,
            "Note: {} pages failed and {} links were dropped; the lists above may be incomplete.",
            stats.failed_pages(),
            stats.links_dropped
        )?;
    }

    Ok(())
}
