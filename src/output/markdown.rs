//! Markdown summary generation
//!
//! This module renders a finished [`CrawlReport`] as a markdown document:
//! run metadata, counters, the external hosts the site depends on and the
//! pages that were crawled.

use crate::output::{CrawlReport, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of `report` to `output_path`
///
/// # Arguments
///
/// * `report` - The finished crawl report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Markdown summary written to {}", output_path.display());
    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();
    let stats = &report.stats;

    md.push_str("# Site-Atlas Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        report.finished_at.to_rfc3339()
    ));
    let millis = report.duration().num_milliseconds();
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n\n",
        millis as f64 / 1000.0
    ));

    // Counters
    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages crawled | {} |\n", report.pages_crawled()));
    md.push_str(&format!("| Pages analyzed | {} |\n", stats.pages_fetched));
    md.push_str(&format!("| Fetch failures | {} |\n", stats.fetch_failures));
    md.push_str(&format!("| Parse failures | {} |\n", stats.parse_failures));
    md.push_str(&format!("| Links enqueued | {} |\n", stats.links_enqueued));
    md.push_str(&format!("| Links dropped | {} |\n", stats.links_dropped));
    md.push_str(&format!(
        "| Skipped (depth limit) | {} |\n",
        stats.skipped_depth
    ));
    md.push_str(&format!(
        "| Skipped (already visited) | {} |\n\n",
        stats.skipped_visited
    ));

    if stats.failed_pages() > 0 || stats.links_dropped > 0 {
        md.push_str(
            "> Some pages failed or links were dropped, so the lists below may be incomplete.\n\n",
        );
    }

    // External hosts
    md.push_str("## External Domains\n\n");
    if report.external_hosts.is_empty() {
        md.push_str("_No external resources found._\n\n");
    } else {
        md.push_str(&format!(
            "This site depends on {} external domains:\n\n",
            report.external_hosts.len()
        ));
        for host in &report.external_hosts {
            md.push_str(&format!("- `{}`\n", host));
        }
        md.push('\n');
    }

    // Crawled pages
    md.push_str("## Crawled Pages\n\n");
    for url in &report.visited {
        md.push_str(&format!("- {}\n", url));
    }
    md.push('\n');

    md.push_str("---\n\n");
    md.push_str(&format!(
        "_Generated by Site-Atlas {}_\n",
        env!("CARGO_PKG_VERSION")
    ));

    md
}
