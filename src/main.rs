//! # mbox_alerts
//!
//! Turns an mbox archive of news-alert digest emails into a flat file with
//! one row per article mentioned in the digests.
//!
//! ## Usage
//!
//! ```sh
//! mbox_alerts -m ./alerts.mbox -o ./articles.tsv
//! ```
//!
//! ## Architecture
//!
//! The run is a short sequential pipeline:
//! 1. **Reading**: split the archive into messages and flag structural defects
//! 2. **Bodies**: keep each message's HTML body, date and id, skipping the broken ones
//! 3. **Articles**: locate the schema.org `Article` rows in every body and read
//!    their microdata (title, publisher, teaser, destination URL)
//! 4. **Output**: write the rows as TSV or JSON Lines
//!
//! Each row carries the date (`MMDDYYYY`) and `Message-ID` of the digest it
//! came from.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod alerts;
mod cli;
mod error;
mod mailbox;
mod microdata;
mod models;
mod outputs;
mod pipeline;
#[cfg(test)]
mod test_support;
mod utils;

use cli::Cli;

fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("mbox_alerts starting up");

    let args = Cli::parse();
    debug!(
        mbox = %args.mbox.display(),
        output = %args.output.display(),
        format = ?args.format,
        strict = args.strict,
        "Parsed CLI arguments"
    );

    let (records, report) = match pipeline::run(&args.mbox, args.pipeline_options()) {
        Ok(result) => result,
        Err(e) => {
            error!(path = %args.mbox.display(), error = %e, "Extraction failed");
            return Err(e.into());
        }
    };

    // An unwritable output is reported, not fatal.
    if let Err(e) = outputs::write_records(&args.output, args.format, &records) {
        error!(path = %args.output.display(), error = %e, "Failed to write output");
    } else {
        info!(path = %args.output.display(), rows = records.len(), "Wrote output");
    }

    let elapsed = start_time.elapsed();
    info!(
        total_messages = report.mailbox.total,
        defective_messages = report.mailbox.defective,
        messages_without_html = report.mailbox.without_html,
        parsed_messages = report.mailbox.parsed,
        articles = report.articles.extracted,
        skipped_articles = report.articles.skipped.len(),
        elapsed_secs = elapsed.as_secs_f64(),
        "mbox_alerts completed"
    );

    Ok(())
}
