//! Writing extracted articles to disk.
//!
//! # Submodules
//!
//! - [`tsv`]: tab-separated rows, the default
//! - [`jsonl`]: one JSON object per line
//!
//! The file is rendered in memory and written in a single call, replacing any
//! existing file at the path.

pub mod jsonl;
pub mod tsv;

use clap::ValueEnum;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::ArticleRecord;

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated values without a header row
    #[default]
    Tsv,
    /// JSON Lines
    Jsonl,
}

/// Write `records` to `path` in the given format.
///
/// # Errors
///
/// Returns an error if the file cannot be written (missing directory,
/// permissions, full disk). Nothing is written in that case.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display(), ?format))]
pub fn write_records(
    path: impl AsRef<Path>,
    format: OutputFormat,
    records: &[ArticleRecord],
) -> Result<()> {
    let contents = match format {
        OutputFormat::Tsv => tsv::render(records),
        OutputFormat::Jsonl => jsonl::render(records)?,
    };
    fs::write(path.as_ref(), contents)?;
    info!(rows = records.len(), "Wrote article output");
    Ok(())
}
