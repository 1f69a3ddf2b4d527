//! Command-line interface definitions for mbox_alerts.
//!
//! Every option can also be supplied through an environment variable, which
//! makes the tool easy to drive from cron or a container entrypoint.

use clap::Parser;
use std::path::PathBuf;

use crate::alerts::DefectPolicy;
use crate::outputs::OutputFormat;
use crate::pipeline::PipelineOptions;

/// Command-line arguments for mbox_alerts.
///
/// # Examples
///
/// ```sh
/// # Tab-separated rows, skipping defective articles
/// mbox_alerts -m ./alerts.mbox -o ./articles.tsv
///
/// # JSON Lines, aborting on the first defective article
/// mbox_alerts -m ./alerts.mbox -o ./articles.jsonl -f jsonl --strict
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the mbox archive of alert digests
    #[arg(short, long, env = "ALERTS_MBOX")]
    pub mbox: PathBuf,

    /// Path of the file to write; an existing file is overwritten
    #[arg(short, long, env = "ALERTS_OUTPUT")]
    pub output: PathBuf,

    /// Output format
    #[arg(short, long, env = "ALERTS_FORMAT", value_enum, default_value_t = OutputFormat::Tsv)]
    pub format: OutputFormat,

    /// Abort on the first article that cannot be extracted instead of skipping it
    #[arg(long, env = "ALERTS_STRICT")]
    pub strict: bool,
}

impl Cli {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            policy: if self.strict {
                DefectPolicy::FailFast
            } else {
                DefectPolicy::Skip
            },
        }
    }
}
