//! Error types for the extraction pipeline.
//!
//! Per-message problems (defects, bad dates, missing HTML) are not errors:
//! they are counted and skipped by [`crate::mailbox::body`]. The variants here
//! are the failures that end a run, plus the output failure that `main`
//! reports and swallows.

use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The archive path does not exist or is not a regular file
    #[error("The mailbox file doesn't exist at the given location: {}", .0.display())]
    MailboxNotFound(PathBuf),

    /// The archive exists but cannot be opened for reading
    #[error("The mailbox file cannot be read: {}", .0.display())]
    MailboxUnreadable(PathBuf),

    /// IO error while reading the archive or writing the output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An article block could not be turned into a record (strict mode only)
    #[error("article {index} of message {message_key}: {defect}")]
    Extraction {
        /// Archive key of the message holding the article
        message_key: usize,
        /// Position of the article block inside the message
        index: usize,
        /// What was wrong with the block
        #[source]
        defect: ExtractionDefect,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why an article block produced no record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionDefect {
    /// The block contained no top-level microdata item
    #[error("no microdata item found in article block")]
    NoItem,

    /// The article item has no nested publisher item
    #[error("article has no publisher item")]
    MissingPublisher,
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
