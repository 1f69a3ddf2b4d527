//! Data models shared between the pipeline phases.
//!
//! - [`ParsedMessage`]: a digest message whose HTML body, date and id were recovered
//! - [`ArticleRecord`]: one output row, an article plus the message it came from

use serde::Serialize;

/// A digest message that passed the body extraction phase.
///
/// Only built for messages with no structural defects, a decodable HTML part
/// and a parseable `Date` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Position of the message in the archive, counting from 0.
    pub key: usize,
    /// Send date as `MMDDYYYY`.
    pub date: String,
    /// `Message-ID` header as written, or empty when the header is absent.
    pub message_id: String,
    /// The decoded HTML part.
    pub html_body: String,
}

/// One extracted article, the unit of output.
///
/// Field order is the column order of the tab-separated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    /// Date of the digest message (`MMDDYYYY`).
    pub date: String,
    /// Id of the digest message.
    pub message_id: String,
    /// Destination URL with the redirect wrapper removed; empty if unknown.
    pub url: String,
    pub title: String,
    pub publisher: String,
    pub teaser: String,
}

impl ArticleRecord {
    /// The record as output columns, in order.
    pub fn columns(&self) -> [&str; 6] {
        [
            &self.date,
            &self.message_id,
            &self.url,
            &self.title,
            &self.publisher,
            &self.teaser,
        ]
    }
}
