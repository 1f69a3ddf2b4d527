//! HTML body, date and id extraction for each archived message.
//!
//! Every message ends in exactly one of three buckets, and the counts of the
//! buckets always add up to the number of messages read:
//!
//! | Outcome | Counted as |
//! |---------|------------|
//! | defects, undecodable HTML, unparseable date | `defective` |
//! | no HTML part at all | `without_html` |
//! | everything recovered | `parsed` |

use mail_parser::{Message, MessagePart, MessageParser, MimeHeaders, PartType};
use std::fmt;
use tracing::{debug, info, instrument, warn};

use super::date::{format_mmddyyyy, parse_header_date};
use super::reader::{ArchiveMessage, Defect};
use crate::models::ParsedMessage;
use crate::utils::truncate_for_log;

/// Why a message was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The reader flagged structural defects.
    Defects(Vec<Defect>),
    /// The HTML part could not be decoded to text.
    UndecodableBody(String),
    /// The `Date` header is missing or not a date.
    UnparseableDate(Option<String>),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Defects(defects) => {
                let list = defects
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "message has defects: {list}")
            }
            SkipReason::UndecodableBody(reason) => write!(f, "HTML part undecodable: {reason}"),
            SkipReason::UnparseableDate(Some(raw)) => {
                write!(f, "the date couldn't be parsed: {}", truncate_for_log(raw, 120))
            }
            SkipReason::UnparseableDate(None) => write!(f, "the message has no date"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMessage {
    pub key: usize,
    pub reason: SkipReason,
}

/// Counts and diagnostics of the body extraction phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxSummary {
    pub total: usize,
    pub defective: usize,
    pub without_html: usize,
    pub parsed: usize,
    pub skipped: Vec<SkippedMessage>,
}

/// Result of extracting a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyOutcome {
    Parsed(ParsedMessage),
    NoHtml,
    Skipped(SkipReason),
}

/// Recover the HTML body, date and id of one message.
pub fn extract_message(message: &ArchiveMessage) -> BodyOutcome {
    if !message.defects.is_empty() {
        return BodyOutcome::Skipped(SkipReason::Defects(message.defects.clone()));
    }

    let Some(parsed) = MessageParser::default().parse(&message.raw) else {
        return BodyOutcome::NoHtml;
    };
    let Some(part) = find_html_part(&parsed) else {
        return BodyOutcome::NoHtml;
    };
    let html_body = match decode_part(part) {
        Ok(html) => html,
        Err(reason) => return BodyOutcome::Skipped(SkipReason::UndecodableBody(reason)),
    };

    let raw_date = message.header("date");
    let Some(date) = raw_date.and_then(parse_header_date) else {
        return BodyOutcome::Skipped(SkipReason::UnparseableDate(raw_date.map(str::to_string)));
    };

    let message_id = message.header("message-id").unwrap_or_default().to_string();

    BodyOutcome::Parsed(ParsedMessage {
        key: message.key,
        date: format_mmddyyyy(&date),
        message_id,
        html_body,
    })
}

/// Run [`extract_message`] over a whole archive, accumulating the results.
#[instrument(level = "info", skip_all)]
pub fn extract_bodies<I>(messages: I) -> (Vec<ParsedMessage>, MailboxSummary)
where
    I: IntoIterator<Item = ArchiveMessage>,
{
    let mut parsed = Vec::new();
    let mut summary = MailboxSummary::default();

    for message in messages {
        summary.total += 1;
        match extract_message(&message) {
            BodyOutcome::Parsed(body) => {
                debug!(
                    key = body.key,
                    date = %body.date,
                    message_id = %body.message_id,
                    "Extracted message body"
                );
                parsed.push(body);
            }
            BodyOutcome::NoHtml => {
                debug!(key = message.key, "Message has no HTML part");
                summary.without_html += 1;
            }
            BodyOutcome::Skipped(reason) => {
                warn!(key = message.key, %reason, "Skipping message");
                summary.defective += 1;
                summary.skipped.push(SkippedMessage {
                    key: message.key,
                    reason,
                });
            }
        }
    }
    summary.parsed = parsed.len();

    info!(
        total = summary.total,
        defective = summary.defective,
        without_html = summary.without_html,
        parsed = summary.parsed,
        "Finished reading mailbox archive"
    );
    (parsed, summary)
}

/// First part, depth first, whose content type mentions `html`.
///
/// Embedded `message/rfc822` parts are searched as well.
fn find_html_part<'a, 'x>(message: &'a Message<'x>) -> Option<&'a MessagePart<'x>> {
    for part in &message.parts {
        if is_html(part) {
            return Some(part);
        }
        if let PartType::Message(inner) = &part.body {
            if let Some(found) = find_html_part(inner) {
                return Some(found);
            }
        }
    }
    None
}

fn is_html(part: &MessagePart<'_>) -> bool {
    part.content_type().is_some_and(|ct| {
        let full = match ct.subtype() {
            Some(subtype) => format!("{}/{}", ct.ctype(), subtype),
            None => ct.ctype().to_string(),
        };
        full.to_ascii_lowercase().contains("html")
    })
}

fn decode_part(part: &MessagePart<'_>) -> Result<String, String> {
    if part.is_encoding_problem {
        return Err("transfer encoding could not be reversed".to_string());
    }
    match &part.body {
        PartType::Html(text) | PartType::Text(text) => Ok(text.to_string()),
        PartType::Binary(bytes) | PartType::InlineBinary(bytes) => {
            String::from_utf8(bytes.to_vec()).map_err(|e| format!("not valid UTF-8: {e}"))
        }
        _ => Err("container part has no payload".to_string()),
    }
}
