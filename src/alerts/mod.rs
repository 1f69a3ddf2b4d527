//! Turning digest bodies into article records.
//!
//! Each article row goes through the same steps:
//!
//! 1. [`locate`]: find the `<tr itemtype="http://schema.org/Article">` rows
//! 2. [`normalize`]: unwrap inline emphasis and re-serialize the row
//! 3. [`crate::microdata::extract`]: read the row's microdata item
//! 4. [`redirect`]: recover the destination behind the tracking link
//!
//! A row that yields no item, or an item without a publisher, is an
//! extraction defect. What happens next is decided by [`DefectPolicy`].

pub mod locate;
pub mod normalize;
pub mod redirect;

use tracing::{debug, info, instrument, warn};

use crate::error::{Error, ExtractionDefect, Result};
use crate::microdata;
use crate::models::{ArticleRecord, ParsedMessage};

/// What to do with an article row that cannot be extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DefectPolicy {
    /// Log it, count it and carry on.
    #[default]
    Skip,
    /// Abort the run with [`Error::Extraction`].
    FailFast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedArticle {
    pub message_key: usize,
    /// Position of the row within its message.
    pub index: usize,
    pub defect: ExtractionDefect,
}

/// Counts and diagnostics of the article extraction phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleSummary {
    /// Article rows found across all messages.
    pub located: usize,
    pub extracted: usize,
    pub skipped: Vec<SkippedArticle>,
}

/// Build the record for one normalized article row.
pub fn article_record(
    message: &ParsedMessage,
    row_html: &str,
) -> std::result::Result<ArticleRecord, ExtractionDefect> {
    let items = microdata::extract(row_html);
    let article = items.first().ok_or(ExtractionDefect::NoItem)?;
    let publisher = article.property("publisher");
    if publisher.as_item().is_none() {
        return Err(ExtractionDefect::MissingPublisher);
    }
    if !article.is_a(locate::ARTICLE_TYPE) {
        debug!(item_type = ?article.item_type, "Article row holds an item of another type");
    }
    if article.property("url").is_absent() {
        debug!(key = message.key, "Article has no url property");
    }

    let text = |value: &microdata::Value| value.as_text().unwrap_or_default().to_string();
    Ok(ArticleRecord {
        date: message.date.clone(),
        message_id: message.message_id.clone(),
        url: redirect::resolve_destination(article.property("url").as_text().unwrap_or_default()),
        title: text(article.property("name")),
        publisher: text(publisher.property("name")),
        teaser: text(article.property("description")),
    })
}

/// Extract the article rows of one message.
///
/// Returns the records and the number of rows found.
pub fn extract_message_articles(
    message: &ParsedMessage,
    policy: DefectPolicy,
    skipped: &mut Vec<SkippedArticle>,
) -> Result<(Vec<ArticleRecord>, usize)> {
    let document = locate::parse_digest(&message.html_body);
    let blocks = locate::article_blocks(&document);
    let located = blocks.len();

    let mut records = Vec::with_capacity(located);
    for (index, block) in blocks.into_iter().enumerate() {
        let row_html = normalize::normalize_article(block);
        match article_record(message, &row_html) {
            Ok(record) => records.push(record),
            Err(defect) if policy == DefectPolicy::FailFast => {
                return Err(Error::Extraction {
                    message_key: message.key,
                    index,
                    defect,
                });
            }
            Err(defect) => {
                warn!(key = message.key, index, %defect, "Skipping article");
                skipped.push(SkippedArticle {
                    message_key: message.key,
                    index,
                    defect,
                });
            }
        }
    }

    debug!(
        key = message.key,
        located,
        extracted = records.len(),
        "Extracted message articles"
    );
    Ok((records, located))
}

/// Extract the articles of every parsed message, in archive order.
///
/// # Errors
///
/// Only with [`DefectPolicy::FailFast`], on the first defective row.
#[instrument(level = "info", skip_all, fields(messages = messages.len(), policy = ?policy))]
pub fn extract_articles(
    messages: &[ParsedMessage],
    policy: DefectPolicy,
) -> Result<(Vec<ArticleRecord>, ArticleSummary)> {
    let mut records = Vec::new();
    let mut summary = ArticleSummary::default();

    for message in messages {
        let (message_records, located) =
            extract_message_articles(message, policy, &mut summary.skipped)?;
        summary.located += located;
        records.extend(message_records);
    }
    summary.extracted = records.len();

    info!(
        located = summary.located,
        extracted = summary.extracted,
        skipped = summary.skipped.len(),
        "Extracted articles from the mailbox archive"
    );
    Ok((records, summary))
}
