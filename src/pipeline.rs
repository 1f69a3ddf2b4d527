//! The two extraction phases, run back to back over one archive.
//!
//! Messages are read and reduced to [`ParsedMessage`]s first; article rows
//! are extracted only once the archive has been read to the end and its
//! handle released.

use std::path::Path;
use tracing::{debug, info, instrument};

use crate::alerts::{self, ArticleSummary, DefectPolicy};
use crate::error::Result;
use crate::mailbox::{self, MailboxArchive, MailboxSummary};
use crate::models::{ArticleRecord, ParsedMessage};

/// Knobs of a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub policy: DefectPolicy,
}

/// Everything the run learned about the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub mailbox: MailboxSummary,
    pub articles: ArticleSummary,
}

/// Read every message of the archive and keep the ones with a usable body.
///
/// # Errors
///
/// Fails only if the archive is missing or cannot be opened.
pub fn read_messages(path: impl AsRef<Path>) -> Result<(Vec<ParsedMessage>, MailboxSummary)> {
    let archive = MailboxArchive::open(path)?;
    let result = mailbox::extract_bodies(archive.messages()?);
    debug!(path = %archive.path().display(), "Mailbox archive released");
    Ok(result)
}

/// Run both phases over the archive at `path`.
///
/// # Errors
///
/// - the archive cannot be opened
/// - an article row is defective and the policy is [`DefectPolicy::FailFast`]
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn run(
    path: impl AsRef<Path>,
    options: PipelineOptions,
) -> Result<(Vec<ArticleRecord>, RunReport)> {
    let (messages, mailbox) = read_messages(path)?;
    info!(
        total = mailbox.total,
        defective = mailbox.defective,
        parsed = mailbox.parsed,
        "Read mailbox archive"
    );

    let (records, articles) = alerts::extract_articles(&messages, options.policy)?;
    Ok((records, RunReport { mailbox, articles }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ExtractionDefect};
    use crate::mailbox::body::SkipReason;
    use crate::mailbox::reader::Defect;
    use crate::test_support::{article_row, digest_html, html_message, temp_path, write_temp};

    fn two_article_digest() -> String {
        digest_html(&[
            article_row(
                "https://www.google.com/url?rct=j&amp;url=https://news.example/a&amp;ct=ga",
                "New <b>AI</b>-powered tools",
                "Example Times",
                "Teaser A",
            ),
            article_row(
                "https://www.google.com/url?rct=j&amp;url=https://news.example/b&amp;ct=ga",
                "Second story",
                "Other Paper",
                "Teaser B",
            ),
        ])
    }

    fn without_close_boundary(entry: &str) -> String {
        entry.replace("--000000alert--\n", "")
    }

    #[test]
    fn test_mixed_archive() {
        let broken = without_close_boundary(&html_message(
            "Tue, 2 Jan 2024 09:00:00 +0000",
            "<broken@example.com>",
            &two_article_digest(),
        ));
        let undated = html_message("someday soon", "<undated@example.com>", &two_article_digest());
        let good = html_message(
            "Wed, 3 Jan 2024 10:00:00 -0800",
            "<good@example.com>",
            &two_article_digest(),
        );
        let path = write_temp("pipeline-mixed.mbox", &[broken, undated, good].concat());

        let (records, report) = run(&path, PipelineOptions::default()).unwrap();

        assert_eq!(report.mailbox.total, 3);
        assert_eq!(report.mailbox.defective, 2);
        assert_eq!(report.mailbox.without_html, 0);
        assert_eq!(report.mailbox.parsed, 1);
        assert_eq!(
            report.mailbox.skipped[0].reason,
            SkipReason::Defects(vec![Defect::CloseBoundaryNotFound("000000alert".to_string())])
        );
        assert_eq!(
            report.mailbox.skipped[1].reason,
            SkipReason::UnparseableDate(Some("someday soon".to_string()))
        );

        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.date, "01032024");
            assert_eq!(record.message_id, "<good@example.com>");
        }
        assert_eq!(records[0].title, "New AI-powered tools");
        assert_eq!(records[0].url, "https://news.example/a");
        assert_eq!(records[1].publisher, "Other Paper");
        assert_eq!(report.articles.located, 2);
        assert_eq!(report.articles.extracted, 2);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_message_without_articles() {
        let entry = html_message(
            "Wed, 3 Jan 2024 10:00:00 +0000",
            "<empty@example.com>",
            "<html><body><p>No new results</p></body></html>",
        );
        let path = write_temp("pipeline-empty-digest.mbox", &entry);

        let (records, report) = run(&path, PipelineOptions::default()).unwrap();
        assert_eq!(report.mailbox.parsed, 1);
        assert!(records.is_empty());
        assert_eq!(report.articles.located, 0);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_counts_add_up() {
        let plain_only = "From someone@example.com Thu Jan  4 10:00:00 2024\n\
             From: someone@example.com\n\
             Date: Thu, 4 Jan 2024 10:00:00 +0000\n\
             Message-ID: <plain@example.com>\n\
             Content-Type: text/plain\n\
             \n\
             just text\n\
             \n";
        let good = html_message(
            "Wed, 3 Jan 2024 10:00:00 +0000",
            "<a@example.com>",
            &two_article_digest(),
        );
        let undated = html_message("", "<b@example.com>", &two_article_digest());
        let path = write_temp(
            "pipeline-counts.mbox",
            &[good.as_str(), plain_only, undated.as_str()].concat(),
        );

        let (_, report) = run(&path, PipelineOptions::default()).unwrap();
        let summary = &report.mailbox;
        assert_eq!(summary.total, 3);
        assert_eq!(summary.without_html, 1);
        assert_eq!(
            summary.total,
            summary.defective + summary.without_html + summary.parsed
        );

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_strict_policy_aborts() {
        let digest = digest_html(&[
            r#"<tr itemscope itemtype="http://schema.org/Article"><td><span itemprop="name">No publisher</span></td></tr>"#
                .to_string(),
        ]);
        let entry = html_message("Wed, 3 Jan 2024 10:00:00 +0000", "<x@example.com>", &digest);
        let path = write_temp("pipeline-strict.mbox", &entry);

        let (records, report) = run(&path, PipelineOptions::default()).unwrap();
        assert!(records.is_empty());
        assert_eq!(report.articles.skipped.len(), 1);

        let strict = PipelineOptions {
            policy: DefectPolicy::FailFast,
        };
        let err = run(&path, strict).unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction {
                defect: ExtractionDefect::MissingPublisher,
                ..
            }
        ));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_missing_archive_is_fatal() {
        let err = run(temp_path("pipeline-missing.mbox"), PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MailboxNotFound(_)));
    }
}
