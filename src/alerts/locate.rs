//! Finding the article rows of a digest.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// The `itemtype` that marks an article row.
pub const ARTICLE_TYPE: &str = "http://schema.org/Article";

static ARTICLE_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(&format!(r#"tr[itemtype="{ARTICLE_TYPE}"]"#)).unwrap());

/// Parse a digest body. Never fails: malformed markup is repaired the way a
/// browser would.
pub fn parse_digest(html: &str) -> Html {
    Html::parse_document(html)
}

/// Every `<tr>` whose `itemtype` is exactly [`ARTICLE_TYPE`], in document order.
pub fn article_blocks(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&ARTICLE_ROWS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{article_row, digest_html};

    #[test]
    fn test_finds_rows_in_order() {
        let html = digest_html(&[
            article_row("u1", "First", "P", "D"),
            article_row("u2", "Second", "P", "D"),
        ]);
        let document = parse_digest(&html);
        let blocks = article_blocks(&document);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].text().any(|t| t == "First"));
        assert!(blocks[1].text().any(|t| t == "Second"));
    }

    #[test]
    fn test_ignores_other_item_types_and_elements() {
        let html = r#"<table>
            <tr itemscope itemtype="http://schema.org/Organization"><td>org</td></tr>
            <tr itemscope itemtype="https://schema.org/Article"><td>https</td></tr>
            <tr><td>plain</td></tr>
        </table>
        <div itemscope itemtype="http://schema.org/Article">not a row</div>"#;
        let document = parse_digest(html);
        assert!(article_blocks(&document).is_empty());
    }

    #[test]
    fn test_empty_and_broken_documents() {
        assert!(article_blocks(&parse_digest("")).is_empty());
        let broken = r#"<table><tr itemscope itemtype="http://schema.org/Article"><td><b>unclosed"#;
        assert_eq!(article_blocks(&parse_digest(broken)).len(), 1);
    }
}
