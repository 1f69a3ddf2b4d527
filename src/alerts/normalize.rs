//! Re-serializing an article row with inline emphasis removed.
//!
//! Microdata text is read with a space between text nodes, so an emphasis tag
//! in the middle of a word splits it: `<b>AI</b>-powered` comes out as
//! `AI -powered`. Unwrapping those tags and re-serializing merges the text
//! nodes again once the markup is parsed back. This has to happen before
//! extraction.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements replaced by their children.
const UNWRAPPED: &[&str] = &["b", "strong", "em", "i"];

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());

/// Serialize `block` and its subtree to HTML, dropping every bold or
/// emphasis tag (at any depth) but keeping its content.
///
/// The row is reparsed into its own tree, the emphasis elements are spliced
/// out there, and the result is written by the HTML serializer.
pub fn normalize_article(block: ElementRef<'_>) -> String {
    // a bare <tr> outside a table is dropped by the tree builder
    let mut fragment = Html::parse_fragment(&format!("<table>{}</table>", block.html()));

    let emphasis: Vec<_> = fragment
        .tree
        .root()
        .descendants()
        .filter(|node| {
            matches!(node.value(), Node::Element(el) if UNWRAPPED.contains(&el.name()))
        })
        .map(|node| node.id())
        .collect();

    for id in emphasis {
        let Some(node) = fragment.tree.get(id) else {
            continue;
        };
        let children: Vec<_> = node.children().map(|child| child.id()).collect();
        if let Some(mut node) = fragment.tree.get_mut(id) {
            for child in children {
                node.insert_id_before(child);
            }
            node.detach();
        }
    }

    fragment
        .select(&ROW)
        .next()
        .map(|row| row.html())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::locate::{article_blocks, parse_digest};
    use crate::microdata;
    use crate::test_support::{article_row, digest_html};

    fn normalized(rows: &[String]) -> Vec<String> {
        let document = parse_digest(&digest_html(rows));
        article_blocks(&document)
            .into_iter()
            .map(normalize_article)
            .collect()
    }

    #[test]
    fn test_bold_is_unwrapped() {
        let html = normalized(&[article_row("u", "New <b>AI</b>-powered tools", "P", "D")]);
        assert!(html[0].contains(">New AI-powered tools<"), "{}", html[0]);
        assert!(!html[0].contains("<b>"));
    }

    #[test]
    fn test_nested_emphasis_is_unwrapped() {
        let html = normalized(&[article_row(
            "u",
            "<strong>Big <b>news</b></strong> on <em>AI</em>-<i>first</i> chips",
            "P",
            "D",
        )]);
        assert!(html[0].contains(">Big news on AI-first chips<"), "{}", html[0]);
    }

    #[test]
    fn test_extraction_after_normalization_keeps_compounds() {
        let html = normalized(&[article_row(
            "u",
            "New <b>AI</b>-powered tools",
            "P",
            "An <b>AI</b>-powered teaser",
        )]);
        let items = microdata::extract(&html[0]);
        assert_eq!(items[0].property("name").as_text(), Some("New AI-powered tools"));
        assert_eq!(
            items[0].property("description").as_text(),
            Some("An AI-powered teaser")
        );
    }

    #[test]
    fn test_row_markup_is_preserved() {
        let html = normalized(&[article_row("https://x/?a=1&amp;url=y", "T", "P", "D")]);
        assert!(html[0].starts_with("<tr "));
        assert!(html[0].contains(r#"itemscope="""#));
        assert!(html[0].contains(r#"itemtype="http://schema.org/Article""#));
        assert!(html[0].contains(r#"href="https://x/?a=1&amp;url=y""#));
        assert!(html[0].ends_with("</tr>"));
    }

    #[test]
    fn test_text_and_void_elements() {
        let document = parse_digest(
            r#"<table><tr itemtype="http://schema.org/Article"><td>a &lt; b &amp; c<br><img src="x.png"></td></tr></table>"#,
        );
        let block = article_blocks(&document)[0];
        assert_eq!(
            normalize_article(block),
            r#"<tr itemtype="http://schema.org/Article"><td>a &lt; b &amp; c<br><img src="x.png"></td></tr>"#
        );
    }

    #[test]
    fn test_namespaced_attributes_keep_their_prefix() {
        let row = r#"<tr itemscope itemtype="http://schema.org/Article"><td><svg><a itemprop="url" xlink:href="https://r.example/?url=https://n.example/a"><text>T</text></a></svg></td></tr>"#;
        let html = normalized(&[row.to_string()]);
        let expected = r#"xlink:href="https://r.example/?url=https://n.example/a""#;
        assert!(html[0].contains(expected), "{}", html[0]);
        assert!(!html[0].contains(" href="));

        let items = microdata::extract(&html[0]);
        assert_eq!(items[0].property("url").as_text(), Some(""));
    }

    #[test]
    fn test_source_document_is_untouched() {
        let document = parse_digest(&digest_html(&[article_row("u", "<b>T</b>", "P", "D")]));
        let block = article_blocks(&document)[0];
        let _ = normalize_article(block);
        assert!(block.html().contains("<b>T</b>"));
    }
}
