use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;

use super::{Item, Value};
use crate::utils::collapse_whitespace;

static TOP_LEVEL_ITEMS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[itemscope]:not([itemprop])").unwrap());

/// Extract the top-level microdata items of an HTML document or fragment.
///
/// Items are returned in document order. Properties are crawled from the
/// item's descendants and from the elements named by its `itemref`, without
/// descending into nested items; a nested item that is itself a property is
/// returned as a [`Value::Item`].
///
/// Text values are the element's text nodes joined with single spaces, with
/// whitespace collapsed. Inline markup inside a word therefore splits it
/// (`<b>AI</b>-powered` reads `AI -powered`); unwrap such tags beforehand.
///
/// URL-valued properties (`href`, `src`, ...) are returned exactly as written.
pub fn extract(html: &str) -> Vec<Item> {
    let source = with_table_context(html);
    let document = Html::parse_fragment(&source);
    let mut crawler = Crawler {
        document: &document,
        ancestors: Vec::new(),
    };
    document
        .select(&TOP_LEVEL_ITEMS)
        .map(|element| crawler.item(element))
        .collect()
}

/// Table parts are dropped by the HTML tree builder unless they sit inside a
/// table, so a bare row is given one.
fn with_table_context(html: &str) -> Cow<'_, str> {
    let first_tag = html
        .trim_start()
        .strip_prefix('<')
        .map(|rest| {
            rest.chars()
                .take_while(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .unwrap_or_default();

    match first_tag.as_str() {
        "tr" | "tbody" | "thead" | "tfoot" | "caption" | "colgroup" => {
            Cow::Owned(format!("<table>{html}</table>"))
        }
        "td" | "th" => Cow::Owned(format!("<table><tr>{html}</tr></table>")),
        _ => Cow::Borrowed(html),
    }
}

struct Crawler<'a> {
    document: &'a Html,
    /// Items currently being built, innermost last.
    ancestors: Vec<ElementRef<'a>>,
}

impl<'a> Crawler<'a> {
    fn item(&mut self, root: ElementRef<'a>) -> Item {
        let mut item = Item {
            item_type: attr_string(root, "itemtype"),
            id: attr_string(root, "itemid"),
            ..Item::default()
        };
        self.ancestors.push(root);

        let mut sources: Vec<ElementRef<'a>> =
            root.children().filter_map(ElementRef::wrap).collect();
        if let Some(refs) = root.value().attr("itemref") {
            sources.extend(refs.split_whitespace().filter_map(|id| self.find_by_id(id)));
        }

        let mut seen = Vec::new();
        for element in sources {
            self.crawl(element, &mut item, &mut seen);
        }

        self.ancestors.pop();
        item
    }

    fn crawl(&mut self, element: ElementRef<'a>, item: &mut Item, seen: &mut Vec<ElementRef<'a>>) {
        if seen.contains(&element) {
            return;
        }
        seen.push(element);

        if let Some(names) = element.value().attr("itemprop") {
            let value = self.property_value(element);
            for name in names.split_whitespace() {
                item.add_property(name, value.clone());
            }
        }
        if element.value().attr("itemscope").is_none() {
            for child in element.children().filter_map(ElementRef::wrap) {
                self.crawl(child, item, seen);
            }
        }
    }

    fn property_value(&mut self, element: ElementRef<'a>) -> Value {
        let el = element.value();
        if el.attr("itemscope").is_some() {
            if self.ancestors.contains(&element) {
                return Value::Absent;
            }
            return Value::Item(self.item(element));
        }

        let attr_value =
            |name: &str| Value::Text(el.attr(name).unwrap_or_default().trim().to_string());
        match el.name() {
            "meta" => attr_value("content"),
            _ if el.attr("content").is_some() => attr_value("content"),
            "audio" | "embed" | "iframe" | "img" | "source" | "track" | "video" => {
                attr_value("src")
            }
            "a" | "area" | "link" => attr_value("href"),
            "object" => attr_value("data"),
            "data" | "meter" => attr_value("value"),
            "time" if el.attr("datetime").is_some() => attr_value("datetime"),
            _ => Value::Text(text_content(element)),
        }
    }

    fn find_by_id(&self, id: &str) -> Option<ElementRef<'a>> {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().id() == Some(id))
    }
}

fn attr_string(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn text_content(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}
