//! Tab-separated output.
//!
//! One row per record, columns in [`ArticleRecord::columns`] order, no header
//! row. Rows end in `\r\n` on every platform. A field is quoted only when it
//! contains a tab, a double quote or a line break; quotes inside a quoted
//! field are doubled, so every value survives a round trip through a
//! spreadsheet or CSV reader.

use itertools::Itertools;

use crate::models::ArticleRecord;

const DELIMITER: &str = "\t";
const LINE_TERMINATOR: &str = "\r\n";

/// Render all records as one TSV document.
pub fn render(records: &[ArticleRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let row = record.columns().iter().map(|field| quote(field)).join(DELIMITER);
        out.push_str(&row);
        out.push_str(LINE_TERMINATOR);
    }
    out
}

fn quote(field: &str) -> String {
    let needs_quotes = field.contains(DELIMITER) || field.contains(&['"', '\r', '\n'][..]);
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
