//! JSON Lines output: one object per record.

use crate::error::Result;
use crate::models::ArticleRecord;

/// Render all records, one JSON object per `\n`-terminated line.
pub fn render(records: &[ArticleRecord]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}
