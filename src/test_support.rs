//! Fixtures shared by the unit tests.

use std::path::PathBuf;

use crate::mailbox::reader::ArchiveMessage;

/// A one-article digest, base64 encoded in 76-column lines. The title is
/// `New <b>AI</b>-powered tools`.
pub const BASE64_DIGEST_HTML: &str = "\
PGh0bWw+PGJvZHk+PHRhYmxlPjx0ciBpdGVtc2NvcGUgaXRlbXR5cGU9Imh0dHA6Ly9zY2hlbWEu
b3JnL0FydGljbGUiPjx0ZD48YSBpdGVtcHJvcD0idXJsIiBocmVmPSJodHRwczovL3d3dy5nb29n
bGUuY29tL3VybD9yY3Q9aiZhbXA7dXJsPWh0dHBzOi8vbmV3cy5leGFtcGxlL2FpJmFtcDtjdD1n
YSI+PHNwYW4gaXRlbXByb3A9Im5hbWUiPk5ldyA8Yj5BSTwvYj4tcG93ZXJlZCB0b29sczwvc3Bh
bj48L2E+PGRpdiBpdGVtcHJvcD0icHVibGlzaGVyIiBpdGVtc2NvcGUgaXRlbXR5cGU9Imh0dHA6
Ly9zY2hlbWEub3JnL09yZ2FuaXphdGlvbiI+PHNwYW4gaXRlbXByb3A9Im5hbWUiPkV4YW1wbGUg
VGltZXM8L3NwYW4+PC9kaXY+PGRpdiBpdGVtcHJvcD0iZGVzY3JpcHRpb24iPlRlYXNlciB0ZXh0
PC9kaXY+PC90ZD48L3RyPjwvdGFibGU+PC9ib2R5PjwvaHRtbD4=";

/// One article row in the markup used by alert digests.
pub fn article_row(url: &str, title: &str, publisher: &str, teaser: &str) -> String {
    format!(
        r#"<tr itemscope itemtype="http://schema.org/Article"><td><a itemprop="url" href="{url}"><span itemprop="name">{title}</span></a><div itemprop="publisher" itemscope itemtype="http://schema.org/Organization"><span itemprop="name">{publisher}</span></div><div itemprop="description">{teaser}</div></td></tr>"#
    )
}

/// A digest page holding the given rows.
pub fn digest_html(rows: &[String]) -> String {
    format!(
        "<html><head><title>Alert</title></head><body><table>{}</table></body></html>",
        rows.concat()
    )
}

/// A digest message in mbox form, envelope line included.
pub fn html_message(date: &str, message_id: &str, html: &str) -> String {
    format!(
        "From alerts-noreply@example.com Thu Jan  4 10:00:00 2024\n\
         From: Alerts <alerts-noreply@example.com>\n\
         To: reader@example.com\n\
         Date: {date}\n\
         Message-ID: {message_id}\n\
         Subject: Alert - news\n\
         MIME-Version: 1.0\n\
         Content-Type: multipart/alternative; boundary=\"000000alert\"\n\
         \n\
         --000000alert\n\
         Content-Type: text/plain; charset=\"UTF-8\"\n\
         \n\
         plain version\n\
         \n\
         --000000alert\n\
         Content-Type: text/html; charset=\"UTF-8\"\n\
         Content-Transfer-Encoding: 7bit\n\
         \n\
         {html}\n\
         \n\
         --000000alert--\n\
         \n"
    )
}

/// Build an [`ArchiveMessage`] from the output of [`html_message`].
pub fn parse_archive_message(key: usize, mbox_entry: &str) -> ArchiveMessage {
    let raw = mbox_entry
        .split_once('\n')
        .map(|(_, rest)| rest)
        .unwrap_or(mbox_entry);
    ArchiveMessage::from_raw(key, raw.as_bytes().to_vec())
}

/// A path in the temp directory unique to this test process.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mbox_alerts-{}-{}", std::process::id(), name))
}

pub fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = temp_path(name);
    std::fs::write(&path, contents).unwrap();
    path
}
