//! Unwrapping tracking redirects.
//!
//! Digest links point at a redirector that carries the real destination,
//! percent-encoded, in a query parameter named `url`:
//!
//! ```text
//! https://www.google.com/url?rct=j&sa=t&url=https%3A%2F%2Fnews.example%2Fa&ct=ga
//! ```
//!
//! Only the query string is looked at, so a link whose host or port would not
//! pass URL validation still yields its destination.

use tracing::debug;
use url::form_urlencoded;

/// The decoded `url` query parameter of `raw`, or an empty string when there
/// is none. Only one level of redirect is unwrapped.
pub fn resolve_destination(raw: &str) -> String {
    let raw = raw.trim();
    let without_fragment = raw.split_once('#').map_or(raw, |(before, _)| before);
    let query = without_fragment
        .split_once('?')
        .map(|(_, query)| query)
        .unwrap_or_default();

    let destination = form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == "url" && !value.is_empty())
        .map(|(_, value)| value.into_owned());
    if destination.is_none() {
        debug!(url = %raw, "Article URL carries no destination");
    }
    destination.unwrap_or_default()
}
