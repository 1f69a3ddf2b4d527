//! `Date` header parsing.
//!
//! Digest dates are reported in the sender's own calendar: the offset in the
//! header is kept, never normalized to UTC, so a message sent late on the 31st
//! at `-0500` stays on the 31st.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const FULL_MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];
const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Named zones and their offsets in `±hhmm` form.
const ZONES: &[(&str, i32)] = &[
    ("UT", 0),
    ("UTC", 0),
    ("GMT", 0),
    ("Z", 0),
    ("AST", -400),
    ("ADT", -300),
    ("EST", -500),
    ("EDT", -400),
    ("CST", -600),
    ("CDT", -500),
    ("MST", -700),
    ("MDT", -600),
    ("PST", -800),
    ("PDT", -700),
];

/// Parse an RFC 2822 `Date` header value.
///
/// Strict RFC 2822 is tried first. Failing that the value is read token by
/// token, which tolerates the variations seen in real archives:
/// - comments such as a trailing `(UTC)`
/// - a weekday that does not match the date, or no weekday at all
/// - full month names and month-first order (`Jan 3 2024`)
/// - RFC 850 dates (`3-Jan-2024`) and two-digit years
/// - single-digit hours and times without seconds
/// - an unknown or missing zone, read as `+0000`
///
/// The calendar date itself must exist: `32 Jan` is rejected.
///
/// # Examples
///
/// ```ignore
/// let date = parse_header_date("Wed, 3 Jan 2024 10:00:00 -0800 (PST)").unwrap();
/// assert_eq!(format_mmddyyyy(&date), "01032024");
/// ```
pub fn parse_header_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let cleaned = strip_comments(value);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(cleaned) {
        return Some(date);
    }
    parse_lenient(cleaned)
}

fn parse_lenient(value: &str) -> Option<DateTime<FixedOffset>> {
    let mut tokens: Vec<String> = value.split_whitespace().map(str::to_string).collect();

    // leading weekday, with or without its comma; "Wed,3" keeps the day
    let first = tokens.first()?.to_ascii_lowercase();
    if first.ends_with(',') || WEEKDAYS.iter().any(|day| first.starts_with(day)) {
        tokens.remove(0);
    } else if let Some((_, rest)) = tokens[0].rsplit_once(',') {
        let rest = rest.to_string();
        tokens[0] = rest;
    }

    if tokens.len() == 3 {
        let mut parts: Vec<String> = tokens[0].split('-').map(str::to_string).collect();
        if parts.len() == 3 {
            parts.extend(tokens.drain(1..));
            tokens = parts;
        }
    }
    if tokens.len() == 4 {
        // zone glued to the time: 10:00:00-0800
        let time = tokens[3].clone();
        match time.find(&['+', '-'][..]).filter(|&i| i > 0) {
            Some(i) => {
                tokens[3] = time[..i].to_string();
                tokens.push(time[i..].to_string());
            }
            None => tokens.push(String::new()),
        }
    }
    if tokens.len() < 5 {
        return None;
    }

    tokens.truncate(5);
    let [mut day, mut month, mut year, mut time, mut zone] = <[String; 5]>::try_from(tokens).ok()?;
    if day.is_empty() || month.is_empty() || year.is_empty() {
        return None;
    }

    let month_number = match month_index(&month) {
        Some(index) => index,
        None => {
            std::mem::swap(&mut day, &mut month);
            month_index(&month)?
        }
    };
    let day = day.trim_end_matches(',');
    if year.contains(':') {
        std::mem::swap(&mut year, &mut time);
    }
    let mut year = year.trim_end_matches(',').to_string();
    if !year.starts_with(|c: char| c.is_ascii_digit()) {
        std::mem::swap(&mut year, &mut zone);
    }

    let (hour, minute, second) = parse_time(time.trim_end_matches(','))?;
    let day: u32 = day.parse().ok()?;
    let mut year: i32 = year.trim_end_matches(',').parse().ok()?;
    if year < 100 {
        year += if year > 68 { 1900 } else { 2000 };
    }

    let naive = NaiveDate::from_ymd_opt(year, month_number, day)?
        .and_hms_opt(hour, minute, second)?;
    zone_offset(&zone)?.from_local_datetime(&naive).single()
}

/// Month, day and four-digit year, zero-padded and concatenated.
pub fn format_mmddyyyy(date: &DateTime<FixedOffset>) -> String {
    date.format("%m%d%Y").to_string()
}

/// Remove `( ... )` comments, which may nest.
fn strip_comments(value: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// 1-based month number of an abbreviated or full English month name.
fn month_index(name: &str) -> Option<u32> {
    let name = name.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == name)
        .or_else(|| FULL_MONTHS.iter().position(|m| *m == name))
        .map(|i| i as u32 + 1)
}

/// `hh:mm`, `hh:mm:ss` or `hh.mm.ss`.
fn parse_time(time: &str) -> Option<(u32, u32, u32)> {
    let separator = if time.contains(':') { ':' } else { '.' };
    let parts: Vec<u32> = time
        .split(separator)
        .map(|part| part.parse().ok())
        .collect::<Option<_>>()?;
    match parts[..] {
        [hour, minute] => Some((hour, minute, 0)),
        [hour, minute, second] => Some((hour, minute, second)),
        _ => None,
    }
}

/// Offset of a numeric or named zone. Anything else is `+0000`.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    let zone = zone.to_ascii_uppercase();
    let hhmm = ZONES
        .iter()
        .find(|(name, _)| *name == zone)
        .map(|&(_, offset)| offset)
        .or_else(|| zone.parse::<i32>().ok())
        .unwrap_or(0);
    let seconds = hhmm.signum() * ((hhmm.abs() / 100) * 3600 + (hhmm.abs() % 100) * 60);
    FixedOffset::east_opt(seconds).or_else(|| FixedOffset::east_opt(0))
}
