//! String, header and timestamp normalization shared by every stage.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Formats tried (after RFC 3339) when no config overrides them.
///
/// Day-first is listed before month-first: the form is filled in a
/// day-first locale and its spreadsheet export keeps that order.
pub const DEFAULT_TIMESTAMP_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y",
    "%Y-%m-%d",
];

/// Comparison form of a free-text value: lowercase, NFD, combining marks
/// removed. Used for emails and the deletion flag. Does not trim.
pub fn normalize_text(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Comparison form of a column header: [`normalize_text`], leading BOM
/// stripped, whitespace runs collapsed to one space, trimmed.
pub fn normalize_header(s: &str) -> String {
    let text = normalize_text(s);
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when `s` parses as an absolute URL (scheme required).
pub fn is_absolute_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

/// Parses submission timestamps with an ordered list of chrono formats.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    formats: Vec<String>,
}

impl TimestampParser {
    pub fn new(formats: &[String]) -> Self {
        Self {
            formats: formats.to_vec(),
        }
    }

    /// `None` means unparsable: such a value never wins an ordering
    /// comparison against anything.
    pub fn parse(&self, raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        for fmt in &self.formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt);
            }
            if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
                return d.and_hms_opt(0, 0, 0);
            }
        }
        None
    }
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self {
            formats: DEFAULT_TIMESTAMP_FORMATS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
