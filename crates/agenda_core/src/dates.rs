//! Dates as they appear in the archive: mostly "March 4, 2010", sometimes
//! misspelled, sometimes only present in a document's filename.

use crate::dom::Anchor;
use crate::error::ExtractError;
use crate::schema::Date;
use regex::Regex;
use std::sync::LazyLock;
use time::Month;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::warn;
use url::Url;

/// `<Month> <Day>, <Year>` at the start of a cell.
pub static LEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]+ [0-9]{1,2}, [0-9]{4}").expect("invalid regex: leading date")
});

// Anchor text is looser about spacing and the comma.
static ANCHOR_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]+[ ]+[0-9]{1,2},? ?[0-9]{4}").expect("invalid regex: anchor date")
});

const MONTH_DAY_YEAR: &[BorrowedFormatItem<'static>] =
    format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]");
const ISO: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

const SPELLING_FIXES: &[(&str, &str)] = &[("Ocober", "October")];

/// Words the loose parser skips between date parts.
const FILLER_WORDS: &[&str] = &[
    "at", "on", "and", "ad", "m", "t", "of", "st", "nd", "rd", "th", "am", "pm", "a", "p",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

pub fn iso8601(date: time::Date) -> String {
    // Formatting a plain date with a date-only description cannot fail.
    date.format(ISO).unwrap_or_default()
}

/// Parses a date as written on the archive pages.
///
/// Tries "Month D, YYYY" first, then a permissive reading. A failure is not
/// fatal: the result carries no calendar date and the text is logged.
pub fn parse_date(text: &str, original: Option<&str>) -> Date {
    let original = original.unwrap_or(text);
    let mut cleaned = text.trim().to_string();
    for (wrong, right) in SPELLING_FIXES {
        cleaned = cleaned.replace(wrong, right);
    }

    let parsed = time::Date::parse(&cleaned, MONTH_DAY_YEAR)
        .ok()
        .or_else(|| parse_loose(&cleaned));

    match parsed {
        Some(date) => Date::parsed(date, original, original),
        None => {
            warn!(text = %cleaned, "unparsed date");
            Date::unparsed(original)
        }
    }
}

/// Reads the date of an agenda link.
///
/// Uses the link text (plus tail) when it starts with a date, otherwise the
/// date embedded in the target's filename. An unknown filename layout is
/// fatal.
pub fn extract_date_from_anchor(anchor: &Anchor) -> Result<Date, ExtractError> {
    let text = format!("{}{}", anchor.text, anchor.tail).trim().to_string();
    if let Some(found) = ANCHOR_DATE.find(&text) {
        return Ok(parse_date(found.as_str(), Some(&text)));
    }

    let href = anchor
        .href
        .as_deref()
        .ok_or_else(|| ExtractError::MissingHref(text.clone()))?;
    let name = filename(href);
    let base = name.split('.').next().unwrap_or_default();

    let date = if base.contains("agenda") {
        let token = base.get(6..).unwrap_or_default();
        if token.contains("2000") && !token.starts_with("2000") {
            return Err(filename_error(&name, token));
        }
        compact_date(token).ok_or_else(|| filename_error(&name, token))?
    } else if base.contains("oral_hearing") {
        let token = base.get(12..).unwrap_or_default();
        compact_date(token).ok_or_else(|| filename_error(&name, token))?
    } else if base.contains("notice") {
        let token = base.get(6..).unwrap_or_default();
        time::Date::parse(token, ISO).map_err(|_| filename_error(&name, token))?
    } else {
        return Err(ExtractError::UnknownFilename(name));
    };

    Ok(Date::parsed(date, text, name))
}

fn filename(href: &str) -> String {
    let path = match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    path.rsplit('/').next().unwrap_or_default().to_string()
}

fn filename_error(name: &str, token: &str) -> ExtractError {
    ExtractError::FilenameDate {
        filename: name.to_string(),
        token: token.to_string(),
    }
}

/// `YYYYMMDD`, exactly eight digits.
fn compact_date(token: &str) -> Option<time::Date> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = token[..4].parse().ok()?;
    let month: u8 = token[4..6].parse().ok()?;
    let day: u8 = token[6..].parse().ok()?;
    time::Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

/// Layouts tried, in order, once [`loose_tokens`] has cleaned the text up.
const LOOSE_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[month repr:long case_sensitive:false] [day padding:none] [year]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none] [year]"),
    format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]"),
    format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]"),
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[month padding:none]-[day padding:none]-[year]"),
];

/// Best-effort reading of free-form date text such as "4 March 2010",
/// "Mar. 4th, 2010", "2010-03-04" or "03/04/2010 2:00 PM".
///
/// Day, month and year must all be present.
fn parse_loose(text: &str) -> Option<time::Date> {
    let cleaned = loose_tokens(text)?.join(" ");
    LOOSE_FORMATS
        .iter()
        .find_map(|format| time::Date::parse(&cleaned, format).ok())
}

/// Drops punctuation, weekdays, times of day, ordinal suffixes and filler
/// words. `None` when nothing is left.
fn loose_tokens(text: &str) -> Option<Vec<String>> {
    let tokens: Vec<String> = text
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | ';' | '\''))
        .filter(|token| !token.is_empty() && !token.contains(':'))
        .filter_map(|token| {
            let lowered = token.to_lowercase();
            let is_weekday = lowered.len() >= 3 && WEEKDAYS.iter().any(|day| day.starts_with(&lowered));
            if is_weekday || FILLER_WORDS.contains(&lowered.as_str()) {
                return None;
            }
            if lowered == "sept" {
                return Some("Sep".to_string());
            }
            Some(strip_ordinal(token).to_string())
        })
        .collect();
    (!tokens.is_empty()).then_some(tokens)
}

/// "4th" to "4"; anything else is returned as is.
fn strip_ordinal(token: &str) -> &str {
    let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix = token[digits.len()..].to_ascii_lowercase();
    let is_number = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
    if is_number && matches!(suffix.as_str(), "st" | "nd" | "rd" | "th") {
        digits
    } else {
        token
    }
}
