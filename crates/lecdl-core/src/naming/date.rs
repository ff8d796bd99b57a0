//! Date tokens as they appear in calendar-style sheets.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A calendar date assembled from sheet cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl SheetDate {
    /// Compact `YYYYMMDD` form used as a filename prefix.
    pub fn compact(&self) -> String {
        format!("{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// No parseable date could be assembled from the year and day tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError {
    pub year_token: String,
    pub date_token: String,
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no parseable date in year {:?} / date {:?}",
            self.year_token, self.date_token
        )
    }
}

impl std::error::Error for DateParseError {}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})").expect("static regex"))
}

fn month_day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})月(\d{1,2})日").expect("static regex"))
}

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").expect("static regex"))
}

/// Assembles a date from a year token (e.g. `2025年`) and a day token
/// (`5月15日`, or an ISO-like `2025-05-15` that carries its own year).
///
/// An ISO day token wins over the year token. A `M月D日` token needs a year
/// token with four digits.
pub fn parse_sheet_date(year_token: &str, date_token: &str) -> Result<SheetDate, DateParseError> {
    let err = || DateParseError {
        year_token: year_token.to_string(),
        date_token: date_token.to_string(),
    };

    if let Some(caps) = iso_re().captures(date_token) {
        return build(&caps[1], &caps[2], &caps[3]).ok_or_else(err);
    }

    let caps = month_day_re().captures(date_token).ok_or_else(err)?;
    let year = year_re().captures(year_token).ok_or_else(err)?;
    build(&year[1], &caps[1], &caps[2]).ok_or_else(err)
}

fn build(year: &str, month: &str, day: &str) -> Option<SheetDate> {
    let year: u16 = year.parse().ok()?;
    let month: u8 = month.parse().ok()?;
    let day: u8 = day.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(SheetDate { year, month, day })
}
