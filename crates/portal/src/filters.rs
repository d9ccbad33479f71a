//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::NaiveDate;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Keeps only the date part of the backend's auction date strings
/// (`07/15/2025 11:00 AM` -> `07/15/2025`).
///
/// Usage in templates: `{{ auction.auction_date|day_part }}`
#[askama::filter_fn]
pub fn day_part(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let s = value.to_string();
    Ok(s.split_whitespace().next().unwrap_or_default().to_string())
}

/// Truncates to `limit` characters, appending `...` when anything was cut.
///
/// Usage in templates: `{{ user.email|ellipsis(20) }}`
#[askama::filter_fn]
pub fn ellipsis(
    value: impl Display,
    _env: &dyn askama::Values,
    limit: usize,
) -> askama::Result<String> {
    let s = value.to_string();
    if s.chars().count() > limit {
        Ok(format!("{}...", s.chars().take(limit).collect::<String>()))
    } else {
        Ok(s)
    }
}

/// Renders a backend date-of-birth string as `10 Jan 2002`.
///
/// Unparseable input passes through unchanged rather than erroring a page.
///
/// Usage in templates: `{{ user.dob|dob_short }}`
#[askama::filter_fn]
pub fn dob_short(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let s = value.to_string();
    Ok(parse_flexible_date(&s).map_or(s, |d| d.format("%d %b %Y").to_string()))
}

/// Parse the date formats the backend has been seen emitting for `dob`
/// fields: RFC 2822 (Flask's default for date columns), bare ISO dates, and
/// ISO datetimes.
#[must_use]
pub fn parse_flexible_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    chrono::DateTime::parse_from_rfc2822(s)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s.split('T').next().unwrap_or(s), "%Y-%m-%d").ok()
        })
        .or_else(|| {
            NaiveDate::parse_from_str(s.split_whitespace().next().unwrap_or(s), "%Y-%m-%d").ok()
        })
}
