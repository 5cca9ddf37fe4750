// ABOUTME: Parses tracker time-spent strings into decimal hours on a work calendar
// ABOUTME: Handles compound forms like "1d 4h 30m" and formats hours back for display
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Time-Spent Parsing
//!
//! Tracker durations use a work calendar: a week is 40 hours and a day is 8,
//! matching how the values were entered against working time. A bare number
//! with no unit is taken as hours.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::work_time;

/// Weeks component, e.g. `2w`
static WEEKS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*w").ok());

/// Days component, e.g. `3d`
static DAYS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*d").ok());

/// Hours component, e.g. `4h`
static HOURS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*h").ok());

/// Minutes component, e.g. `30m`
static MINUTES: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*m").ok());

/// Seconds component, e.g. `45s`
static SECONDS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*s").ok());

/// Sum all matches of one unit pattern, scaled to hours
fn unit_hours(pattern: &Option<Regex>, text: &str, hours_per_unit: f64) -> f64 {
    pattern.as_ref().map_or(0.0, |re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .map(|value| value * hours_per_unit)
            .sum()
    })
}

/// Parse a time-spent string (e.g. `"1d 4h 30m"`, `"2w 3d"`, `"45m"`) into
/// decimal hours
///
/// Unknown input parses to 0; a bare number is taken as hours. The result is
/// rounded to 2 decimal places.
#[must_use]
pub fn parse_time_spent(time_spent: &str) -> f64 {
    let text = time_spent.to_lowercase();
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    let mut total = unit_hours(&WEEKS, text, work_time::HOURS_PER_WEEK)
        + unit_hours(&DAYS, text, work_time::HOURS_PER_DAY)
        + unit_hours(&HOURS, text, 1.0)
        + unit_hours(&MINUTES, text, work_time::HOURS_PER_MINUTE)
        + unit_hours(&SECONDS, text, work_time::HOURS_PER_SECOND);

    // No units found: try the whole string as a plain hour count
    if total == 0.0 {
        if let Ok(numeric) = text.parse::<f64>() {
            total = numeric;
        }
    }

    (total * 100.0).round() / 100.0
}

/// Format decimal hours back into a readable `"Xh Ym"` string
#[must_use]
pub fn format_hours(hours: f64) -> String {
    if hours == 0.0 {
        return "0h".to_owned();
    }

    let whole_hours = hours.floor() as i64;
    let minutes = ((hours - hours.floor()) * 60.0).round() as i64;

    if minutes == 0 {
        format!("{whole_hours}h")
    } else {
        format!("{whole_hours}h {minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_units() {
        assert!((parse_time_spent("1d") - 8.0).abs() < f64::EPSILON);
        assert!((parse_time_spent("2w") - 80.0).abs() < f64::EPSILON);
        assert!((parse_time_spent("4h") - 4.0).abs() < f64::EPSILON);
        assert!((parse_time_spent("30m") - 0.5).abs() < f64::EPSILON);
        assert!((parse_time_spent("45m") - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compound_durations() {
        assert!((parse_time_spent("1d 4h 30m") - 12.5).abs() < f64::EPSILON);
        assert!((parse_time_spent("2w 3d 2h") - 106.0).abs() < f64::EPSILON);
        assert!((parse_time_spent("1h 15m") - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bare_number_is_hours() {
        assert!((parse_time_spent("8") - 8.0).abs() < f64::EPSILON);
        assert!((parse_time_spent("2.5") - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_garbage_parses_to_zero() {
        assert!(parse_time_spent("").abs() < f64::EPSILON);
        assert!(parse_time_spent("soon").abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(0.0), "0h");
        assert_eq!(format_hours(8.0), "8h");
        assert_eq!(format_hours(12.5), "12h 30m");
        assert_eq!(format_hours(0.75), "0h 45m");
    }
}
