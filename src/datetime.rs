//! Permissive date parsing for operator-typed range endpoints.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const HOUR_ONLY_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];

/// Parse operator input into a timestamp, accepting every format the
/// recording logs have ever used. Month-day order, not day-first. Returns
/// `None` when nothing matches; callers treat that as a validation failure.
pub fn parse_flexible(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let text = expand_two_digit_year(text);
    let text = text.as_str();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }

    // year-month-day-hour, e.g. "2024-05-11 10"
    let with_minutes = format!("{}:00", text);
    for format in HOUR_ONLY_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&with_minutes, format) {
            return Some(parsed);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(text, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }

    // localized "<month>월 <day>일" form, year defaults to the current one
    let with_year = format!("{} {}", Local::now().year(), text);
    if let Ok(parsed) = NaiveDate::parse_from_str(&with_year, "%Y %m월 %d일") {
        return parsed.and_hms_opt(0, 0, 0);
    }

    None
}

/// Rewrite a two-digit leading year to four digits: "24-05-11" -> "2024-05-11"
fn expand_two_digit_year(text: &str) -> String {
    let leading_digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    if leading_digits == 2 && text.len() > 2 {
        format!("20{}", text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_full_timestamp() {
        assert_eq!(
            parse_flexible("2024-05-11 10:30:15"),
            Some(at(2024, 5, 11, 10, 30, 15))
        );
        assert_eq!(
            parse_flexible("2024-05-11 10:30:15.250"),
            at(2024, 5, 11, 10, 30, 15)
                .with_nanosecond(250_000_000)
        );
    }

    #[test]
    fn test_two_digit_year_with_hour() {
        assert_eq!(parse_flexible("24-05-11 10"), Some(at(2024, 5, 11, 10, 0, 0)));
    }

    #[test]
    fn test_bare_date_forms() {
        assert_eq!(parse_flexible("2024-06-14"), Some(at(2024, 6, 14, 0, 0, 0)));
        assert_eq!(parse_flexible("2024/06/14"), Some(at(2024, 6, 14, 0, 0, 0)));
        assert_eq!(parse_flexible("20240614"), Some(at(2024, 6, 14, 0, 0, 0)));
        assert_eq!(parse_flexible("24-06-14"), Some(at(2024, 6, 14, 0, 0, 0)));
    }

    #[test]
    fn test_localized_month_day() {
        let parsed = parse_flexible("5월 11일").expect("localized form should parse");
        assert_eq!(parsed.month(), 5);
        assert_eq!(parsed.day(), 11);
        assert_eq!(parsed.year(), Local::now().year());
    }

    #[test]
    fn test_garbage_returns_none() {
        assert_eq!(parse_flexible(""), None);
        assert_eq!(parse_flexible("yesterday"), None);
        assert_eq!(parse_flexible("2024-13-40"), None);
    }
}
