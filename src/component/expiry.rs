//! HTTP date and cache lifetime parsing.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Parses an HTTP date.
///
/// Accepts the three formats HTTP/1.1 allows: RFC 1123
/// (`Sun, 06 Nov 1994 08:49:37 GMT`), RFC 850
/// (`Sunday, 06-Nov-94 08:49:37 GMT`) and asctime
/// (`Sun Nov  6 08:49:37 1994`). Returns `None` for anything else, including
/// the `0` and `-1` values servers use to mean "already expired".
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: [&str; 3] = [
        "%A, %d-%b-%y %H:%M:%S GMT",
        "%a %b %e %H:%M:%S %Y",
        "%a, %d %b %Y %H:%M:%S UTC",
    ];
    NAIVE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .map(|naive| naive.and_utc())
    })
}

/// Extracts a positive `max-age` from a `Cache-Control` value.
///
/// The number is read from the digits right after `max-age=`; trailing
/// directives are ignored.
pub fn max_age_seconds(cache_control: &str) -> Option<i64> {
    let lower = cache_control.to_ascii_lowercase();
    let start = lower.find("max-age")? + "max-age".len();
    let rest = lower[start..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse::<i64>().ok().filter(|seconds| *seconds > 0)
}

/// Expiry implied by a `max-age` directive relative to `now`.
pub fn max_age_expiry(cache_control: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    max_age_seconds(cache_control).and_then(|seconds| {
        Duration::try_seconds(seconds).and_then(|lifetime| now.checked_add_signed(lifetime))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc1123() {
        let date = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").expect("rfc1123");
        assert_eq!(date, Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap());
    }

    #[test]
    fn test_parse_rfc850() {
        let date = parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT").expect("rfc850");
        assert_eq!(date, Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap());
    }

    #[test]
    fn test_parse_asctime() {
        let date = parse_http_date("Sun Nov  6 08:49:37 1994").expect("asctime");
        assert_eq!(date, Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap());
    }

    #[test]
    fn test_parse_invalid_dates() {
        assert!(parse_http_date("").is_none());
        assert!(parse_http_date("0").is_none());
        assert!(parse_http_date("-1").is_none());
        assert!(parse_http_date("tomorrow").is_none());
    }

    #[test]
    fn test_max_age_seconds() {
        assert_eq!(max_age_seconds("public, max-age=500000"), Some(500_000));
        assert_eq!(max_age_seconds("max-age=60, must-revalidate"), Some(60));
        assert_eq!(max_age_seconds("Max-Age=10"), Some(10));
        assert_eq!(max_age_seconds("max-age=0"), None);
        assert_eq!(max_age_seconds("no-cache"), None);
        assert_eq!(max_age_seconds("max-age=abc"), None);
    }

    #[test]
    fn test_max_age_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let expiry = max_age_expiry("max-age=3600", now).expect("positive max-age");
        assert_eq!(expiry, Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap());
    }
}
