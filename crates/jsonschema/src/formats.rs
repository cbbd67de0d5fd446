//! Checkers for the `format` keyword.
//!
//! Every draft enables its own set of built-in formats. Unknown format names are ignored, as the
//! keyword is advisory.
use std::{
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
    sync::Arc,
};

use email_address::EmailAddress;
use referencing::Draft;
use url::Url;

/// A format checker.
pub trait Format: Send + Sync {
    /// Check a string, returning a failure message if it does not conform.
    fn validate(&self, subject: &str) -> Option<String>;
}

impl<F> Format for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn validate(&self, subject: &str) -> Option<String> {
        self(subject)
    }
}

struct Builtin {
    name: &'static str,
    check: fn(&str) -> bool,
}

impl Format for Builtin {
    fn validate(&self, subject: &str) -> Option<String> {
        if (self.check)(subject) {
            None
        } else {
            Some(format!("not a valid {}", self.name))
        }
    }
}

/// ISO 8601 durations, e.g. `P1DT12H`.
///
/// Not enabled by default; register it with
/// [`LoaderOptions::with_format`](crate::LoaderOptions::with_format).
#[derive(Debug, Clone, Copy)]
pub struct Duration;

impl Format for Duration {
    fn validate(&self, subject: &str) -> Option<String> {
        if is_valid_duration(subject) {
            None
        } else {
            Some("not a valid duration".to_string())
        }
    }
}

/// Built-in formats with the first draft that defines them.
const BUILTINS: &[(&'static str, Draft, fn(&str) -> bool)] = &[
    ("date-time", Draft::Draft4, is_valid_datetime),
    ("email", Draft::Draft4, is_valid_email),
    ("hostname", Draft::Draft4, is_valid_hostname),
    ("ipv4", Draft::Draft4, is_valid_ipv4),
    ("ipv6", Draft::Draft4, is_valid_ipv6),
    ("uri", Draft::Draft4, is_valid_uri),
    ("uri-reference", Draft::Draft6, is_valid_uri_reference),
    ("uri-template", Draft::Draft6, is_valid_uri_template),
    ("json-pointer", Draft::Draft6, is_valid_json_pointer),
    ("date", Draft::Draft7, is_valid_date),
    ("time", Draft::Draft7, is_valid_time),
    ("regex", Draft::Draft7, is_valid_regex),
    ("relative-json-pointer", Draft::Draft7, is_valid_relative_json_pointer),
    ("idn-email", Draft::Draft7, is_valid_email),
    ("idn-hostname", Draft::Draft7, is_valid_idn_hostname),
    ("iri", Draft::Draft7, is_valid_iri),
    ("iri-reference", Draft::Draft7, is_valid_iri_reference),
];

pub(crate) fn builtin(name: &str, draft: Draft) -> Option<Arc<dyn Format>> {
    BUILTINS
        .iter()
        .find(|(candidate, since, _)| *candidate == name && draft >= *since)
        .map(|&(name, _, check)| Arc::new(Builtin { name, check }) as Arc<dyn Format>)
}

fn parse_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0, |acc, digit| acc * 10 + u32::from(digit - b'0')),
    )
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_valid_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let (Some(year), Some(month), Some(day)) = (
        parse_digits(&bytes[..4]),
        parse_digits(&bytes[5..7]),
        parse_digits(&bytes[8..]),
    ) else {
        return false;
    };
    (1..=12).contains(&month) && day >= 1 && day <= days_in_month(year, month)
}

fn is_valid_time(time: &str) -> bool {
    let bytes = time.as_bytes();
    if bytes.len() < 9 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }
    let (Some(hour), Some(minute), Some(second)) = (
        parse_digits(&bytes[..2]),
        parse_digits(&bytes[3..5]),
        parse_digits(&bytes[6..8]),
    ) else {
        return false;
    };
    if hour > 23 || minute > 59 || second > 60 {
        return false;
    }
    let mut rest = &bytes[8..];
    if let Some(fraction) = rest.strip_prefix(b".") {
        let digits = fraction.iter().take_while(|byte| byte.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        rest = &fraction[digits..];
    }
    let (offset_hour, offset_minute, sign) = match rest {
        [b'Z' | b'z'] => (0, 0, 0i64),
        [sign @ (b'+' | b'-'), h1, h2, b':', m1, m2] => {
            let (Some(offset_hour), Some(offset_minute)) =
                (parse_digits(&[*h1, *h2]), parse_digits(&[*m1, *m2]))
            else {
                return false;
            };
            if offset_hour > 23 || offset_minute > 59 {
                return false;
            }
            (offset_hour, offset_minute, if *sign == b'+' { 1 } else { -1 })
        }
        _ => return false,
    };
    if second == 60 {
        // Leap seconds happen at 23:59:60 UTC only
        let local = i64::from(hour * 60 + minute);
        let offset = sign * i64::from(offset_hour * 60 + offset_minute);
        let utc = (local - offset).rem_euclid(24 * 60);
        return utc == 23 * 60 + 59;
    }
    true
}

fn is_valid_datetime(datetime: &str) -> bool {
    match datetime.find(['T', 't']) {
        Some(idx) => is_valid_date(&datetime[..idx]) && is_valid_time(&datetime[idx + 1..]),
        None => false,
    }
}

fn is_valid_email(email: &str) -> bool {
    EmailAddress::is_valid(email)
}

fn is_valid_hostname(hostname: &str) -> bool {
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    if hostname.is_empty() || hostname.len() > 253 {
        return false;
    }
    hostname.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
    })
}

fn is_valid_idn_hostname(hostname: &str) -> bool {
    idna::domain_to_ascii_strict(hostname).is_ok_and(|ascii| is_valid_hostname(&ascii))
}

fn is_valid_ipv4(ip: &str) -> bool {
    Ipv4Addr::from_str(ip).is_ok()
}

fn is_valid_ipv6(ip: &str) -> bool {
    Ipv6Addr::from_str(ip).is_ok()
}

fn is_valid_iri(iri: &str) -> bool {
    !iri.chars().any(|ch| ch.is_whitespace() || ch == '\\') && Url::parse(iri).is_ok()
}

fn is_valid_uri(uri: &str) -> bool {
    uri.is_ascii() && is_valid_iri(uri)
}

fn is_valid_iri_reference(reference: &str) -> bool {
    if reference.chars().any(|ch| ch.is_whitespace() || ch == '\\') {
        return false;
    }
    if Url::parse(reference).is_ok() {
        return true;
    }
    Url::parse("http://example.com/")
        .and_then(|base| base.join(reference))
        .is_ok()
}

fn is_valid_uri_reference(reference: &str) -> bool {
    reference.is_ascii() && is_valid_iri_reference(reference)
}

fn is_valid_uri_template(template: &str) -> bool {
    let mut in_expression = false;
    for ch in template.chars() {
        match ch {
            '{' if in_expression => return false,
            '{' => in_expression = true,
            '}' if !in_expression => return false,
            '}' => in_expression = false,
            _ => {}
        }
    }
    !in_expression
}

fn is_valid_json_pointer(pointer: &str) -> bool {
    if pointer.is_empty() {
        return true;
    }
    if !pointer.starts_with('/') {
        return false;
    }
    let mut chars = pointer.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' && !matches!(chars.next(), Some('0' | '1')) {
            return false;
        }
    }
    true
}

fn is_valid_relative_json_pointer(pointer: &str) -> bool {
    let digits = pointer.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || (digits > 1 && pointer.starts_with('0')) {
        return false;
    }
    let rest = &pointer[digits..];
    rest == "#" || is_valid_json_pointer(rest)
}

fn is_valid_regex(pattern: &str) -> bool {
    fancy_regex::Regex::new(pattern).is_ok()
}

fn is_valid_duration(duration: &str) -> bool {
    let Some(rest) = duration.strip_prefix('P') else {
        return false;
    };
    let (date, time) = match rest.split_once('T') {
        Some((date, time)) => {
            if time.is_empty() {
                return false;
            }
            (date, Some(time))
        }
        None => (rest, None),
    };
    if date.is_empty() && time.is_none() {
        return false;
    }
    if let Some(weeks) = date.strip_suffix('W') {
        // Weeks cannot be combined with other units
        return time.is_none() && parse_digits(weeks.as_bytes()).is_some();
    }
    duration_units(date, &['Y', 'M', 'D'])
        && time.map_or(true, |time| duration_units(time, &['H', 'M', 'S']))
}

/// Number-designator pairs in the given order, each designator at most once.
fn duration_units(part: &str, designators: &[char]) -> bool {
    let mut allowed = designators.iter();
    let mut digits = 0;
    for ch in part.chars() {
        if ch.is_ascii_digit() {
            digits += 1;
        } else {
            if digits == 0 || !allowed.any(|designator| *designator == ch) {
                return false;
            }
            digits = 0;
        }
    }
    digits == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2024-02-29", true)]
    #[test_case("2023-02-29", false)]
    #[test_case("2023-13-01", false)]
    #[test_case("2023-1-01", false)]
    fn test_date(value: &str, expected: bool) {
        assert_eq!(is_valid_date(value), expected);
    }

    #[test_case("12:30:00Z", true)]
    #[test_case("12:30:00.123+02:00", true)]
    #[test_case("23:59:60Z", true; "leap second")]
    #[test_case("22:59:60-01:00", true; "leap second with offset")]
    #[test_case("12:59:60Z", false; "misplaced leap second")]
    #[test_case("24:00:00Z", false)]
    #[test_case("12:30:00", false; "missing offset")]
    fn test_time(value: &str, expected: bool) {
        assert_eq!(is_valid_time(value), expected);
    }

    #[test_case("1963-06-19T08:30:06.283185Z", true)]
    #[test_case("1963-06-19t08:30:06z", true)]
    #[test_case("1963-06-19 08:30:06Z", false)]
    fn test_datetime(value: &str, expected: bool) {
        assert_eq!(is_valid_datetime(value), expected);
    }

    #[test_case("example.com", true)]
    #[test_case("-example.com", false)]
    #[test_case("a..b", false)]
    #[test_case("under_score.com", false)]
    fn test_hostname(value: &str, expected: bool) {
        assert_eq!(is_valid_hostname(value), expected);
    }

    #[test_case("", true)]
    #[test_case("/foo/0", true)]
    #[test_case("/a~1b", true)]
    #[test_case("/a~2b", false)]
    #[test_case("foo", false)]
    fn test_json_pointer(value: &str, expected: bool) {
        assert_eq!(is_valid_json_pointer(value), expected);
    }

    #[test_case("0", true)]
    #[test_case("1/foo", true)]
    #[test_case("2#", true)]
    #[test_case("01", false)]
    #[test_case("/foo", false)]
    fn test_relative_json_pointer(value: &str, expected: bool) {
        assert_eq!(is_valid_relative_json_pointer(value), expected);
    }

    #[test_case("P4DT12H30M5S", true)]
    #[test_case("P1W", true)]
    #[test_case("PT36H", true)]
    #[test_case("P", false)]
    #[test_case("PT", false)]
    #[test_case("P1D2H", false)]
    #[test_case("P2D1Y", false)]
    #[test_case("P1Y2W", false)]
    fn test_duration(value: &str, expected: bool) {
        assert_eq!(is_valid_duration(value), expected);
    }

    #[test_case("http://example.com/{id}", true)]
    #[test_case("http://example.com/{id", false)]
    #[test_case("http://example.com/{{id}}", false)]
    fn test_uri_template(value: &str, expected: bool) {
        assert_eq!(is_valid_uri_template(value), expected);
    }

    #[test_case("uri-reference", Draft::Draft4, false)]
    #[test_case("uri-reference", Draft::Draft6, true)]
    #[test_case("regex", Draft::Draft6, false)]
    #[test_case("regex", Draft::Draft7, true)]
    #[test_case("duration", Draft::Draft7, false)]
    #[test_case("unknown", Draft::Draft7, false)]
    fn test_availability(name: &str, draft: Draft, expected: bool) {
        assert_eq!(builtin(name, draft).is_some(), expected);
    }

    #[test]
    fn test_builtin_message() {
        let checker = builtin("ipv4", Draft::Draft4).expect("Built-in format");
        assert_eq!(checker.validate("127.0.0.1"), None);
        assert_eq!(
            checker.validate("127.0.0.300"),
            Some("not a valid ipv4".to_string())
        );
    }
}
