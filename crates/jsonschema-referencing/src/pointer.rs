use std::borrow::Cow;

use serde_json::Value;

/// Look up a value by a JSON Pointer (RFC 6901).
///
/// Returns `None` if any segment of the pointer does not lead to an existing value.
#[must_use]
pub fn pointer<'a>(document: &'a Value, pointer: &str) -> Option<&'a Value> {
    if pointer.is_empty() {
        return Some(document);
    }
    if !pointer.starts_with('/') {
        return None;
    }
    pointer
        .split('/')
        .skip(1)
        .map(unescape_segment)
        .try_fold(document, |target, token| match target {
            Value::Object(map) => map.get(&*token),
            Value::Array(list) => parse_index(&token).and_then(|x| list.get(x)),
            _ => None,
        })
}

/// Parse an array index from a pointer segment.
///
/// Leading zeros and signs are rejected, as RFC 6901 requires.
#[must_use]
pub fn parse_index(s: &str) -> Option<usize> {
    if s.starts_with('+') || (s.starts_with('0') && s.len() != 1) {
        return None;
    }
    s.parse().ok()
}

/// Unescape JSON Pointer path segment by converting `~1` to `/` and `~0` to `~`.
#[must_use]
pub fn unescape_segment(mut segment: &str) -> Cow<'_, str> {
    // Naively, checking for `~` and then replacing implies two passes
    // over the input buffer. First, search in the first `~` in the input.
    let Some(mut tilde_idx) = segment.find('~') else {
        return Cow::Borrowed(segment);
    };
    let mut buffer = String::with_capacity(segment.len());
    loop {
        // Copy everything before the `~`
        let (before, after) = segment.split_at(tilde_idx);
        buffer.push_str(before);
        // Consume `~`
        segment = &after[1..];
        // Replace the escaped sequence
        if segment.starts_with('1') {
            buffer.push('/');
            segment = &segment[1..];
        } else if segment.starts_with('0') {
            buffer.push('~');
            segment = &segment[1..];
        } else {
            buffer.push('~');
        }
        if let Some(next) = segment.find('~') {
            tilde_idx = next;
        } else {
            buffer.push_str(segment);
            break;
        }
    }
    Cow::Owned(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("", Some(&json!({"a/b": [1, {"m~n": 2}], "": 3})); "whole document")]
    #[test_case("/a~1b/0", Some(&json!(1)); "escaped slash")]
    #[test_case("/a~1b/1/m~0n", Some(&json!(2)); "escaped tilde")]
    #[test_case("/", Some(&json!(3)); "empty key")]
    #[test_case("/a~1b/01", None; "leading zero index")]
    #[test_case("/missing", None; "missing key")]
    #[test_case("a", None; "no leading slash")]
    fn lookup(ptr: &str, expected: Option<&Value>) {
        let document = json!({"a/b": [1, {"m~n": 2}], "": 3});
        assert_eq!(pointer(&document, ptr), expected);
    }

    #[test_case("abc", "abc")]
    #[test_case("a~1b", "a/b")]
    #[test_case("a~0b", "a~b")]
    #[test_case("~01", "~1")]
    #[test_case("a~", "a~")]
    fn unescape(input: &str, expected: &str) {
        assert_eq!(unescape_segment(input), expected);
    }

    #[test_case("0", Some(0))]
    #[test_case("10", Some(10))]
    #[test_case("01", None)]
    #[test_case("+1", None)]
    #[test_case("-1", None)]
    fn index(input: &str, expected: Option<usize>) {
        assert_eq!(parse_index(input), expected);
    }
}
