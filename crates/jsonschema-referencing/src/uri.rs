//! URI helpers used by resolution.
use url::Url;

use crate::Error;

/// Base URI assigned to documents that do not declare an identifier of their own.
pub const DEFAULT_ROOT_URI: &str = "json-schema:///";

/// Parse an absolute URI.
///
/// # Errors
///
/// Returns an error if the input is not an absolute URI.
pub fn from_str(uri: &str) -> Result<Url, Error> {
    Url::parse(uri).map_err(|error| Error::invalid_uri(uri, error))
}

/// Resolve a URI reference against a base URI (RFC 3986, section 5).
///
/// # Errors
///
/// Returns an error if the reference cannot be resolved against the base.
pub fn resolve_against(base: &Url, reference: &str) -> Result<Url, Error> {
    base.join(reference)
        .map_err(|error| Error::invalid_uri(reference, error))
}

/// The same URI with its fragment removed.
#[must_use]
pub fn without_fragment(uri: &Url) -> Url {
    let mut uri = uri.clone();
    uri.set_fragment(None);
    uri
}

/// The default base URI for documents without an identifier.
#[must_use]
pub fn default_root() -> Url {
    // The constant is a valid absolute URI
    Url::parse(DEFAULT_ROOT_URI).unwrap_or_else(|_| unreachable!("invalid default root URI"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("http://example.com/root.json", "item.json", "http://example.com/item.json")]
    #[test_case("http://example.com/a/root.json", "../b.json#/x", "http://example.com/b.json#/x")]
    #[test_case("http://example.com/root.json", "#foo", "http://example.com/root.json#foo")]
    #[test_case("json-schema:///", "#/definitions/a", "json-schema:///#/definitions/a")]
    #[test_case("json-schema:///", "other.json", "json-schema:///other.json")]
    #[test_case("json-schema:///", "https://example.com/s", "https://example.com/s")]
    fn resolution(base: &str, reference: &str, expected: &str) {
        let base = from_str(base).expect("Valid base");
        let resolved = resolve_against(&base, reference).expect("Resolvable");
        assert_eq!(resolved.as_str(), expected);
    }

    #[test]
    fn fragment_removal() {
        let uri = from_str("http://example.com/root.json#/definitions").expect("Valid URI");
        assert_eq!(without_fragment(&uri).as_str(), "http://example.com/root.json");
    }

    #[test]
    fn relative_is_rejected() {
        assert!(from_str("relative/path.json").is_err());
    }
}
