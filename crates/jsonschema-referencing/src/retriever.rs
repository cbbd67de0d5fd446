use core::fmt;

use serde_json::Value;
use url::Url;

/// Trait for retrieving resources from external sources.
///
/// Implementors of this trait can be used to fetch resources that are not
/// initially present in a [`crate::Registry`].
pub trait Retrieve: Send + Sync {
    /// Attempt to retrieve a resource from the given URI.
    ///
    /// # Errors
    ///
    /// If the resource couldn't be retrieved or an error occurred.
    fn retrieve(&self, uri: &Url) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Clone)]
struct DefaultRetrieverError;

impl fmt::Display for DefaultRetrieverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Default retriever does not fetch resources")
    }
}

impl std::error::Error for DefaultRetrieverError {}

/// A retriever that always fails, used as a default when external resource fetching is not needed.
#[derive(Debug, PartialEq, Eq)]
pub struct DefaultRetriever;

impl Retrieve for DefaultRetriever {
    fn retrieve(&self, _: &Url) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(DefaultRetrieverError))
    }
}

impl<F> Retrieve for F
where
    F: Fn(&Url) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> + Send + Sync,
{
    fn retrieve(&self, uri: &Url) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        (self)(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_retriever_refuses() {
        let uri = Url::parse("http://example.com/schema.json").expect("Valid URI");
        let error = DefaultRetriever.retrieve(&uri).expect_err("Should fail");
        assert_eq!(error.to_string(), "Default retriever does not fetch resources");
    }

    #[test]
    fn test_closure_retriever() {
        let retriever = |uri: &Url| -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
            Ok(json!({"title": uri.as_str()}))
        };
        let uri = Url::parse("http://example.com/schema.json").expect("Valid URI");
        let value = retriever.retrieve(&uri).expect("Should succeed");
        assert_eq!(value, json!({"title": "http://example.com/schema.json"}));
    }
}
