//! Fetching of documents referenced by `$ref` that are not part of the loaded schema.
use referencing::Retrieve;
use serde_json::Value;
use url::Url;

/// Retrieves remote documents over HTTP(S) and from the local filesystem.
///
/// HTTP support requires the `resolve-http` feature, file support the `resolve-file` one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRetriever;

impl Retrieve for DefaultRetriever {
    #[allow(unused)]
    fn retrieve(&self, uri: &Url) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        match uri.scheme() {
            "http" | "https" => {
                #[cfg(feature = "resolve-http")]
                {
                    tracing::debug!(%uri, "Fetching remote document");
                    Ok(reqwest::blocking::get(uri.as_str())?
                        .error_for_status()?
                        .json()?)
                }
                #[cfg(not(feature = "resolve-http"))]
                Err("`resolve-http` feature or a custom resolver is required to resolve external schemas via HTTP".into())
            }
            "file" => {
                #[cfg(feature = "resolve-file")]
                {
                    let path = uri
                        .to_file_path()
                        .map_err(|()| format!("Invalid file path: {uri}"))?;
                    tracing::debug!(path = %path.display(), "Reading local document");
                    let file = std::fs::File::open(path)?;
                    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
                }
                #[cfg(not(feature = "resolve-file"))]
                Err("`resolve-file` feature or a custom resolver is required to resolve external schemas via files".into())
            }
            scheme => Err(format!("Unknown scheme {scheme}").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use referencing::Retrieve;
    use serde_json::json;
    use url::Url;

    use super::DefaultRetriever;

    #[cfg(feature = "resolve-file")]
    #[test]
    fn test_retrieve_from_file() {
        let mut temp_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let schema = json!({"type": "string"});
        write!(temp_file, "{schema}").expect("Failed to write to temp file");
        let uri = Url::from_file_path(temp_file.path()).expect("Absolute path");
        let retrieved = DefaultRetriever
            .retrieve(&uri)
            .expect("Retrieval should succeed");
        assert_eq!(retrieved, schema);
    }

    #[cfg(feature = "resolve-file")]
    #[test]
    fn test_file_reference_in_schema() {
        let mut temp_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        write!(temp_file, r#"{{"definitions": {{"positive": {{"minimum": 0}}}}}}"#)
            .expect("Failed to write to temp file");
        let uri = Url::from_file_path(temp_file.path()).expect("Absolute path");
        let schema = crate::load(&json!({
            "properties": {"count": {"$ref": format!("{uri}#/definitions/positive")}}
        }))
        .expect("Valid schema");
        assert!(schema.is_valid(&json!({"count": 1})));
        assert!(!schema.is_valid(&json!({"count": -1})));
    }

    #[test]
    fn test_unknown_scheme() {
        let uri = Url::parse("ftp://example.com/schema.json").expect("Valid URI");
        let error = DefaultRetriever
            .retrieve(&uri)
            .expect_err("Should fail");
        assert_eq!(error.to_string(), "Unknown scheme ftp");
    }
}
