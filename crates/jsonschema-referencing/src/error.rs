use core::fmt;
use std::str::Utf8Error;

/// Errors that can occur while resolving references.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A document is not present in the registry and retrieving it failed.
    Unretrievable {
        uri: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A JSON Pointer leads to a part of a document that does not exist.
    PointerToNowhere { pointer: String },
    /// A JSON Pointer contains an invalid percent-encoded sequence.
    InvalidPercentEncoding { pointer: String, source: Utf8Error },
    /// A URI or URI reference could not be parsed or resolved.
    InvalidUri { uri: String, source: url::ParseError },
    /// A plain-name fragment does not match any location-independent identifier.
    NoSuchAnchor { anchor: String },
    /// The `$schema` keyword names a meta-schema this library does not know.
    UnknownSpecification { specification: String },
}

impl Error {
    pub(crate) fn unretrievable(
        uri: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Error {
        Error::Unretrievable {
            uri: uri.into(),
            source,
        }
    }

    pub(crate) fn pointer_to_nowhere(pointer: impl Into<String>) -> Error {
        Error::PointerToNowhere {
            pointer: pointer.into(),
        }
    }

    pub(crate) fn invalid_percent_encoding(pointer: impl Into<String>, source: Utf8Error) -> Error {
        Error::InvalidPercentEncoding {
            pointer: pointer.into(),
            source,
        }
    }

    pub(crate) fn invalid_uri(uri: impl Into<String>, source: url::ParseError) -> Error {
        Error::InvalidUri {
            uri: uri.into(),
            source,
        }
    }

    pub(crate) fn unknown_specification(specification: impl Into<String>) -> Error {
        Error::UnknownSpecification {
            specification: specification.into(),
        }
    }

    pub(crate) fn no_such_anchor(anchor: impl Into<String>) -> Error {
        Error::NoSuchAnchor {
            anchor: anchor.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unretrievable { uri, source } => {
                f.write_fmt(format_args!("Resource '{uri}' is not present in a registry and retrieving it failed: {source}"))
            }
            Error::PointerToNowhere { pointer } => {
                f.write_fmt(format_args!("Pointer '{pointer}' does not exist"))
            }
            Error::InvalidPercentEncoding { pointer, .. } => {
                f.write_fmt(format_args!("Invalid percent encoding in pointer '{pointer}': the decoded bytes do not represent valid UTF-8"))
            }
            Error::InvalidUri { uri, source } => {
                f.write_fmt(format_args!("Invalid URI reference '{uri}': {source}"))
            }
            Error::NoSuchAnchor { anchor } => {
                f.write_fmt(format_args!("Anchor '{anchor}' does not exist"))
            }
            Error::UnknownSpecification { specification } => {
                f.write_fmt(format_args!("Unknown meta-schema: '{specification}'"))
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Unretrievable { source, .. } => Some(&**source),
            Error::InvalidPercentEncoding { source, .. } => Some(source),
            Error::InvalidUri { source, .. } => Some(source),
            Error::PointerToNowhere { .. }
            | Error::NoSuchAnchor { .. }
            | Error::UnknownSpecification { .. } => None,
        }
    }
}
