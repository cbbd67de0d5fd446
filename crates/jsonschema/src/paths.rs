//! Facilities for working with paths within schemas or validated instances.
use core::fmt;
use std::sync::Arc;

/// A node in a linked list representing a JSON pointer.
///
/// `LazyLocation` is used to efficiently build JSON pointers during validation.
/// It only materializes into a [`Location`] when a failure has to be reported.
#[derive(Debug, Clone, Copy)]
pub struct LazyLocation<'a> {
    segment: Option<LocationSegment<'a>>,
    parent: Option<&'a LazyLocation<'a>>,
}

impl Default for LazyLocation<'_> {
    fn default() -> Self {
        LazyLocation::new()
    }
}

impl<'a> LazyLocation<'a> {
    /// Create a root node of a JSON pointer.
    #[must_use]
    pub const fn new() -> Self {
        LazyLocation {
            segment: None,
            parent: None,
        }
    }

    /// Push a new segment to the JSON pointer.
    #[inline]
    #[must_use]
    pub fn push(&'a self, segment: impl Into<LocationSegment<'a>>) -> Self {
        LazyLocation {
            segment: Some(segment.into()),
            parent: Some(self),
        }
    }
}

impl From<&LazyLocation<'_>> for Location {
    fn from(value: &LazyLocation<'_>) -> Self {
        let mut segments = Vec::new();
        let mut head = Some(value);
        while let Some(node) = head {
            if let Some(segment) = node.segment {
                segments.push(segment);
            }
            head = node.parent;
        }
        let mut buffer = String::new();
        for segment in segments.into_iter().rev() {
            push_escaped(&mut buffer, segment);
        }
        Location(Arc::new(buffer))
    }
}

/// A single segment of a JSON pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSegment<'a> {
    /// Property name within a JSON object.
    Property(&'a str),
    /// Index within a JSON array.
    Index(usize),
}

impl<'a> From<&'a str> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a str) -> LocationSegment<'a> {
        LocationSegment::Property(value)
    }
}

impl<'a> From<&'a String> for LocationSegment<'a> {
    #[inline]
    fn from(value: &'a String) -> LocationSegment<'a> {
        LocationSegment::Property(value)
    }
}

impl From<usize> for LocationSegment<'_> {
    #[inline]
    fn from(value: usize) -> Self {
        LocationSegment::Index(value)
    }
}

fn push_escaped(buffer: &mut String, segment: LocationSegment<'_>) {
    buffer.push('/');
    match segment {
        LocationSegment::Property(property) => {
            for ch in property.chars() {
                match ch {
                    '~' => buffer.push_str("~0"),
                    '/' => buffer.push_str("~1"),
                    _ => buffer.push(ch),
                }
            }
        }
        LocationSegment::Index(idx) => buffer.push_str(&idx.to_string()),
    }
}

/// A cheap to clone JSON pointer that represents a location within a schema or an instance.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Location(Arc<String>);

impl serde::Serialize for Location {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl Location {
    /// Create a new, empty `Location`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment, escaping it as RFC 6901 requires.
    #[must_use]
    pub fn join<'a>(&self, segment: impl Into<LocationSegment<'a>>) -> Self {
        let mut buffer = String::with_capacity(self.0.len() + 8);
        buffer.push_str(&self.0);
        push_escaped(&mut buffer, segment.into());
        Location(Arc::new(buffer))
    }

    /// Build a location from an already escaped JSON pointer.
    #[must_use]
    pub fn from_pointer(pointer: &str) -> Self {
        Location(Arc::new(pointer.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
