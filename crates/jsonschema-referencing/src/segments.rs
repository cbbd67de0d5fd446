/// Represents a single segment in a JSON pointer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Segment<'a> {
    /// A string key for object properties.
    Key(&'a str),
    /// A numeric index for array elements.
    Index(usize),
}

impl<'a> From<&'a str> for Segment<'a> {
    fn from(value: &'a str) -> Self {
        Segment::Key(value)
    }
}

impl From<usize> for Segment<'_> {
    fn from(value: usize) -> Self {
        Segment::Index(value)
    }
}

/// Append a segment to a JSON pointer, escaping `~` and `/` per RFC 6901.
pub(crate) fn push_segment(pointer: &mut String, segment: Segment<'_>) {
    pointer.push('/');
    match segment {
        Segment::Key(key) => {
            for ch in key.chars() {
                match ch {
                    '~' => pointer.push_str("~0"),
                    '/' => pointer.push_str("~1"),
                    _ => pointer.push(ch),
                }
            }
        }
        Segment::Index(idx) => pointer.push_str(&idx.to_string()),
    }
}
