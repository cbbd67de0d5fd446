use core::slice;

use serde_json::Value;

use crate::segments::Segment;

/// How a keyword's value contributes subschemas.
pub(crate) enum SubIterBranch<'a> {
    Once(&'a Value),
    Array(slice::Iter<'a, Value>),
    Object(serde_json::map::Iter<'a>),
    /// Only object values are subschemas, e.g. `dependencies` where arrays list property names.
    FilteredObject(serde_json::map::Iter<'a>),
    Empty,
}

/// A schema nested directly inside another schema.
#[derive(Debug)]
pub(crate) struct Subresource<'a> {
    pub(crate) keyword: &'a str,
    pub(crate) segment: Option<Segment<'a>>,
    pub(crate) contents: &'a Value,
}

pub(crate) fn collect<'a>(
    contents: &'a Value,
    object_iter: fn(&'a str, &'a Value) -> SubIterBranch<'a>,
) -> Vec<Subresource<'a>> {
    let mut subresources = Vec::new();
    let Some(schema) = contents.as_object() else {
        return subresources;
    };
    for (keyword, value) in schema {
        let keyword = keyword.as_str();
        match object_iter(keyword, value) {
            SubIterBranch::Once(contents) => subresources.push(Subresource {
                keyword,
                segment: None,
                contents,
            }),
            SubIterBranch::Array(items) => {
                subresources.extend(items.enumerate().map(|(idx, contents)| Subresource {
                    keyword,
                    segment: Some(Segment::Index(idx)),
                    contents,
                }));
            }
            SubIterBranch::Object(entries) => {
                subresources.extend(entries.map(|(key, contents)| Subresource {
                    keyword,
                    segment: Some(Segment::Key(key.as_str())),
                    contents,
                }));
            }
            SubIterBranch::FilteredObject(entries) => {
                subresources.extend(entries.filter(|(_, value)| value.is_object()).map(
                    |(key, contents)| Subresource {
                        keyword,
                        segment: Some(Segment::Key(key.as_str())),
                        contents,
                    },
                ));
            }
            SubIterBranch::Empty => {}
        }
    }
    subresources
}
