use std::{collections::VecDeque, sync::Arc};

use ahash::AHashMap;
use serde_json::Value;
use url::Url;

use crate::{segments::push_segment, uri, Draft, Error};

/// A JSON document with an index of the identifiers it declares.
///
/// Building a document walks it once and records, for every subschema that carries an
/// identifier, the JSON Pointer where it lives and the base URI in effect below it.
#[derive(Debug)]
pub struct Document {
    uri: Arc<Url>,
    contents: Arc<Value>,
    draft: Draft,
    /// Absolute identifier (plain-name fragments included) -> JSON Pointer.
    ids: AHashMap<String, String>,
    /// JSON Pointer -> base URI, one entry per identifier-carrying subschema.
    scopes: Vec<(String, Arc<Url>)>,
}

impl Document {
    /// Index a document retrieved from (or assigned to) `uri`.
    ///
    /// # Errors
    ///
    /// Returns an error if an identifier cannot be resolved to an absolute URI.
    pub fn new(uri: Url, contents: Value, draft: Draft) -> Result<Document, Error> {
        let uri = Arc::new(uri::without_fragment(&uri));
        let mut ids = AHashMap::new();
        let mut scopes = Vec::new();
        ids.insert(uri.as_str().to_string(), String::new());

        {
            let mut queue = VecDeque::new();
            queue.push_back((String::new(), Arc::clone(&uri), &contents));
            while let Some((pointer, mut base, schema)) = queue.pop_front() {
                if !draft.merges_ref_siblings()
                    && schema.as_object().is_some_and(|object| object.contains_key("$ref"))
                {
                    // Every other keyword next to `$ref` is ignored, identifiers included
                    if pointer.is_empty() {
                        scopes.push((pointer, base));
                    }
                    continue;
                }
                if let Some(id) = draft.id_of(schema) {
                    let resolved = uri::resolve_against(&base, id)?;
                    match resolved.fragment() {
                        Some(fragment) if !fragment.is_empty() && !fragment.starts_with('/') => {
                            // Location-independent identifier, e.g. `"$id": "#foo"`
                            ids.insert(resolved.as_str().to_string(), pointer.clone());
                            let fragmentless = uri::without_fragment(&resolved);
                            if fragmentless != *base {
                                ids.entry(fragmentless.as_str().to_string())
                                    .or_insert_with(|| pointer.clone());
                                base = Arc::new(fragmentless);
                            }
                        }
                        _ => {
                            let fragmentless = uri::without_fragment(&resolved);
                            ids.entry(fragmentless.as_str().to_string())
                                .or_insert_with(|| pointer.clone());
                            base = Arc::new(fragmentless);
                        }
                    }
                    scopes.push((pointer.clone(), Arc::clone(&base)));
                } else if pointer.is_empty() {
                    scopes.push((String::new(), Arc::clone(&base)));
                }
                for subresource in draft.subresources_of(schema) {
                    let mut child = pointer.clone();
                    push_segment(&mut child, subresource.keyword.into());
                    if let Some(segment) = subresource.segment {
                        push_segment(&mut child, segment);
                    }
                    queue.push_back((child, Arc::clone(&base), subresource.contents));
                }
            }
        }
        Ok(Document {
            uri,
            contents: Arc::new(contents),
            draft,
            ids,
            scopes,
        })
    }

    /// The URI this document was registered under, without a fragment.
    #[must_use]
    pub fn uri(&self) -> &Arc<Url> {
        &self.uri
    }

    #[must_use]
    pub fn contents(&self) -> &Value {
        &self.contents
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// JSON Pointer of the subschema declaring the given absolute identifier.
    #[must_use]
    pub fn lookup_id(&self, id: &str) -> Option<&str> {
        self.ids.get(id).map(String::as_str)
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = (&str, &str)> {
        self.ids
            .iter()
            .map(|(id, pointer)| (id.as_str(), pointer.as_str()))
    }

    /// Base URI in effect at the given JSON Pointer.
    ///
    /// That is the identifier of the closest enclosing subschema declaring one, or the
    /// document URI.
    #[must_use]
    pub fn base_at(&self, pointer: &str) -> Arc<Url> {
        let mut best: Option<&(String, Arc<Url>)> = None;
        for scope in &self.scopes {
            let prefix = scope.0.as_str();
            let encloses = pointer == prefix
                || (pointer.starts_with(prefix) && pointer[prefix.len()..].starts_with('/'));
            if encloses && best.map_or(true, |current| current.0.len() < prefix.len()) {
                best = Some(scope);
            }
        }
        best.map_or_else(|| Arc::clone(&self.uri), |scope| Arc::clone(&scope.1))
    }
}
