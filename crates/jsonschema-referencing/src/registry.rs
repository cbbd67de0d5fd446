use std::sync::Arc;

use ahash::AHashMap;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use url::Url;

use crate::{pointer::pointer, uri, DefaultRetriever, Document, Draft, Error, Retrieve};

/// A registry of JSON Schema documents, each identified by its canonical URI.
///
/// Documents are indexed eagerly when added, so every subschema carrying an identifier is
/// immediately addressable through that identifier. Documents that are not present are
/// fetched once through the configured [`Retrieve`] implementation.
///
/// ```rust
/// use referencing::{Draft, Registry, Url};
/// use serde_json::json;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = Registry::new(Draft::Draft7);
/// registry.try_add(
///     "http://example.com/user.json",
///     json!({"definitions": {"name": {"type": "string"}}}),
/// )?;
/// let base = Url::parse("http://example.com/user.json")?;
/// let resolved = registry.resolve(&base, "#/definitions/name")?;
/// assert_eq!(resolved.contents(), &json!({"type": "string"}));
/// # Ok(())
/// # }
/// # example().expect("Example failed");
/// ```
pub struct Registry {
    documents: AHashMap<String, Arc<Document>>,
    /// Every known identifier -> (document URI, JSON Pointer inside that document).
    index: AHashMap<String, (String, String)>,
    retriever: Arc<dyn Retrieve>,
    draft: Draft,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("documents", &self.documents.keys().collect::<Vec<_>>())
            .field("retriever", &"<dyn Retrieve>")
            .field("draft", &self.draft)
            .finish()
    }
}

/// A `$ref` target located inside a registered document.
#[derive(Debug, Clone)]
pub struct Resolved {
    document: Arc<Document>,
    pointer: String,
    base: Arc<Url>,
}

impl Resolved {
    /// The document containing the target.
    #[must_use]
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// JSON Pointer of the target inside its document.
    #[must_use]
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// Base URI in effect at the target.
    #[must_use]
    pub fn base(&self) -> &Arc<Url> {
        &self.base
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.document.draft()
    }

    /// The target subschema.
    #[must_use]
    pub fn contents(&self) -> &Value {
        // Existence is checked before a `Resolved` is handed out
        pointer(self.document.contents(), &self.pointer).unwrap_or(&Value::Null)
    }

    /// Stable key identifying the target: the document URI and the JSON Pointer inside it.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}#{}", self.document.uri(), self.pointer)
    }
}

impl Registry {
    /// Create an empty registry that refuses to fetch unknown documents.
    #[must_use]
    pub fn new(draft: Draft) -> Registry {
        Registry {
            documents: AHashMap::new(),
            index: AHashMap::new(),
            retriever: Arc::new(DefaultRetriever),
            draft,
        }
    }

    /// Use the given retriever for documents that are not registered.
    #[must_use]
    pub fn with_retriever(mut self, retriever: Arc<dyn Retrieve>) -> Registry {
        self.retriever = retriever;
        self
    }

    /// Default draft for documents that do not declare `$schema`.
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// Register a document under the given URI and return it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is not absolute, `$schema` is unknown, or an identifier
    /// inside the document cannot be resolved.
    pub fn try_add(&mut self, uri: &str, contents: Value) -> Result<Arc<Document>, Error> {
        let uri = uri::from_str(uri)?;
        let draft = self.draft.detect(&contents)?;
        Ok(self.insert(Document::new(uri, contents, draft)?))
    }

    /// Register a document with an explicitly chosen draft, ignoring `$schema`.
    ///
    /// # Errors
    ///
    /// Returns an error if an identifier inside the document cannot be resolved.
    pub fn try_add_with_draft(
        &mut self,
        uri: Url,
        contents: Value,
        draft: Draft,
    ) -> Result<Arc<Document>, Error> {
        Ok(self.insert(Document::new(uri, contents, draft)?))
    }

    fn insert(&mut self, document: Document) -> Arc<Document> {
        let document = Arc::new(document);
        let key = document.uri().as_str().to_string();
        for (id, pointer) in document.ids() {
            // The first registration of an identifier wins
            self.index
                .entry(id.to_string())
                .or_insert_with(|| (key.clone(), pointer.to_string()));
        }
        self.documents.insert(key, Arc::clone(&document));
        document
    }

    /// A registered document by its URI.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&Arc<Document>> {
        self.documents.get(uri)
    }

    /// Resolve `reference` against `base`, fetching the target document if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is not a valid URI reference, the target document
    /// cannot be retrieved, or the fragment does not lead to an existing location.
    pub fn resolve(&mut self, base: &Url, reference: &str) -> Result<Resolved, Error> {
        let target = uri::resolve_against(base, reference)?;
        let fragmentless = uri::without_fragment(&target);
        let (document, prefix) = self.locate(&fragmentless)?;
        let fragment = target.fragment().unwrap_or_default();

        if !fragment.is_empty() && !fragment.starts_with('/') {
            // Plain-name fragment, only meaningful through an identifier
            let Some((key, pointer)) = self.index.get(target.as_str()) else {
                return Err(Error::no_such_anchor(fragment));
            };
            let document = self
                .documents
                .get(key)
                .map_or_else(|| Arc::clone(&document), Arc::clone);
            return Ok(resolved(document, pointer.clone()));
        }

        let mut full = prefix;
        let decoded = percent_decode_str(fragment)
            .decode_utf8()
            .map_err(|error| Error::invalid_percent_encoding(fragment, error))?;
        full.push_str(&decoded);
        if pointer(document.contents(), &full).is_none() {
            return Err(Error::pointer_to_nowhere(full));
        }
        Ok(resolved(document, full))
    }

    fn locate(&mut self, fragmentless: &Url) -> Result<(Arc<Document>, String), Error> {
        if let Some((key, pointer)) = self.index.get(fragmentless.as_str()) {
            if let Some(document) = self.documents.get(key) {
                return Ok((Arc::clone(document), pointer.clone()));
            }
        }
        if fragmentless.scheme() == "json-schema" {
            return Err(Error::unretrievable(
                fragmentless.as_str(),
                "No base URI is available".into(),
            ));
        }
        tracing::debug!(uri = fragmentless.as_str(), "Retrieving external document");
        let contents = self
            .retriever
            .retrieve(fragmentless)
            .map_err(|error| Error::unretrievable(fragmentless.as_str(), error))?;
        let draft = self.draft.detect(&contents)?;
        let document = self.insert(Document::new(fragmentless.clone(), contents, draft)?);
        Ok((document, String::new()))
    }
}

fn resolved(document: Arc<Document>, pointer: String) -> Resolved {
    let base = document.base_at(&pointer);
    Resolved {
        document,
        pointer,
        base,
    }
}
