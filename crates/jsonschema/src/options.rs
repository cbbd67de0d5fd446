use std::sync::Arc;

use ahash::AHashMap;
use referencing::{Draft, Retrieve};
use serde_json::Value;

use crate::{
    error::SchemaError,
    formats::{self, Format},
    loader,
    retriever::DefaultRetriever,
    schema::Schema,
};

/// Configuration options for loading JSON Schemas.
#[derive(Clone)]
pub struct LoaderOptions {
    pub(crate) draft: Option<Draft>,
    pub(crate) retriever: Arc<dyn Retrieve>,
    pub(crate) formats: AHashMap<String, Arc<dyn Format>>,
    pub(crate) validate_formats: bool,
    pub(crate) pattern_options: PatternOptions,
    pub(crate) nullable: bool,
    pub(crate) defaults: bool,
    pub(crate) base_uri: Option<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        LoaderOptions {
            draft: None,
            retriever: Arc::new(DefaultRetriever),
            formats: AHashMap::default(),
            validate_formats: true,
            pattern_options: PatternOptions::default(),
            nullable: false,
            defaults: false,
            base_uri: None,
        }
    }
}

impl std::fmt::Debug for LoaderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("draft", &self.draft)
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .field("validate_formats", &self.validate_formats)
            .field("pattern_options", &self.pattern_options)
            .field("nullable", &self.nullable)
            .field("defaults", &self.defaults)
            .field("base_uri", &self.base_uri)
            .finish_non_exhaustive()
    }
}

impl LoaderOptions {
    /// Load a schema with these options.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema is malformed or a reference cannot be resolved.
    pub fn build(&self, schema: &Value) -> Result<Schema, SchemaError> {
        loader::load(self, schema)
    }

    /// Force a draft instead of detecting it from `$schema`.
    #[must_use]
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = Some(draft);
        self
    }

    /// Use a custom retriever for remote documents.
    #[must_use]
    pub fn with_retriever(mut self, retriever: impl Retrieve + 'static) -> Self {
        self.retriever = Arc::new(retriever);
        self
    }

    /// Register a format checker. It takes precedence over a built-in one with the same name.
    ///
    /// ```rust
    /// # use serde_json::json;
    /// let schema = jsonschema_graph::options()
    ///     .with_format("even-length", |value: &str| {
    ///         (value.len() % 2 != 0).then(|| "length is odd".to_string())
    ///     })
    ///     .build(&json!({"format": "even-length"}))
    ///     .expect("Valid schema");
    /// assert!(schema.is_valid(&json!("ab")));
    /// assert!(!schema.is_valid(&json!("abc")));
    /// ```
    #[must_use]
    pub fn with_format<N, F>(mut self, name: N, format: F) -> Self
    where
        N: Into<String>,
        F: Format + 'static,
    {
        self.formats.insert(name.into(), Arc::new(format));
        self
    }

    /// Whether the `format` keyword is checked at all.
    #[must_use]
    pub fn should_validate_formats(mut self, validate_formats: bool) -> Self {
        self.validate_formats = validate_formats;
        self
    }

    #[must_use]
    pub fn with_pattern_options(mut self, options: PatternOptions) -> Self {
        self.pattern_options = options;
        self
    }

    /// Honor the OpenAPI `nullable` keyword.
    #[must_use]
    pub fn nullable_support(mut self, enabled: bool) -> Self {
        self.nullable = enabled;
        self
    }

    /// Capture `default` values so they can be read from the loaded schema.
    #[must_use]
    pub fn use_defaults(mut self, enabled: bool) -> Self {
        self.defaults = enabled;
        self
    }

    /// Base URI of the root document, used to resolve relative references.
    #[must_use]
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Format checker for `name` under `draft`, custom ones first.
    pub(crate) fn format(&self, name: &str, draft: Draft) -> Option<Arc<dyn Format>> {
        if !self.validate_formats {
            return None;
        }
        self.formats
            .get(name)
            .cloned()
            .or_else(|| formats::builtin(name, draft))
    }
}

/// Regular expression engine used for `pattern` and `patternProperties`.
#[derive(Debug, Clone, Copy)]
pub enum PatternOptions {
    /// Backtracking engine supporting lookarounds and backreferences.
    FancyRegex {
        backtrack_limit: Option<usize>,
        size_limit: Option<usize>,
        dfa_size_limit: Option<usize>,
    },
    /// Linear time engine without lookarounds.
    Regex {
        size_limit: Option<usize>,
        dfa_size_limit: Option<usize>,
    },
}

impl Default for PatternOptions {
    fn default() -> Self {
        PatternOptions::fancy_regex()
    }
}

impl PatternOptions {
    #[must_use]
    pub fn fancy_regex() -> Self {
        PatternOptions::FancyRegex {
            backtrack_limit: None,
            size_limit: None,
            dfa_size_limit: None,
        }
    }

    #[must_use]
    pub fn regex() -> Self {
        PatternOptions::Regex {
            size_limit: None,
            dfa_size_limit: None,
        }
    }

    /// Limit the amount of backtracking; ignored by the linear time engine.
    #[must_use]
    pub fn backtrack_limit(mut self, limit: usize) -> Self {
        if let PatternOptions::FancyRegex {
            backtrack_limit, ..
        } = &mut self
        {
            *backtrack_limit = Some(limit);
        }
        self
    }

    #[must_use]
    pub fn size_limit(mut self, limit: usize) -> Self {
        match &mut self {
            PatternOptions::FancyRegex { size_limit, .. }
            | PatternOptions::Regex { size_limit, .. } => *size_limit = Some(limit),
        }
        self
    }

    #[must_use]
    pub fn dfa_size_limit(mut self, limit: usize) -> Self {
        match &mut self {
            PatternOptions::FancyRegex { dfa_size_limit, .. }
            | PatternOptions::Regex { dfa_size_limit, .. } => *dfa_size_limit = Some(limit),
        }
        self
    }
}

/// Whether validation stops at the first violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Gather every independent violation.
    #[default]
    Collecting,
    /// Abort on the first violation.
    EarlyFail,
}

/// Direction of the data being validated, checked against `readOnly` / `writeOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadWriteContext {
    /// Data returned by a server; `writeOnly` values must be absent.
    Read,
    /// Data sent to a server; `readOnly` values must be absent.
    Write,
}

/// Per-run validation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationConfig {
    pub(crate) mode: ValidationMode,
    pub(crate) read_write_context: Option<ReadWriteContext>,
}

impl ValidationConfig {
    #[must_use]
    pub fn new(mode: ValidationMode) -> Self {
        ValidationConfig {
            mode,
            read_write_context: None,
        }
    }

    #[must_use]
    pub fn with_read_write_context(mut self, context: ReadWriteContext) -> Self {
        self.read_write_context = Some(context);
        self
    }

    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }
}
