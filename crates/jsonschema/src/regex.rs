use std::fmt;

use crate::options::PatternOptions;

pub(crate) trait RegexEngine: Send + Sync {
    type Error;

    fn is_match(&self, text: &str) -> Result<bool, Self::Error>;

    fn pattern(&self) -> &str;
}

impl RegexEngine for fancy_regex::Regex {
    type Error = fancy_regex::Error;

    fn is_match(&self, text: &str) -> Result<bool, Self::Error> {
        fancy_regex::Regex::is_match(self, text)
    }

    fn pattern(&self) -> &str {
        self.as_str()
    }
}

impl RegexEngine for regex::Regex {
    type Error = regex::Error;

    fn is_match(&self, text: &str) -> Result<bool, Self::Error> {
        Ok(regex::Regex::is_match(self, text))
    }

    fn pattern(&self) -> &str {
        self.as_str()
    }
}

/// [`RegexEngine`] for literal patterns, either `starts_with` (prefix) or `==` (exact).
#[derive(Debug)]
pub(crate) enum LiteralMatcher {
    Prefix { literal: String, original: String },
    Exact { exact: String, original: String },
}

impl RegexEngine for LiteralMatcher {
    type Error = std::convert::Infallible;

    #[inline]
    fn is_match(&self, text: &str) -> Result<bool, Self::Error> {
        match self {
            Self::Prefix { literal, .. } => Ok(text.starts_with(literal.as_str())),
            Self::Exact { exact, .. } => Ok(text == exact.as_str()),
        }
    }

    fn pattern(&self) -> &str {
        match self {
            Self::Prefix { original, .. } | Self::Exact { original, .. } => original.as_str(),
        }
    }
}

/// Result of analyzing a regex pattern for literal-match optimizations.
#[derive(Debug, PartialEq)]
pub(crate) enum PatternOptimization {
    /// `^prefix`, matched with `starts_with(prefix)`.
    Prefix(String),
    /// `^exact$`, matched with `== exact`.
    Exact(String),
}

/// Analyze a pattern and return a [`PatternOptimization`] if one applies, or `None` if a full
/// regex engine is required.
///
/// Accepts unescaped alphanumeric chars, `-`, `_`, `/` and the escape sequences
/// `\/`, `\-`, `\_`, `\$`, `\.` in the literal body.
/// A trailing unescaped `$` promotes the result to [`PatternOptimization::Exact`].
pub(crate) fn analyze_pattern(pattern: &str) -> Option<PatternOptimization> {
    let suffix = pattern.strip_prefix('^')?;
    let mut literal = String::new();
    let mut chars = suffix.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                c @ ('/' | '-' | '_' | '$' | '.') => literal.push(c),
                _ => return None,
            }
        } else if c == '$' {
            // Unescaped `$` is only valid as the end anchor
            if chars.peek().is_none() {
                return Some(PatternOptimization::Exact(literal));
            }
            return None;
        } else if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/') {
            literal.push(c);
        } else {
            return None;
        }
    }
    Some(PatternOptimization::Prefix(literal))
}

/// A compiled `pattern` / `patternProperties` regular expression.
pub(crate) enum Pattern {
    Literal(LiteralMatcher),
    Fancy(Box<fancy_regex::Regex>),
    Standard(Box<regex::Regex>),
}

impl Pattern {
    /// Compile `pattern` with the configured engine.
    ///
    /// Patterns are unanchored: `"a"` matches any string containing `a`.
    pub(crate) fn compile(pattern: &str, options: &PatternOptions) -> Result<Pattern, String> {
        if let Some(optimization) = analyze_pattern(pattern) {
            let original = pattern.to_string();
            return Ok(Pattern::Literal(match optimization {
                PatternOptimization::Prefix(literal) => LiteralMatcher::Prefix { literal, original },
                PatternOptimization::Exact(exact) => LiteralMatcher::Exact { exact, original },
            }));
        }
        match *options {
            PatternOptions::FancyRegex {
                backtrack_limit,
                size_limit,
                dfa_size_limit,
            } => {
                let mut builder = fancy_regex::RegexBuilder::new(pattern);
                if let Some(limit) = backtrack_limit {
                    builder.backtrack_limit(limit);
                }
                if let Some(limit) = size_limit {
                    builder.delegate_size_limit(limit);
                }
                if let Some(limit) = dfa_size_limit {
                    builder.delegate_dfa_size_limit(limit);
                }
                builder
                    .build()
                    .map(|regex| Pattern::Fancy(Box::new(regex)))
                    .map_err(|error| error.to_string())
            }
            PatternOptions::Regex {
                size_limit,
                dfa_size_limit,
            } => {
                let mut builder = regex::RegexBuilder::new(pattern);
                if let Some(limit) = size_limit {
                    builder.size_limit(limit);
                }
                if let Some(limit) = dfa_size_limit {
                    builder.dfa_size_limit(limit);
                }
                builder
                    .build()
                    .map(|regex| Pattern::Standard(Box::new(regex)))
                    .map_err(|error| error.to_string())
            }
        }
    }

    /// Whether `text` matches. Exceeding the backtrack limit counts as no match.
    pub(crate) fn is_match(&self, text: &str) -> bool {
        let result = match self {
            Pattern::Literal(matcher) => Ok(matcher.is_match(text).unwrap_or_else(|e| match e {})),
            Pattern::Fancy(regex) => regex.as_ref().is_match(text),
            Pattern::Standard(regex) => Ok(regex.is_match(text)),
        };
        match result {
            Ok(matched) => matched,
            Err(error) => {
                tracing::warn!(pattern = self.as_str(), %error, "Pattern evaluation failed");
                false
            }
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Pattern::Literal(matcher) => matcher.pattern(),
            Pattern::Fancy(regex) => regex.as_ref().pattern(),
            Pattern::Standard(regex) => RegexEngine::pattern(regex.as_ref()),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}
