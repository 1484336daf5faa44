//! Wildcard list patterns (`custom-*`, `*-legacy`, `btn`)
//!
//! A `*` matches zero or more characters; everything else is matched
//! literally and case-sensitively against the whole candidate.

use regex::{Regex, RegexBuilder};

/// Longest pattern accepted for compilation.
const MAX_PATTERN_LEN: usize = 256;

/// Compiled form of a single list pattern.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// No wildcard: only an identical string matches.
    Literal(String),
    /// At least one wildcard, compiled to an anchored regex.
    Wildcard { source: String, regex: Regex },
}

impl CompiledPattern {
    /// Compile a pattern, returning `None` if it is empty, oversized or
    /// contains characters a class name can never hold.
    pub fn compile(pattern: &str) -> Option<Self> {
        if pattern.is_empty() || pattern.len() > MAX_PATTERN_LEN {
            return None;
        }
        if pattern.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return None;
        }

        if !pattern.contains('*') {
            return Some(Self::Literal(pattern.to_string()));
        }

        // Runs of `*` collapse to a single `.*`
        let mut source = String::with_capacity(pattern.len() + 8);
        source.push('^');
        let mut last_was_star = false;
        for segment in pattern.split('*') {
            if segment.is_empty() {
                if !last_was_star {
                    source.push_str(".*");
                    last_was_star = true;
                }
                continue;
            }
            if !last_was_star && source.len() > 1 {
                source.push_str(".*");
            }
            source.push_str(&regex::escape(segment));
            last_was_star = false;
        }
        if pattern.ends_with('*') && !last_was_star {
            source.push_str(".*");
        }
        source.push('$');

        let regex = RegexBuilder::new(&source)
            .size_limit(1 << 16)
            .build()
            .ok()?;

        Some(Self::Wildcard {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern text this matcher was compiled from
    pub fn source(&self) -> &str {
        match self {
            Self::Literal(s) => s,
            Self::Wildcard { source, .. } => source,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard { .. })
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Literal(s) => s == candidate,
            Self::Wildcard { regex, .. } => regex.is_match(candidate),
        }
    }
}

/// Ordered collection of compiled patterns; matching short-circuits on the
/// first hit.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every pattern, dropping the ones that fail with a debug log.
    pub fn compile<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for pattern in patterns {
            set.push(pattern.as_ref());
        }
        set
    }

    /// Compile and append a pattern. Returns false when it was rejected.
    pub fn push(&mut self, pattern: &str) -> bool {
        match CompiledPattern::compile(pattern) {
            Some(compiled) => {
                self.patterns.push(compiled);
                true
            }
            None => {
                tracing::debug!(pattern, "rejected list pattern");
                false
            }
        }
    }

    pub fn matches_any(&self, candidate: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(candidate))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter()
    }
}
