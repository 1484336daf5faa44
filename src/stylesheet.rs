//! Class names defined by stylesheet sources.

use std::path::Path;
use std::sync::OnceLock;

use indexmap::IndexSet;
use regex::Regex;

use crate::errors::{Result, ValidatorError};

/// Turns stylesheet source text into the set of class names it defines.
pub trait StylesheetExtractor {
    fn extract(&self, source: &str, file_path: &Path) -> Result<IndexSet<String>>;
}

/// Classes found in a stylesheet, split by whether they were declared
/// inside an `@layer` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorClasses {
    pub classes: IndexSet<String>,
    pub layered: IndexSet<String>,
}

/// Regex-driven selector scanner for CSS and SCSS-style nesting.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorClassExtractor;

fn class_selector_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\.(-?(?:\\.|[A-Za-z_]|[^\x00-\x7F])(?:\\.|[A-Za-z0-9_-]|[^\x00-\x7F])*)")
            .expect("valid regex")
    })
}

struct Frame {
    selectors: Vec<String>,
    layered: bool,
}

impl SelectorClassExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Scan a stylesheet, keeping track of `@layer` membership.
    pub fn scan(&self, source: &str, file_path: &Path) -> Result<SelectorClasses> {
        let line_comments = matches!(
            file_path.extension().and_then(|s| s.to_str()),
            Some("scss") | Some("sass") | Some("less")
        );
        let cleaned = strip_comments_and_strings(source, line_comments);

        let mut found = SelectorClasses::default();
        let mut stack: Vec<Frame> = Vec::new();
        let mut buffer = String::new();

        for ch in cleaned.chars() {
            match ch {
                '{' => {
                    let prelude = buffer.trim();
                    let parent_selectors = stack.last().map(|f| f.selectors.as_slice()).unwrap_or(&[]);
                    let parent_layered = stack.last().map(|f| f.layered).unwrap_or(false);

                    let frame = if let Some(at_rule) = prelude.strip_prefix('@') {
                        Frame {
                            selectors: parent_selectors.to_vec(),
                            layered: parent_layered || at_rule.starts_with("layer"),
                        }
                    } else {
                        let selectors = resolve_nested(prelude, parent_selectors);
                        for selector in &selectors {
                            for class in classes_in_selector(selector) {
                                if parent_layered {
                                    found.layered.insert(class.clone());
                                }
                                found.classes.insert(class);
                            }
                        }
                        Frame {
                            selectors,
                            layered: parent_layered,
                        }
                    };
                    stack.push(frame);
                    buffer.clear();
                }
                '}' => {
                    if stack.pop().is_none() {
                        return Err(ValidatorError::StylesheetError {
                            path: file_path.display().to_string(),
                            message: "unexpected '}'".to_string(),
                        });
                    }
                    buffer.clear();
                }
                ';' => buffer.clear(),
                _ => buffer.push(ch),
            }
        }

        if !stack.is_empty() {
            return Err(ValidatorError::StylesheetError {
                path: file_path.display().to_string(),
                message: format!("{} unclosed block(s)", stack.len()),
            });
        }

        Ok(found)
    }
}

impl StylesheetExtractor for SelectorClassExtractor {
    fn extract(&self, source: &str, file_path: &Path) -> Result<IndexSet<String>> {
        Ok(self.scan(source, file_path)?.classes)
    }
}

/// Replace comments with a space and empty out quoted strings.
fn strip_comments_and_strings(source: &str, line_comments: bool) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            '/' if line_comments && chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                out.push('\n');
            }
            '"' | '\'' => {
                let quote = ch;
                let mut escaped = false;
                for c in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == quote {
                        break;
                    }
                }
                out.push(quote);
                out.push(quote);
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Split a selector list at top-level commas.
fn split_selector_list(prelude: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in prelude.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(prelude[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(prelude[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Flatten a nested prelude against its parent selectors (`&` substitution).
fn resolve_nested(prelude: &str, parents: &[String]) -> Vec<String> {
    let parts = split_selector_list(prelude);
    if parents.is_empty() {
        return parts.into_iter().map(|p| p.replace('&', "")).collect();
    }

    let mut resolved = Vec::with_capacity(parts.len() * parents.len());
    for part in parts {
        for parent in parents {
            if part.contains('&') {
                resolved.push(part.replace('&', parent));
            } else {
                resolved.push(format!("{} {}", parent, part));
            }
        }
    }
    resolved
}

fn classes_in_selector(selector: &str) -> Vec<String> {
    class_selector_regex()
        .captures_iter(selector)
        .filter_map(|caps| caps.get(1))
        .map(|m| unescape(m.as_str()))
        .collect()
}

fn unescape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
