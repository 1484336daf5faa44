//! Grammar for compound utility class tokens.
//!
//! A token is a chain of `variant:` prefixes followed by a base utility,
//! e.g. `md:hover:bg-blue-500` or `[&:nth-child(3)]:w-[200px]`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::OnceLock;

use indexmap::IndexSet;
use regex::Regex;

/// Utility prefixes that accept an arbitrary `[value]`.
const ARBITRARY_VALUE_PREFIXES: &[&str] = &[
    "w", "h", "min-w", "min-h", "max-w", "max-h", "size",
    "p", "px", "py", "pt", "pr", "pb", "pl", "ps", "pe",
    "m", "mx", "my", "mt", "mr", "mb", "ml", "ms", "me",
    "gap", "gap-x", "gap-y", "space-x", "space-y",
    "inset", "inset-x", "inset-y", "top", "right", "bottom", "left",
    "text", "bg", "border", "border-t", "border-r", "border-b", "border-l",
    "rounded", "rounded-t", "rounded-r", "rounded-b", "rounded-l",
    "font", "leading", "tracking", "indent", "z", "order", "opacity",
    "shadow", "ring", "ring-offset", "outline", "outline-offset",
    "fill", "stroke", "from", "via", "to", "decoration", "underline-offset",
    "grid-cols", "grid-rows", "col-span", "row-span", "col-start", "col-end",
    "row-start", "row-end", "auto-cols", "auto-rows",
    "basis", "flex", "grow", "shrink", "aspect", "columns", "content",
    "translate-x", "translate-y", "rotate", "scale", "scale-x", "scale-y",
    "skew-x", "skew-y", "origin", "duration", "delay", "ease", "transition",
    "blur", "brightness", "contrast", "grayscale", "saturate", "backdrop-blur",
    "scroll-m", "scroll-p", "line-clamp", "list", "cursor", "will-change",
];

/// A compound class token split into its variant chain and base utility.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedClassName {
    pub variants: Vec<String>,
    pub base: String,
}

impl ParsedClassName {
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }
}

/// `prefix-[value]` split of an arbitrary-value utility.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedArbitraryValue {
    pub prefix: String,
    pub value: String,
}

/// Outcome of checking a variant chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantCheck {
    AllValid,
    /// First invalid variant in declaration order.
    Invalid(String),
}

fn arbitrary_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+-\[.+\]$").expect("valid regex"))
}

fn empty_arbitrary_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+-\[\]$").expect("valid regex"))
}

/// Split a raw token into variants and base.
pub fn parse_class_name(token: &str) -> ParsedClassName {
    let mut variants = Vec::new();
    let mut rest = token;

    while rest.contains(':') {
        if rest.starts_with('[') {
            let Some(close) = matching_bracket(rest) else {
                break;
            };
            if rest[close + 1..].starts_with(':') {
                variants.push(rest[..=close].to_string());
                rest = &rest[close + 2..];
            } else {
                // `[prop:value]` with no trailing `:` is a base, not a variant
                break;
            }
        } else {
            let Some((variant, remainder)) = rest.split_once(':') else {
                break;
            };
            variants.push(variant.to_string());
            rest = remainder;
        }
    }

    ParsedClassName {
        variants,
        base: rest.to_string(),
    }
}

/// Byte index of the `]` closing the `[` at index 0.
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_arbitrary_variant(variant: &str) -> bool {
    variant.len() >= 2 && variant.starts_with('[') && variant.ends_with(']')
}

pub fn is_valid_variant(variant: &str, known_variants: &IndexSet<String>) -> bool {
    if variant.is_empty() {
        return false;
    }
    if is_arbitrary_variant(variant) {
        return true;
    }
    if let Some(suffix) = variant
        .strip_prefix("group-")
        .or_else(|| variant.strip_prefix("peer-"))
    {
        return known_variants.contains(suffix);
    }
    known_variants.contains(variant)
}

pub fn validate_variants<S: AsRef<str>>(
    variants: &[S],
    known_variants: &IndexSet<String>,
) -> VariantCheck {
    for variant in variants {
        let variant = variant.as_ref();
        if !is_valid_variant(variant, known_variants) {
            return VariantCheck::Invalid(variant.to_string());
        }
    }
    VariantCheck::AllValid
}

pub fn is_arbitrary_value(base: &str) -> bool {
    arbitrary_value_regex().is_match(base)
}

/// True for `prefix-[]`, an arbitrary value with nothing inside the brackets.
pub fn is_empty_arbitrary_value(base: &str) -> bool {
    empty_arbitrary_value_regex().is_match(base)
}

pub fn parse_arbitrary_value(base: &str) -> Option<ParsedArbitraryValue> {
    let open = base.rfind("-[")?;
    if !base.ends_with(']') {
        return None;
    }
    let prefix = &base[..open];
    let value = &base[open + 2..base.len() - 1];
    if prefix.is_empty() || value.is_empty() || !brackets_balanced(value) {
        return None;
    }
    Some(ParsedArbitraryValue {
        prefix: prefix.to_string(),
        value: value.to_string(),
    })
}

fn brackets_balanced(value: &str) -> bool {
    let mut depth = 0i32;
    for c in value.chars() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn accepts_arbitrary_value(prefix: &str) -> bool {
    // Negative utilities (`-mt-[3px]`) share the positive prefix
    let prefix = prefix.strip_prefix('-').unwrap_or(prefix);
    ARBITRARY_VALUE_PREFIXES.contains(&prefix)
}

pub fn is_valid_arbitrary_value(base: &str) -> bool {
    if !is_arbitrary_value(base) {
        return false;
    }
    match parse_arbitrary_value(base) {
        Some(parsed) => accepts_arbitrary_value(&parsed.prefix) && !parsed.value.trim().is_empty(),
        None => false,
    }
}

/// Memoizing front end for [`parse_class_name`] and [`parse_arbitrary_value`].
///
/// Parsing is a pure function of the token, so a cached entry is returned
/// as the same `Rc` on every lookup.
#[derive(Debug, Default)]
pub struct ClassNameParser {
    names: RefCell<HashMap<String, Rc<ParsedClassName>>>,
    arbitrary: RefCell<HashMap<String, Option<Rc<ParsedArbitraryValue>>>>,
}

impl ClassNameParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&self, token: &str) -> Rc<ParsedClassName> {
        if let Some(hit) = self.names.borrow().get(token) {
            return Rc::clone(hit);
        }
        let parsed = Rc::new(parse_class_name(token));
        self.names
            .borrow_mut()
            .insert(token.to_string(), Rc::clone(&parsed));
        parsed
    }

    pub fn parse_arbitrary(&self, base: &str) -> Option<Rc<ParsedArbitraryValue>> {
        if let Some(hit) = self.arbitrary.borrow().get(base) {
            return hit.clone();
        }
        let parsed = parse_arbitrary_value(base).map(Rc::new);
        self.arbitrary
            .borrow_mut()
            .insert(base.to_string(), parsed.clone());
        parsed
    }

    pub fn clear(&self) {
        self.names.borrow_mut().clear();
        self.arbitrary.borrow_mut().clear();
    }
}
