//! Per-attribute validation of candidate class tokens.

use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

use crate::class_name::{is_empty_arbitrary_value, validate_variants, ClassNameParser, VariantCheck};
use crate::pattern::PatternSet;
use crate::registry::ClassRegistry;

/// Diagnostic message identifiers reported back to the host linter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKind {
    #[serde(rename = "invalidClassName")]
    InvalidClassName,
    #[serde(rename = "invalidVariant")]
    InvalidVariant,
}

impl MessageKind {
    pub fn id(&self) -> &'static str {
        match self {
            Self::InvalidClassName => "invalidClassName",
            Self::InvalidVariant => "invalidVariant",
        }
    }
}

/// A single finding, carrying the caller's opaque report location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic<L> {
    pub kind: MessageKind,
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub location: L,
}

impl<L> fmt::Display for Diagnostic<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.variant) {
            (MessageKind::InvalidVariant, Some(variant)) => write!(
                f,
                "Variant '{}' in '{}' is not valid",
                variant, self.class_name
            ),
            _ => write!(f, "Class '{}' is not defined", self.class_name),
        }
    }
}

/// Applies the ignore / empty-value / variant / base precedence to tokens.
pub struct ClassValidator<'a> {
    registry: &'a ClassRegistry,
    ignore: &'a PatternSet,
    parser: &'a ClassNameParser,
}

impl<'a> ClassValidator<'a> {
    pub fn new(registry: &'a ClassRegistry, ignore: &'a PatternSet, parser: &'a ClassNameParser) -> Self {
        Self {
            registry,
            ignore,
            parser,
        }
    }

    /// Validate one attribute's tokens. At most one diagnostic per token,
    /// in token order.
    pub fn validate<L: Clone>(&self, tokens: &IndexSet<String>, location: &L) -> Vec<Diagnostic<L>> {
        tokens
            .iter()
            .filter_map(|token| self.check_token(token, location))
            .collect()
    }

    pub fn check_token<L: Clone>(&self, token: &str, location: &L) -> Option<Diagnostic<L>> {
        let parsed = self.parser.parse(token);
        let base = parsed.base.as_str();

        let invalid_class = || Diagnostic {
            kind: MessageKind::InvalidClassName,
            class_name: base.to_string(),
            variant: None,
            location: location.clone(),
        };

        if self.ignore.matches_any(base) {
            return None;
        }

        if is_empty_arbitrary_value(base) {
            return Some(invalid_class());
        }

        if parsed.has_variants() {
            if !self.registry.is_valid(base) {
                return Some(invalid_class());
            }
            if self.registry.is_css_class(base) {
                // Stylesheet classes cannot take variants
                return Some(invalid_class());
            }
            if self.registry.is_tailwind_only(base) && !self.registry.is_valid(token) {
                let variant = match validate_variants(&parsed.variants, self.registry.valid_variants()) {
                    VariantCheck::Invalid(variant) => variant,
                    VariantCheck::AllValid => parsed.variants[0].clone(),
                };
                return Some(Diagnostic {
                    kind: MessageKind::InvalidVariant,
                    class_name: token.to_string(),
                    variant: Some(variant),
                    location: location.clone(),
                });
            }
            return None;
        }

        if self.registry.is_valid(base) {
            None
        } else {
            Some(invalid_class())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{Catalogue, CatalogueGenerator};
    use crate::config::CatalogueSettings;
    use crate::errors::Result;
    use crate::registry::{RegistryBuilder, RegistryInputs};
    use crate::resolver::ResolvedFile;
    use crate::stylesheet::SelectorClassExtractor;
    use insta::assert_snapshot;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct FixedCatalogue(Catalogue);

    impl CatalogueGenerator for FixedCatalogue {
        fn generate(&self, _settings: &CatalogueSettings, _cwd: &Path) -> Result<Catalogue> {
            Ok(self.0.clone())
        }
    }

    struct Fixture {
        _dir: TempDir,
        registry: ClassRegistry,
    }

    fn cat(classes: &[&str], variants: &[&str]) -> Option<Catalogue> {
        Some(Catalogue {
            classes: classes.iter().map(|s| s.to_string()).collect(),
            variants: variants.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn fixture(css: &str, catalogue: Option<Catalogue>, allowlist: &[&str]) -> Fixture {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("styles.css");
        fs::write(&path, css).unwrap();
        let files = vec![ResolvedFile {
            mtime: fs::metadata(&path).unwrap().modified().unwrap(),
            path,
        }];

        let enabled = catalogue.is_some();
        let generator = FixedCatalogue(catalogue.unwrap_or_default());
        let settings = CatalogueSettings::default();
        let allowlist: Vec<String> = allowlist.iter().map(|s| s.to_string()).collect();
        let extractor = SelectorClassExtractor::new();

        let registry = RegistryBuilder::new(&extractor, &generator).build(
            &RegistryInputs {
                files: &files,
                catalogue: enabled.then_some(&settings),
                allowlist: &allowlist,
                blocklist: &[],
                ignore: &[],
                cwd: dir.path(),
            },
            None,
        );
        Fixture { _dir: dir, registry }
    }

    fn run(registry: &ClassRegistry, ignore: &[&str], tokens: &[&str]) -> Vec<Diagnostic<()>> {
        let ignore = PatternSet::compile(ignore);
        let parser = ClassNameParser::new();
        let tokens: IndexSet<String> = tokens.iter().map(|s| s.to_string()).collect();
        ClassValidator::new(registry, &ignore, &parser).validate(&tokens, &())
    }

    fn invalid_class(name: &str) -> Diagnostic<()> {
        Diagnostic {
            kind: MessageKind::InvalidClassName,
            class_name: name.to_string(),
            variant: None,
            location: (),
        }
    }

    #[test]
    fn test_stylesheet_class_with_variant() {
        let f = fixture(".container{}", None, &[]);
        let diagnostics = run(&f.registry, &[], &["container", "hover:container"]);
        assert_eq!(diagnostics, vec![invalid_class("container")]);
    }

    #[test]
    fn test_css_class_with_variant_is_never_invalid_variant() {
        let f = fixture(".btn{}", cat(&[], &["hover"]), &[]);
        let diagnostics = run(&f.registry, &[], &["hover:btn"]);
        assert_eq!(diagnostics, vec![invalid_class("btn")]);
    }

    #[test]
    fn test_wildcard_allowlist() {
        let f = fixture("", None, &["custom-*"]);
        let diagnostics = run(&f.registry, &[], &["custom-button", "other"]);
        assert_eq!(diagnostics, vec![invalid_class("other")]);
    }

    #[test]
    fn test_ignore_wins_over_everything() {
        let f = fixture("", cat(&["flex"], &["hover"]), &[]);
        let diagnostics = run(&f.registry, &["js-*", "w-*"], &["js-toggle", "bogus:js-toggle", "w-[]"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_empty_arbitrary_value() {
        let f = fixture("", cat(&["flex"], &["hover"]), &[]);
        let diagnostics = run(&f.registry, &[], &["w-[]", "hover:w-[]"]);
        assert_eq!(diagnostics, vec![invalid_class("w-[]"), invalid_class("w-[]")]);
    }

    #[test]
    fn test_invalid_variant_names_first_bad_variant() {
        let f = fixture("", cat(&["flex"], &["hover", "md"]), &[]);
        let diagnostics = run(&f.registry, &[], &["md:hover:flex", "md:hovr:flex", "nope:flex"]);
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic {
                    kind: MessageKind::InvalidVariant,
                    class_name: "md:hovr:flex".to_string(),
                    variant: Some("hovr".to_string()),
                    location: (),
                },
                Diagnostic {
                    kind: MessageKind::InvalidVariant,
                    class_name: "nope:flex".to_string(),
                    variant: Some("nope".to_string()),
                    location: (),
                },
            ]
        );
    }

    #[test]
    fn test_unknown_base_with_variant() {
        let f = fixture("", cat(&["flex"], &["hover"]), &[]);
        let diagnostics = run(&f.registry, &[], &["hover:flx", "flx"]);
        assert_eq!(diagnostics, vec![invalid_class("flx"), invalid_class("flx")]);
    }

    #[test]
    fn test_diagnostic_rendering() {
        let class = invalid_class("flx");
        assert_snapshot!(class.to_string(), @"Class 'flx' is not defined");

        let variant = Diagnostic {
            kind: MessageKind::InvalidVariant,
            class_name: "hovr:flex".to_string(),
            variant: Some("hovr".to_string()),
            location: 3u32,
        };
        assert_snapshot!(variant.to_string(), @"Variant 'hovr' in 'hovr:flex' is not valid");
        assert_eq!(
            serde_json::to_string(&variant).unwrap(),
            r#"{"kind":"invalidVariant","className":"hovr:flex","variant":"hovr","location":3}"#
        );
    }
}
