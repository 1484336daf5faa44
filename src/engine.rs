//! Blocking façade over the caches, collaborators and the validator.
//!
//! One [`Engine`] is meant to live for the whole lint run. It owns the
//! file-resolution cache and the registry cache, so repeated calls with an
//! unchanged configuration never touch stylesheets or the design config
//! again.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexSet;

use crate::cache_key::CacheKey;
use crate::catalogue::{CatalogueGenerator, ThemeCatalogueGenerator};
use crate::class_name::ClassNameParser;
use crate::config::ValidatorConfig;
use crate::extractor::{collect_class_names, extract_class_names, ExpressionNode, ExtractMode};
use crate::registry::{ClassRegistry, RegistryBuilder, RegistryCache, RegistryInputs};
use crate::resolver::{FileResolutionCache, ResolvedFile, DEFAULT_RESOLUTION_TTL};
use crate::stylesheet::{SelectorClassExtractor, StylesheetExtractor};
use crate::validator::{ClassValidator, Diagnostic};

pub struct Engine {
    files: FileResolutionCache,
    registries: RegistryCache,
    parser: ClassNameParser,
    stylesheet: Box<dyn StylesheetExtractor>,
    catalogue: Box<dyn CatalogueGenerator>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine with the built-in selector scanner and theme catalogue.
    pub fn new() -> Self {
        Self::with_collaborators(
            Box::new(SelectorClassExtractor::new()),
            Box::new(ThemeCatalogueGenerator::new()),
        )
    }

    pub fn with_collaborators(
        stylesheet: Box<dyn StylesheetExtractor>,
        catalogue: Box<dyn CatalogueGenerator>,
    ) -> Self {
        Self {
            files: FileResolutionCache::with_ttl(DEFAULT_RESOLUTION_TTL),
            registries: RegistryCache::new(),
            parser: ClassNameParser::new(),
            stylesheet,
            catalogue,
        }
    }

    /// Override how long file resolutions are reused.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.files = FileResolutionCache::with_ttl(ttl);
        self
    }

    /// The registry for `config`. Unchanged inputs return the same `Arc`.
    pub fn registry(&self, config: &ValidatorConfig) -> Arc<ClassRegistry> {
        let files = self.files.resolve(&config.stylesheets, &config.cwd);
        let settings = config.catalogue.settings();
        let catalogue_inputs = settings
            .as_ref()
            .map(|s| stat_existing(self.catalogue.inputs(s, &config.cwd)))
            .unwrap_or_default();

        let key = CacheKey::builder()
            .files(&files)
            .list("allowlist", &config.allowlist)
            .list("blocklist", &config.blocklist)
            .list("ignore", &config.ignore)
            .catalogue(settings.as_ref(), &catalogue_inputs)
            .cwd(&config.cwd)
            .finish();
        // Same sections without file state
        let slot = CacheKey::builder()
            .list("stylesheets", &config.stylesheets)
            .list("allowlist", &config.allowlist)
            .list("blocklist", &config.blocklist)
            .list("ignore", &config.ignore)
            .catalogue(settings.as_ref(), &[])
            .cwd(&config.cwd)
            .finish();

        self.registries.get_or_build(slot, key, || {
            let inputs = RegistryInputs {
                files: &files,
                catalogue: settings.as_ref(),
                allowlist: &config.allowlist,
                blocklist: &config.blocklist,
                ignore: &config.ignore,
                cwd: &config.cwd,
            };
            RegistryBuilder::new(self.stylesheet.as_ref(), self.catalogue.as_ref())
                .build(&inputs, Some(key))
        })
    }

    /// Validate one attribute occurrence's deduplicated tokens.
    pub fn validate_tokens<L: Clone>(
        &self,
        config: &ValidatorConfig,
        tokens: &IndexSet<String>,
        location: &L,
    ) -> Vec<Diagnostic<L>> {
        if tokens.is_empty() {
            return Vec::new();
        }
        let registry = self.registry(config);
        ClassValidator::new(&registry, registry.ignore_patterns(), &self.parser)
            .validate(tokens, location)
    }

    /// Extract candidate tokens from an attribute expression and validate them.
    pub fn check_expression<L: Clone>(
        &self,
        config: &ValidatorConfig,
        node: &ExpressionNode,
        mode: ExtractMode,
        location: &L,
    ) -> Vec<Diagnostic<L>> {
        let tokens = extract_class_names(node, mode);
        self.validate_tokens(config, &tokens, location)
    }

    /// Validate a plain, whitespace-separated class attribute value.
    pub fn check_class_string<L: Clone>(
        &self,
        config: &ValidatorConfig,
        value: &str,
        location: &L,
    ) -> Vec<Diagnostic<L>> {
        let tokens = collect_class_names([value]);
        self.validate_tokens(config, &tokens, location)
    }

    /// Drop every cached resolution, registry and parse result.
    pub fn clear_caches(&self) {
        self.files.clear();
        self.registries.clear();
        self.parser.clear();
    }
}

/// Path and mtime of every input that exists; missing ones drop out of the key
fn stat_existing(paths: Vec<PathBuf>) -> Vec<ResolvedFile> {
    paths
        .into_iter()
        .filter_map(|path| {
            let mtime = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some(ResolvedFile { path, mtime })
        })
        .collect()
}
