//! The class registry: every class name a configuration defines.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::cache_key::CacheKey;
use crate::catalogue::{Catalogue, CatalogueGenerator};
use crate::class_name::{is_valid_arbitrary_value, parse_class_name, validate_variants, VariantCheck};
use crate::config::CatalogueSettings;
use crate::pattern::PatternSet;
use crate::resolver::ResolvedFile;
use crate::stylesheet::StylesheetExtractor;

/// Immutable lookup structure built once per configuration fingerprint.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    key: Option<CacheKey>,
    /// Names defined by stylesheet sources
    css_classes: IndexSet<String>,
    /// Catalogue names plus literal allowlist entries
    tailwind_classes: IndexSet<String>,
    all_classes: IndexSet<String>,
    allow_patterns: PatternSet,
    block_patterns: PatternSet,
    ignore_patterns: PatternSet,
    variants: IndexSet<String>,
    catalogue_enabled: bool,
    classes_by_file: IndexMap<PathBuf, IndexSet<String>>,
}

impl ClassRegistry {
    fn is_blocked(&self, name: &str) -> bool {
        self.block_patterns.matches_any(name)
    }

    /// Literal membership in any source, a wildcard allowlist match, or a
    /// compound token whose variants are known and whose base is a utility.
    pub fn is_valid(&self, name: &str) -> bool {
        if self.is_blocked(name) {
            return false;
        }
        if self.all_classes.contains(name) || self.allow_patterns.matches_any(name) {
            return true;
        }
        if self.catalogue_enabled && is_valid_arbitrary_value(name) {
            return true;
        }

        let parsed = parse_class_name(name);
        parsed.has_variants()
            && validate_variants(&parsed.variants, &self.variants) == VariantCheck::AllValid
            && self.is_tailwind_class(&parsed.base)
    }

    /// Like [`is_valid`](Self::is_valid) but ignoring stylesheet-only names,
    /// which cannot carry variants.
    pub fn is_tailwind_class(&self, name: &str) -> bool {
        if self.is_blocked(name) {
            return false;
        }
        self.tailwind_classes.contains(name)
            || self.allow_patterns.matches_any(name)
            || (self.catalogue_enabled && is_valid_arbitrary_value(name))
    }

    /// Defined only by a stylesheet. A name the catalogue also defines is
    /// classified as catalogue.
    pub fn is_css_class(&self, name: &str) -> bool {
        self.css_classes.contains(name) && !self.tailwind_classes.contains(name)
    }

    pub fn is_tailwind_only(&self, name: &str) -> bool {
        !self.is_css_class(name) && self.is_tailwind_class(name)
    }

    /// Literal class names only; wildcard matches cannot be enumerated.
    pub fn all_classes(&self) -> &IndexSet<String> {
        &self.all_classes
    }

    pub fn valid_variants(&self) -> &IndexSet<String> {
        &self.variants
    }

    pub fn css_classes(&self) -> &IndexSet<String> {
        &self.css_classes
    }

    pub fn tailwind_classes(&self) -> &IndexSet<String> {
        &self.tailwind_classes
    }

    pub fn allow_patterns(&self) -> &PatternSet {
        &self.allow_patterns
    }

    pub fn block_patterns(&self) -> &PatternSet {
        &self.block_patterns
    }

    pub fn ignore_patterns(&self) -> &PatternSet {
        &self.ignore_patterns
    }

    pub fn catalogue_enabled(&self) -> bool {
        self.catalogue_enabled
    }

    /// Stylesheet classes grouped by the file that defined them
    pub fn classes_by_file(&self) -> &IndexMap<PathBuf, IndexSet<String>> {
        &self.classes_by_file
    }

    pub fn cache_key(&self) -> Option<CacheKey> {
        self.key
    }
}

/// Everything a registry is built from.
#[derive(Debug, Clone, Copy)]
pub struct RegistryInputs<'a> {
    pub files: &'a [ResolvedFile],
    pub catalogue: Option<&'a CatalogueSettings>,
    pub allowlist: &'a [String],
    pub blocklist: &'a [String],
    pub ignore: &'a [String],
    pub cwd: &'a Path,
}

/// Merges stylesheet, catalogue and list sources into a [`ClassRegistry`].
///
/// Failures in one source are logged and that source contributes nothing.
pub struct RegistryBuilder<'a> {
    stylesheet: &'a dyn StylesheetExtractor,
    catalogue: &'a dyn CatalogueGenerator,
}

impl<'a> RegistryBuilder<'a> {
    pub fn new(stylesheet: &'a dyn StylesheetExtractor, catalogue: &'a dyn CatalogueGenerator) -> Self {
        Self { stylesheet, catalogue }
    }

    pub fn build(&self, inputs: &RegistryInputs<'_>, key: Option<CacheKey>) -> ClassRegistry {
        let block_patterns = PatternSet::compile(inputs.blocklist);
        let mut registry = ClassRegistry {
            key,
            block_patterns,
            ignore_patterns: PatternSet::compile(inputs.ignore),
            catalogue_enabled: inputs.catalogue.is_some(),
            ..ClassRegistry::default()
        };

        for file in inputs.files {
            let classes = self.stylesheet_classes(&file.path);
            if classes.is_empty() {
                continue;
            }
            for class in &classes {
                if !registry.is_blocked(class) {
                    registry.css_classes.insert(class.clone());
                }
            }
            registry.classes_by_file.insert(file.path.clone(), classes);
        }

        if let Some(settings) = inputs.catalogue {
            let catalogue = self.load_catalogue(settings, inputs.cwd);
            for class in catalogue.classes {
                if !registry.is_blocked(&class) {
                    registry.tailwind_classes.insert(class);
                }
            }
            registry.variants = catalogue.variants;
        }

        for entry in inputs.allowlist {
            if entry.contains('*') {
                registry.allow_patterns.push(entry);
            } else if !entry.is_empty() && !registry.is_blocked(entry) {
                registry.tailwind_classes.insert(entry.clone());
            }
        }

        registry.all_classes = registry
            .css_classes
            .iter()
            .chain(registry.tailwind_classes.iter())
            .cloned()
            .collect();

        tracing::debug!(
            css = registry.css_classes.len(),
            catalogue = registry.tailwind_classes.len(),
            patterns = registry.allow_patterns.len(),
            "built class registry"
        );
        registry
    }

    fn stylesheet_classes(&self, path: &Path) -> IndexSet<String> {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Cannot read stylesheet '{}': {}", path.display(), e);
                return IndexSet::new();
            }
        };
        match self.stylesheet.extract(&source, path) {
            Ok(classes) => classes,
            Err(e) => {
                tracing::warn!("Ignoring stylesheet: {}", e);
                IndexSet::new()
            }
        }
    }

    fn load_catalogue(&self, settings: &CatalogueSettings, cwd: &Path) -> Catalogue {
        match self.catalogue.generate(settings, cwd) {
            Ok(catalogue) => catalogue,
            Err(e) => {
                tracing::warn!("Utility catalogue unavailable, continuing without it: {}", e);
                Catalogue::default()
            }
        }
    }
}

/// Registries by configuration fingerprint.
///
/// Each configuration slot (the declared patterns, catalogue settings and
/// cwd, without file state) holds only its latest registry. A key that was
/// seen last for its slot returns the same `Arc`, so callers can memoize on
/// pointer identity; a new key for the slot replaces and releases the old
/// registry.
#[derive(Debug, Default)]
pub struct RegistryCache {
    entries: RefCell<HashMap<CacheKey, (CacheKey, Arc<ClassRegistry>)>>,
}

impl RegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build<F>(&self, slot: CacheKey, key: CacheKey, build: F) -> Arc<ClassRegistry>
    where
        F: FnOnce() -> ClassRegistry,
    {
        if let Some((cached_key, registry)) = self.entries.borrow().get(&slot) {
            if *cached_key == key {
                tracing::debug!(%key, "registry cache hit");
                return Arc::clone(registry);
            }
        }

        tracing::debug!(%key, "registry cache miss");
        let registry = Arc::new(build());
        self.entries
            .borrow_mut()
            .insert(slot, (key, Arc::clone(&registry)));
        registry
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
