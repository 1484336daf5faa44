//! Generated utility-class catalogue.
//!
//! The catalogue is the set of utility names (and variant names) that a
//! design-system configuration makes available. [`ThemeCatalogueGenerator`]
//! expands a [`DesignConfig`] into that set; hosts with a real framework
//! build can plug in their own [`CatalogueGenerator`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use indexmap::IndexSet;

use crate::config::{CatalogueSettings, ColorValue, DesignConfig};
use crate::errors::{Result, ValidatorError};
use crate::stylesheet::SelectorClassExtractor;

/// Utility names and variant names produced from a design configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalogue {
    pub classes: IndexSet<String>,
    pub variants: IndexSet<String>,
}

pub trait CatalogueGenerator {
    fn generate(&self, settings: &CatalogueSettings, cwd: &Path) -> Result<Catalogue>;

    /// Files `generate` reads. Their paths and modification times are part
    /// of the registry cache key, so editing one rebuilds the registry.
    fn inputs(&self, settings: &CatalogueSettings, cwd: &Path) -> Vec<PathBuf> {
        settings.resolve_config_path(cwd).into_iter().collect()
    }
}

const STATIC_UTILITIES: &[&str] = &[
    "container", "sr-only", "not-sr-only",
    "block", "inline-block", "inline", "flex", "inline-flex", "grid", "inline-grid",
    "table", "table-row", "table-cell", "contents", "hidden", "flow-root",
    "static", "fixed", "absolute", "relative", "sticky",
    "visible", "invisible", "collapse",
    "flex-row", "flex-row-reverse", "flex-col", "flex-col-reverse",
    "flex-wrap", "flex-wrap-reverse", "flex-nowrap",
    "flex-1", "flex-auto", "flex-initial", "flex-none",
    "grow", "grow-0", "shrink", "shrink-0",
    "items-start", "items-end", "items-center", "items-baseline", "items-stretch",
    "justify-start", "justify-end", "justify-center", "justify-between",
    "justify-around", "justify-evenly",
    "content-center", "content-start", "content-end", "content-between",
    "self-auto", "self-start", "self-end", "self-center", "self-stretch",
    "overflow-auto", "overflow-hidden", "overflow-visible", "overflow-scroll",
    "overflow-x-auto", "overflow-y-auto", "overflow-x-hidden", "overflow-y-hidden",
    "truncate", "text-ellipsis", "text-clip",
    "whitespace-normal", "whitespace-nowrap", "whitespace-pre", "whitespace-pre-wrap",
    "break-words", "break-all",
    "text-left", "text-center", "text-right", "text-justify",
    "text-xs", "text-sm", "text-base", "text-lg", "text-xl", "text-2xl",
    "text-3xl", "text-4xl", "text-5xl", "text-6xl",
    "font-thin", "font-light", "font-normal", "font-medium", "font-semibold",
    "font-bold", "font-extrabold", "font-black", "font-sans", "font-serif", "font-mono",
    "italic", "not-italic", "underline", "line-through", "no-underline",
    "uppercase", "lowercase", "capitalize", "normal-case",
    "leading-none", "leading-tight", "leading-snug", "leading-normal",
    "leading-relaxed", "leading-loose",
    "tracking-tighter", "tracking-tight", "tracking-normal", "tracking-wide",
    "tracking-wider", "tracking-widest",
    "border", "border-0", "border-2", "border-4", "border-8",
    "border-t", "border-r", "border-b", "border-l",
    "border-solid", "border-dashed", "border-dotted", "border-none",
    "rounded-none", "rounded-sm", "rounded", "rounded-md", "rounded-lg",
    "rounded-xl", "rounded-2xl", "rounded-3xl", "rounded-full",
    "shadow-sm", "shadow", "shadow-md", "shadow-lg", "shadow-xl", "shadow-2xl",
    "shadow-inner", "shadow-none",
    "ring", "ring-0", "ring-1", "ring-2", "ring-4", "ring-8", "ring-inset",
    "outline-none", "outline",
    "opacity-0", "opacity-25", "opacity-50", "opacity-75", "opacity-100",
    "transition", "transition-all", "transition-colors", "transition-opacity",
    "transition-shadow", "transition-transform", "transition-none",
    "duration-75", "duration-100", "duration-150", "duration-200", "duration-300",
    "duration-500", "duration-700", "duration-1000",
    "ease-linear", "ease-in", "ease-out", "ease-in-out",
    "transform", "transform-none", "scale-95", "scale-100", "scale-105", "scale-110",
    "rotate-45", "rotate-90", "rotate-180",
    "cursor-pointer", "cursor-default", "cursor-not-allowed", "cursor-wait",
    "select-none", "select-text", "select-all",
    "pointer-events-none", "pointer-events-auto",
    "z-0", "z-10", "z-20", "z-30", "z-40", "z-50", "z-auto",
    "w-auto", "w-full", "w-screen", "w-min", "w-max", "w-fit",
    "w-1/2", "w-1/3", "w-2/3", "w-1/4", "w-3/4",
    "h-auto", "h-full", "h-screen", "h-min", "h-max", "h-fit",
    "min-w-0", "min-w-full", "min-h-0", "min-h-full", "min-h-screen",
    "max-w-none", "max-w-xs", "max-w-sm", "max-w-md", "max-w-lg", "max-w-xl",
    "max-w-2xl", "max-w-3xl", "max-w-4xl", "max-w-5xl", "max-w-6xl",
    "max-w-7xl", "max-w-full", "max-w-prose", "max-w-screen-xl",
    "m-auto", "mx-auto", "my-auto", "ml-auto", "mr-auto",
    "inset-0", "top-0", "right-0", "bottom-0", "left-0",
    "grid-cols-1", "grid-cols-2", "grid-cols-3", "grid-cols-4", "grid-cols-6", "grid-cols-12",
    "col-span-1", "col-span-2", "col-span-3", "col-span-full",
    "object-contain", "object-cover", "object-fill", "object-center",
    "list-none", "list-disc", "list-decimal",
    "appearance-none", "resize", "resize-none",
    "antialiased", "subpixel-antialiased",
    "animate-spin", "animate-ping", "animate-pulse", "animate-bounce", "animate-none",
];

const COLOR_PREFIXES: &[&str] = &[
    "bg", "text", "border", "ring", "ring-offset", "outline", "divide",
    "placeholder", "fill", "stroke", "from", "via", "to", "decoration",
    "accent", "caret", "shadow",
];

const SPACING_PREFIXES: &[&str] = &[
    "p", "px", "py", "pt", "pr", "pb", "pl",
    "m", "mx", "my", "mt", "mr", "mb", "ml",
    "gap", "gap-x", "gap-y", "space-x", "space-y",
    "w", "h", "size", "inset", "top", "right", "bottom", "left",
    "translate-x", "translate-y", "scroll-m", "scroll-p",
];

/// Spacing utilities that also have a `-` negative form
const NEGATABLE_PREFIXES: &[&str] = &[
    "m", "mx", "my", "mt", "mr", "mb", "ml",
    "space-x", "space-y", "inset", "top", "right", "bottom", "left",
    "translate-x", "translate-y",
];

const BASE_VARIANTS: &[&str] = &[
    "hover", "focus", "focus-within", "focus-visible", "active", "visited",
    "target", "disabled", "enabled", "checked", "indeterminate", "default",
    "required", "valid", "invalid", "in-range", "out-of-range",
    "placeholder-shown", "autofill", "read-only", "empty",
    "first", "last", "only", "odd", "even", "first-of-type", "last-of-type",
    "only-of-type", "open",
    "before", "after", "first-letter", "first-line", "marker", "selection",
    "file", "backdrop", "placeholder",
    "dark", "motion-safe", "motion-reduce", "contrast-more", "contrast-less",
    "print", "portrait", "landscape", "rtl", "ltr",
];

const DEFAULT_SHADES: &[&str] = &[
    "50", "100", "200", "300", "400", "500", "600", "700", "800", "900", "950",
];

const DEFAULT_PALETTE: &[&str] = &[
    "slate", "gray", "zinc", "neutral", "stone", "red", "orange", "amber",
    "yellow", "lime", "green", "emerald", "teal", "cyan", "sky", "blue",
    "indigo", "violet", "purple", "fuchsia", "pink", "rose",
];

const DEFAULT_SINGLE_COLORS: &[&str] = &["inherit", "current", "transparent", "black", "white"];

const DEFAULT_SPACING: &[&str] = &[
    "0", "px", "0.5", "1", "1.5", "2", "2.5", "3", "3.5", "4", "5", "6", "7",
    "8", "9", "10", "11", "12", "14", "16", "20", "24", "28", "32", "36", "40",
    "44", "48", "52", "56", "60", "64", "72", "80", "96",
];

const DEFAULT_SCREENS: &[&str] = &["sm", "md", "lg", "xl", "2xl"];

#[derive(Debug, Clone)]
struct LayerMemo {
    config_path: PathBuf,
    config_mtime: SystemTime,
    cwd: PathBuf,
    layers: Vec<PathBuf>,
}

/// Expands a [`DesignConfig`] into utility names.
#[derive(Debug, Clone, Default)]
pub struct ThemeCatalogueGenerator {
    // Layer list of the last design config read for `inputs`
    layer_memo: RefCell<Option<LayerMemo>>,
}

impl ThemeCatalogueGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the catalogue for an already loaded design configuration
    pub fn expand(&self, config: &DesignConfig) -> Catalogue {
        let mut catalogue = Catalogue::default();
        let classes = &mut catalogue.classes;

        classes.extend(config.safelist.iter().cloned());
        classes.extend(STATIC_UTILITIES.iter().map(|s| s.to_string()));

        for color in color_names(config) {
            for prefix in COLOR_PREFIXES {
                classes.insert(format!("{}-{}", prefix, color));
            }
        }

        for step in spacing_steps(config) {
            for prefix in SPACING_PREFIXES {
                classes.insert(format!("{}-{}", prefix, step));
            }
            for prefix in NEGATABLE_PREFIXES {
                classes.insert(format!("-{}-{}", prefix, step));
            }
        }

        let variants = &mut catalogue.variants;
        variants.extend(BASE_VARIANTS.iter().map(|s| s.to_string()));
        variants.extend(screen_names(config));
        variants.extend(config.variants.iter().cloned());

        catalogue
    }

    /// Classes declared inside `@layer` blocks of the configured layer files
    fn layer_classes(&self, config: &DesignConfig, cwd: &Path) -> IndexSet<String> {
        let scanner = SelectorClassExtractor::new();
        let mut classes = IndexSet::new();

        for path in layer_paths(config, cwd) {
            let source = match fs::read_to_string(&path) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Cannot read layer stylesheet '{}': {}", path.display(), e);
                    continue;
                }
            };
            match scanner.scan(&source, &path) {
                Ok(found) => classes.extend(found.layered),
                Err(e) => tracing::warn!("Skipping layer stylesheet: {}", e),
            }
        }

        classes
    }

    /// Layer files named by the design config at `config_path`, reparsed
    /// only when that file's modification time changes
    fn configured_layers(&self, config_path: &Path, cwd: &Path) -> Vec<PathBuf> {
        let Ok(config_mtime) = fs::metadata(config_path).and_then(|m| m.modified()) else {
            return Vec::new();
        };

        if let Some(memo) = self.layer_memo.borrow().as_ref() {
            if memo.config_path == config_path && memo.config_mtime == config_mtime && memo.cwd == cwd {
                return memo.layers.clone();
            }
        }

        let layers = match DesignConfig::from_file(config_path) {
            Ok(config) => layer_paths(&config, cwd),
            Err(e) => {
                tracing::debug!("No layer files from unreadable design config: {}", e);
                return Vec::new();
            }
        };
        *self.layer_memo.borrow_mut() = Some(LayerMemo {
            config_path: config_path.to_path_buf(),
            config_mtime,
            cwd: cwd.to_path_buf(),
            layers: layers.clone(),
        });
        layers
    }
}

impl CatalogueGenerator for ThemeCatalogueGenerator {
    fn inputs(&self, settings: &CatalogueSettings, cwd: &Path) -> Vec<PathBuf> {
        let Some(config_path) = settings.resolve_config_path(cwd) else {
            return Vec::new();
        };
        let mut inputs = vec![config_path.clone()];
        if settings.include_generated_classes {
            inputs.extend(self.configured_layers(&config_path, cwd));
        }
        inputs
    }

    fn generate(&self, settings: &CatalogueSettings, cwd: &Path) -> Result<Catalogue> {
        let config = match settings.resolve_config_path(cwd) {
            Some(path) => DesignConfig::from_file(&path).map_err(|e| ValidatorError::CatalogueError {
                message: format!("cannot load design config {}: {}", path.display(), e),
            })?,
            None => DesignConfig::default(),
        };

        let mut catalogue = self.expand(&config);
        if settings.include_generated_classes {
            catalogue.classes.extend(self.layer_classes(&config, cwd));
        }

        tracing::debug!(
            classes = catalogue.classes.len(),
            variants = catalogue.variants.len(),
            "generated utility catalogue"
        );
        Ok(catalogue)
    }
}

fn layer_paths(config: &DesignConfig, cwd: &Path) -> Vec<PathBuf> {
    config.layers.iter().map(|layer| cwd.join(layer)).collect()
}

fn push_color(names: &mut IndexSet<String>, name: &str, value: &ColorValue) {
    match value {
        ColorValue::Single(_) => {
            names.insert(name.to_string());
        }
        ColorValue::Shades(shades) => {
            for shade in shades.keys() {
                if shade == "DEFAULT" {
                    names.insert(name.to_string());
                } else {
                    names.insert(format!("{}-{}", name, shade));
                }
            }
        }
    }
}

fn color_names(config: &DesignConfig) -> IndexSet<String> {
    let mut names = IndexSet::new();
    let theme = &config.theme;

    if theme.colors.is_empty() {
        names.extend(DEFAULT_SINGLE_COLORS.iter().map(|s| s.to_string()));
        for color in DEFAULT_PALETTE {
            for shade in DEFAULT_SHADES {
                names.insert(format!("{}-{}", color, shade));
            }
        }
    } else {
        for (name, value) in &theme.colors {
            push_color(&mut names, name, value);
        }
    }

    for (name, value) in &theme.extend.colors {
        push_color(&mut names, name, value);
    }
    names
}

fn keys_or_default<'a>(
    base: &'a BTreeMap<String, String>,
    extend: &'a BTreeMap<String, String>,
    defaults: &'a [&'a str],
) -> IndexSet<String> {
    let mut names: IndexSet<String> = if base.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        base.keys().cloned().collect()
    };
    names.extend(extend.keys().cloned());
    names
}

fn spacing_steps(config: &DesignConfig) -> IndexSet<String> {
    let theme = &config.theme;
    keys_or_default(&theme.spacing, &theme.extend.spacing, DEFAULT_SPACING)
}

fn screen_names(config: &DesignConfig) -> IndexSet<String> {
    let theme = &config.theme;
    keys_or_default(&theme.screens, &theme.extend.screens, DEFAULT_SCREENS)
}
