use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use crate::errors::{ValidatorError, Result};

/// Validation configuration, as assembled by the host linter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// Stylesheet glob patterns
    pub stylesheets: Vec<String>,

    /// Generated utility catalogue: `false`, `true` or a settings object
    pub catalogue: CatalogueOption,

    /// Names (or `*` patterns) that are always valid
    pub allowlist: Vec<String>,

    /// Names (or `*` patterns) that are never valid
    pub blocklist: Vec<String>,

    /// Names (or `*` patterns) that are never reported
    pub ignore: Vec<String>,

    /// Working directory; relative patterns and config paths resolve against it
    pub cwd: PathBuf,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            stylesheets: Vec::new(),
            catalogue: CatalogueOption::default(),
            allowlist: Vec::new(),
            blocklist: Vec::new(),
            ignore: Vec::new(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

/// Catalogue switch as written in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogueOption {
    Enabled(bool),
    Settings(CatalogueSettings),
}

impl Default for CatalogueOption {
    fn default() -> Self {
        Self::Enabled(false)
    }
}

impl CatalogueOption {
    /// Normalized settings; `None` when the catalogue is disabled.
    pub fn settings(&self) -> Option<CatalogueSettings> {
        match self {
            Self::Enabled(false) => None,
            Self::Enabled(true) => Some(CatalogueSettings::default()),
            Self::Settings(settings) => Some(settings.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogueSettings {
    /// Design-system config file; auto-detected in cwd when absent
    pub config_path: Option<PathBuf>,

    /// Include classes generated from `@layer` blocks of the configured layer files
    pub include_generated_classes: bool,
}

/// Default design-config file names, tried in order.
pub const DESIGN_CONFIG_FILES: &[&str] = &[
    "tailwind.config.json",
    "tailwind.config.yaml",
    "tailwind.config.yml",
];

impl CatalogueSettings {
    /// The design-config file this catalogue reads, if one exists
    pub fn resolve_config_path(&self, cwd: &Path) -> Option<PathBuf> {
        match &self.config_path {
            Some(path) => Some(cwd.join(path)),
            None => DESIGN_CONFIG_FILES
                .iter()
                .map(|name| cwd.join(name))
                .find(|path| path.is_file()),
        }
    }
}

/// Design-system configuration the utility catalogue is generated from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    /// Class names that are always part of the catalogue
    pub safelist: Vec<String>,

    /// Theme configuration
    pub theme: DesignTheme,

    /// Extra variant names
    pub variants: Vec<String>,

    /// Stylesheets whose `@layer` blocks contribute classes
    pub layers: Vec<String>,
}

/// Theme configuration; non-empty maps replace the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignTheme {
    pub colors: BTreeMap<String, ColorValue>,
    pub spacing: BTreeMap<String, String>,
    pub screens: BTreeMap<String, String>,

    /// Theme extensions, merged on top of defaults
    pub extend: DesignThemeExtend,
}

/// Theme extensions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignThemeExtend {
    pub colors: BTreeMap<String, ColorValue>,
    pub spacing: BTreeMap<String, String>,
    pub screens: BTreeMap<String, String>,
}

/// A color is either a single value or a map of shades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Single(String),
    Shades(BTreeMap<String, String>),
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ValidatorError::ConfigError {
        message: format!("Failed to read config file {}: {}", path.display(), e),
    })
}

/// Deserialize a YAML or JSON file, picking the format from the extension
fn load_from_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            let content = read_config_file(path)?;
            serde_yaml::from_str(&content).map_err(|e| ValidatorError::ConfigError {
                message: format!("Failed to parse YAML config {}: {}", path.display(), e),
            })
        }
        Some("json") => {
            let content = read_config_file(path)?;
            serde_json::from_str(&content).map_err(|e| ValidatorError::ConfigError {
                message: format!("Failed to parse JSON config {}: {}", path.display(), e),
            })
        }
        _ => Err(ValidatorError::ConfigError {
            message: format!(
                "Unsupported config file format: {}. Use .yaml, .yml, or .json",
                path.display()
            ),
        }),
    }
}

impl ValidatorConfig {
    /// Load configuration from a file (auto-detect format).
    ///
    /// A relative `cwd` in the file is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut config: Self = load_from_file(path)?;
        if config.cwd.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.cwd = base.join(&config.cwd);
        }
        Ok(config)
    }

    /// Merge command-line additions on top of this configuration
    pub fn merge(mut self, other: Self) -> Self {
        for (target, source) in [
            (&mut self.stylesheets, other.stylesheets),
            (&mut self.allowlist, other.allowlist),
            (&mut self.blocklist, other.blocklist),
            (&mut self.ignore, other.ignore),
        ] {
            for item in source {
                if !target.contains(&item) {
                    target.push(item);
                }
            }
        }

        if other.catalogue.settings().is_some() {
            self.catalogue = other.catalogue;
        }

        self
    }
}

impl DesignConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        load_from_file(path)
    }
}
