use serde::{Deserialize, Serialize};
use serde_json::Value;
use indexmap::IndexMap;
use chrono::{DateTime, Utc};

use crate::registry::ClassRegistry;

/// Metadata for a registry report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Version of the report format
    pub version: String,

    /// Timestamp when the report was generated
    pub generated_at: DateTime<Utc>,

    /// Hex fingerprint of the configuration the registry was built from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,

    /// Number of stylesheets that contributed classes
    pub stylesheets: usize,

    /// Whether the utility catalogue was enabled
    pub catalogue_enabled: bool,

    /// Validator version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator_version: Option<String>,
}

/// Where a class name comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassOrigin {
    /// Defined only by stylesheets; cannot take variants
    Stylesheet,
    /// Catalogue or literal allowlist entry
    Utility,
}

/// Per-class entry in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportClassInfo {
    pub origin: ClassOrigin,

    /// Stylesheets defining this class
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

/// List patterns the registry was built with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportPatterns {
    pub allow: Vec<String>,
    pub block: Vec<String>,
    pub ignore: Vec<String>,
}

/// Counts over the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub total_classes: usize,
    pub stylesheet_classes: usize,
    pub utility_classes: usize,
    pub variants: usize,
    pub wildcard_patterns: usize,
}

/// JSON dump of a class registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryReport {
    pub metadata: ReportMetadata,

    /// Literal class names in registry order
    pub classes: IndexMap<String, ReportClassInfo>,

    pub variants: Vec<String>,

    pub patterns: ReportPatterns,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ReportStatistics>,
}

impl RegistryReport {
    /// Create an empty report with default metadata
    pub fn new() -> Self {
        Self {
            metadata: ReportMetadata {
                version: "1.0.0".to_string(),
                generated_at: Utc::now(),
                cache_key: None,
                stylesheets: 0,
                catalogue_enabled: false,
                validator_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
            classes: IndexMap::new(),
            variants: Vec::new(),
            patterns: ReportPatterns::default(),
            statistics: None,
        }
    }

    /// Record a class, merging source files for repeated names
    pub fn add_class(&mut self, class_name: String, origin: ClassOrigin, file: Option<String>) {
        let entry = self.classes.entry(class_name).or_insert_with(|| ReportClassInfo {
            origin,
            files: Vec::new(),
        });
        if let Some(file) = file {
            if !entry.files.contains(&file) {
                entry.files.push(file);
            }
        }
    }

    pub fn calculate_statistics(&mut self) {
        let stylesheet_classes = self
            .classes
            .values()
            .filter(|info| info.origin == ClassOrigin::Stylesheet)
            .count();

        self.statistics = Some(ReportStatistics {
            total_classes: self.classes.len(),
            stylesheet_classes,
            utility_classes: self.classes.len() - stylesheet_classes,
            variants: self.variants.len(),
            wildcard_patterns: self
                .patterns
                .allow
                .iter()
                .chain(&self.patterns.block)
                .chain(&self.patterns.ignore)
                .filter(|pattern| pattern.contains('*'))
                .count(),
        });
    }

    /// Convert report to JSON value
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for RegistryReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for registry reports
pub struct ReportBuilder {
    report: RegistryReport,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            report: RegistryReport::new(),
        }
    }

    /// Fill classes, variants and patterns from a registry
    pub fn with_registry(mut self, registry: &ClassRegistry) -> Self {
        let report = &mut self.report;
        report.metadata.cache_key = registry.cache_key().map(|key| key.to_hex());
        report.metadata.catalogue_enabled = registry.catalogue_enabled();
        report.metadata.stylesheets = registry.classes_by_file().len();

        for (path, classes) in registry.classes_by_file() {
            let file = path.display().to_string();
            for class in classes {
                if registry.is_css_class(class) {
                    report.add_class(class.clone(), ClassOrigin::Stylesheet, Some(file.clone()));
                }
            }
        }
        for class in registry.all_classes() {
            let origin = if registry.is_css_class(class) {
                ClassOrigin::Stylesheet
            } else {
                ClassOrigin::Utility
            };
            report.add_class(class.clone(), origin, None);
        }

        report.variants = registry.valid_variants().iter().cloned().collect();
        report.patterns = ReportPatterns {
            allow: sources(registry.allow_patterns()),
            block: sources(registry.block_patterns()),
            ignore: sources(registry.ignore_patterns()),
        };
        self
    }

    /// Override the generation timestamp
    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.report.metadata.generated_at = generated_at;
        self
    }

    pub fn build(mut self) -> RegistryReport {
        self.report.calculate_statistics();
        self.report
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn sources(patterns: &crate::pattern::PatternSet) -> Vec<String> {
    patterns.iter().map(|p| p.source().to_string()).collect()
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
    use chrono::TimeZone;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    struct FixedCatalogue;

    impl CatalogueGenerator for FixedCatalogue {
        fn generate(&self, _settings: &CatalogueSettings, _cwd: &Path) -> Result<Catalogue> {
            Ok(Catalogue {
                classes: ["flex", "container"].iter().map(|s| s.to_string()).collect(),
                variants: ["hover"].iter().map(|s| s.to_string()).collect(),
            })
        }
    }

    #[test]
    fn test_report_creation() {
        let report = RegistryReport::new();
        assert_eq!(report.metadata.version, "1.0.0");
        assert!(report.classes.is_empty());
        assert!(!report.metadata.catalogue_enabled);
    }

    #[test]
    fn test_add_class_merges_files() {
        let mut report = RegistryReport::new();
        report.add_class("btn".to_string(), ClassOrigin::Stylesheet, Some("a.css".to_string()));
        report.add_class("btn".to_string(), ClassOrigin::Stylesheet, Some("b.css".to_string()));
        report.add_class("btn".to_string(), ClassOrigin::Stylesheet, Some("a.css".to_string()));
        assert_eq!(report.classes["btn"].files, vec!["a.css", "b.css"]);
    }

    #[test]
    fn test_statistics_count_only_wildcard_patterns() {
        let mut report = RegistryReport::new();
        report.patterns = ReportPatterns {
            allow: vec!["custom-*".to_string(), "js-hook".to_string()],
            block: vec!["legacy".to_string()],
            ignore: vec!["ga-*".to_string()],
        };
        report.calculate_statistics();
        assert_eq!(report.statistics.unwrap().wildcard_patterns, 2);
    }

    #[test]
    fn test_report_from_registry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.css");
        fs::write(&path, ".btn{} .container{}").unwrap();
        let files = vec![ResolvedFile {
            mtime: fs::metadata(&path).unwrap().modified().unwrap(),
            path: path.clone(),
        }];
        let settings = CatalogueSettings::default();
        let allowlist = vec!["custom-*".to_string()];
        let ignore = vec!["js-*".to_string()];

        let registry = RegistryBuilder::new(&SelectorClassExtractor::new(), &FixedCatalogue).build(
            &RegistryInputs {
                files: &files,
                catalogue: Some(&settings),
                allowlist: &allowlist,
                blocklist: &[],
                ignore: &ignore,
                cwd: dir.path(),
            },
            None,
        );

        let generated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let report = ReportBuilder::new()
            .with_registry(&registry)
            .with_generated_at(generated_at)
            .build();

        assert_eq!(report.classes["btn"].origin, ClassOrigin::Stylesheet);
        assert_eq!(report.classes["btn"].files, vec![path.display().to_string()]);
        assert_eq!(report.classes["container"].origin, ClassOrigin::Utility);
        assert!(report.classes["container"].files.is_empty());
        assert_eq!(report.variants, vec!["hover"]);
        assert_eq!(report.patterns.allow, vec!["custom-*"]);
        assert_eq!(report.patterns.ignore, vec!["js-*"]);

        let stats = report.statistics.as_ref().unwrap();
        assert_eq!(stats.total_classes, 3);
        assert_eq!(stats.stylesheet_classes, 1);
        assert_eq!(stats.utility_classes, 2);

        let json = report.to_json();
        assert_eq!(json["metadata"]["generated_at"], "2024-01-01T00:00:00Z");
        assert_eq!(json["metadata"]["catalogue_enabled"], true);
        assert_eq!(json["classes"]["btn"]["origin"], "stylesheet");
    }
}
