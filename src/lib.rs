#[cfg(feature = "cli")]
pub mod args;
pub mod cache_key;
pub mod catalogue;
pub mod class_name;
pub mod config;
pub mod engine;
pub mod errors;
pub mod extractor;
#[cfg(feature = "cli")]
pub mod logging;
pub mod manifest;
pub mod pattern;
pub mod registry;
pub mod resolver;
pub mod stylesheet;
pub mod validator;

#[cfg(feature = "cli")]
pub use args::{CheckArgs, Cli, Commands, ModeArg, OutputFormat, RegistryArgs, SourceArgs};
pub use cache_key::{CacheKey, CacheKeyBuilder};
pub use catalogue::{Catalogue, CatalogueGenerator, ThemeCatalogueGenerator};
pub use class_name::{parse_class_name, ClassNameParser, ParsedArbitraryValue, ParsedClassName, VariantCheck};
pub use config::{CatalogueOption, CatalogueSettings, DesignConfig, ValidatorConfig};
pub use engine::Engine;
pub use errors::{Result, ValidatorError};
pub use extractor::{extract, extract_class_names, extract_class_names_from_string, ExpressionNode, ExtractMode};
pub use manifest::{RegistryReport, ReportBuilder};
pub use pattern::{CompiledPattern, PatternSet};
pub use registry::{ClassRegistry, RegistryBuilder, RegistryCache};
pub use resolver::{FileResolutionCache, ResolvedFile};
pub use stylesheet::{SelectorClassExtractor, StylesheetExtractor};
pub use validator::{ClassValidator, Diagnostic, MessageKind};

use serde::Deserialize;
#[cfg(feature = "cli")]
use std::io::{Read, Write};
#[cfg(feature = "cli")]
use std::path::Path;

/// Expression input for `check --stdin-expr`: one tree or a list of trees
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExpressionInput {
    Many(Vec<ExpressionNode>),
    One(ExpressionNode),
}

impl ExpressionInput {
    pub fn into_nodes(self) -> Vec<ExpressionNode> {
        match self {
            Self::Many(nodes) => nodes,
            Self::One(node) => vec![node],
        }
    }
}

/// Run `check`, writing diagnostics to `out`. Returns the number found.
///
/// Each `--class` value (or each expression tree) is one attribute; its
/// zero-based index is the diagnostic location.
#[cfg(feature = "cli")]
pub fn run_check<R: Read, W: Write>(args: &CheckArgs, input: R, out: &mut W) -> Result<usize> {
    let config = args.source.to_config()?;
    let engine = Engine::new();
    let mut diagnostics = Vec::new();

    if args.stdin_expr {
        let nodes = serde_json::from_reader::<_, ExpressionInput>(input)?.into_nodes();
        for (index, node) in nodes.iter().enumerate() {
            diagnostics.extend(engine.check_expression(&config, node, args.mode.into(), &index));
        }
    } else {
        for (index, value) in args.class.iter().enumerate() {
            diagnostics.extend(engine.check_class_string(&config, value, &index));
        }
    }

    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &diagnostics)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for diagnostic in &diagnostics {
                writeln!(
                    out,
                    "[{}] {} ({})",
                    diagnostic.location,
                    diagnostic,
                    diagnostic.kind.id()
                )?;
            }
        }
    }

    tracing::debug!(count = diagnostics.len(), "check finished");
    Ok(diagnostics.len())
}

/// Run `registry`: build the registry and emit its JSON report
#[cfg(feature = "cli")]
pub fn run_registry<W: Write>(args: &RegistryArgs, out: &mut W) -> Result<RegistryReport> {
    let config = args.source.to_config()?;
    let registry = Engine::new().registry(&config);
    let report = ReportBuilder::new().with_registry(&registry).build();
    let content = report.to_pretty_json()?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            write_atomic(path, &content)?;
        }
        None => writeln!(out, "{}", content)?,
    }
    Ok(report)
}

/// Write file atomically by writing to temp file then renaming
#[cfg(feature = "cli")]
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = std::fs::File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
