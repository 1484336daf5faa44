use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{CatalogueOption, CatalogueSettings, ValidatorConfig};
use crate::errors::Result;
use crate::extractor::ExtractMode;

/// Class validator CLI - Checks class names against stylesheets and the utility catalogue
#[derive(Parser, Debug)]
#[command(name = "class-validator-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate class strings or expression trees
    Check(CheckArgs),
    /// Print the class registry for a configuration as JSON
    Registry(RegistryArgs),
}

/// Options describing where class names come from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Configuration file path (YAML or JSON)
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        env = "CLASS_VALIDATOR_CONFIG",
        help = "Path to configuration file (YAML or JSON format)"
    )]
    pub config: Option<PathBuf>,

    /// Working directory
    #[arg(
        long = "cwd",
        value_name = "DIR",
        help = "Directory that relative patterns resolve against"
    )]
    pub cwd: Option<PathBuf>,

    /// Stylesheet patterns
    #[arg(
        short = 's',
        long = "css",
        value_name = "PATTERN",
        num_args = 1..,
        help = "Stylesheet glob patterns to read class names from"
    )]
    pub css: Vec<String>,

    #[arg(
        short = 'a',
        long = "allow",
        value_name = "PATTERN",
        num_args = 1..,
        help = "Class names or * patterns that are always valid"
    )]
    pub allow: Vec<String>,

    #[arg(
        short = 'b',
        long = "block",
        value_name = "PATTERN",
        num_args = 1..,
        help = "Class names or * patterns that are never valid"
    )]
    pub block: Vec<String>,

    #[arg(
        short = 'x',
        long = "ignore",
        value_name = "PATTERN",
        num_args = 1..,
        help = "Class names or * patterns that are never reported"
    )]
    pub ignore: Vec<String>,

    /// Enable the utility catalogue
    #[arg(
        long = "catalogue",
        default_value_t = false,
        help = "Enable the generated utility catalogue"
    )]
    pub catalogue: bool,

    #[arg(
        long = "design-config",
        value_name = "PATH",
        help = "Design-system config for the catalogue (implies --catalogue)"
    )]
    pub design_config: Option<PathBuf>,

    #[arg(
        long = "include-generated",
        default_value_t = false,
        help = "Add classes from @layer blocks of the design config's layer files (implies --catalogue)"
    )]
    pub include_generated: bool,
}

impl SourceArgs {
    /// Configuration file (if any) with command-line additions merged on top
    pub fn to_config(&self) -> Result<ValidatorConfig> {
        let mut base = match &self.config {
            Some(path) => ValidatorConfig::from_file(path)?,
            None => ValidatorConfig::default(),
        };
        if let Some(cwd) = &self.cwd {
            base.cwd = cwd.clone();
        }

        let catalogue = if self.design_config.is_some() || self.include_generated {
            CatalogueOption::Settings(CatalogueSettings {
                config_path: self.design_config.clone(),
                include_generated_classes: self.include_generated,
            })
        } else {
            CatalogueOption::Enabled(self.catalogue)
        };

        let overrides = ValidatorConfig {
            stylesheets: self.css.clone(),
            catalogue,
            allowlist: self.allow.clone(),
            blocklist: self.block.clone(),
            ignore: self.ignore.clone(),
            cwd: base.cwd.clone(),
        };
        Ok(base.merge(overrides))
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeArg {
    /// Object keys are class names
    #[default]
    Keys,
    /// Object values hold class strings
    Values,
}

impl From<ModeArg> for ExtractMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Keys => ExtractMode::Keys,
            ModeArg::Values => ExtractMode::Values,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the check command
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Class attribute values to check
    #[arg(
        long = "class",
        value_name = "CLASSES",
        num_args = 1..,
        required_unless_present = "stdin_expr",
        help = "Whitespace-separated class attribute value; repeat for several attributes"
    )]
    pub class: Vec<String>,

    #[arg(
        long = "stdin-expr",
        default_value_t = false,
        conflicts_with = "class",
        help = "Read a JSON expression tree (or an array of trees) from stdin"
    )]
    pub stdin_expr: bool,

    #[arg(
        long = "mode",
        value_enum,
        default_value_t = ModeArg::Keys,
        help = "How object literals contribute class names"
    )]
    pub mode: ModeArg,

    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Diagnostic output format"
    )]
    pub format: OutputFormat,
}

/// Arguments for the registry command
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Write the report to a file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}
