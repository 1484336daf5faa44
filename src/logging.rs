//! Tracing subscriber setup for the CLI.
//!
//! Controlled by two environment variables:
//!
//! - `CLASS_VALIDATOR_LOG`: filter directives in `RUST_LOG` syntax
//!   (falls back to `RUST_LOG`)
//! - `CLASS_VALIDATOR_LOG_FORMAT`: `text` (default) or `json`
//!
//! ```bash
//! CLASS_VALIDATOR_LOG=debug class-validator-cli check --class "flex p-4"
//! CLASS_VALIDATOR_LOG=tailwind_class_validator::registry=debug \
//!     CLASS_VALIDATOR_LOG_FORMAT=json class-validator-cli registry
//! ```
//!
//! Nothing is installed unless one of the filter variables is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

pub const LOG_ENV: &str = "CLASS_VALIDATOR_LOG";
pub const LOG_FORMAT_ENV: &str = "CLASS_VALIDATOR_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var(LOG_FORMAT_ENV).unwrap_or_default())
    }
}

fn build_filter() -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber. Output goes to stderr so stdout stays
/// reserved for diagnostics and reports.
pub fn init_tracing() {
    if std::env::var(LOG_ENV).is_err() && std::env::var("RUST_LOG").is_err() {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
