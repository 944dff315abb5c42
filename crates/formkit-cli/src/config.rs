//! # CLI Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! format: json     # text | json, default text
//! log: formkit=debug
//! ```
//!
//! Command-line flags take precedence over the file.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub format: OutputFormat,
    /// `EnvFilter` directive used when no `-v` flag is given.
    pub log: Option<String>,
}

impl CliConfig {
    /// Read a config file. A missing `--config` yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// The format to use, letting an explicit flag win.
    pub fn format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.unwrap_or(self.format)
    }

    /// Log filter directive for a `-v` count.
    pub fn log_filter(&self, verbose: u8) -> String {
        match (verbose, &self.log) {
            (0, Some(directive)) => directive.clone(),
            (0, None) => "warn".to_string(),
            (1, _) => "info".to_string(),
            (2, _) => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}
