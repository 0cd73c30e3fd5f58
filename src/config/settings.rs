//! TOML-based configuration for templar.
//!
//! Example configuration:
//! ```toml
//! [compile]
//! query = "select"        # select | ask | construct
//! rendering = "union"     # union | optional
//! qualified_labels = false
//! order = true
//!
//! [output]
//! indent = 2
//!
//! [[edit.cut]]
//! position = "object"
//! pattern = "^/1/2/.*"
//! when = "matches"
//!
//! [[edit.search]]
//! origin = "^/1$"
//! predicate = "http://www.w3.org/2000/01/rdf-schema#label"
//! value = "alice"
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compiler::{QueryType, Rendering};
use crate::edit::{CutWhen, Editor, Endpoint, SearchInserter, TriplePatternCutter};
use crate::event::Term;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub compile: CompileSettings,
    pub output: OutputSettings,
    pub edit: EditSettings,
}

/// Compiler settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompileSettings {
    pub query: QueryType,
    pub rendering: Rendering,
    /// Prefix synthetic labels with the opposite endpoint variable.
    pub qualified_labels: bool,
    /// Append a deterministic ORDER BY.
    pub order: bool,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            query: QueryType::Select,
            rendering: Rendering::Union,
            qualified_labels: false,
            order: true,
        }
    }
}

/// Text output settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Edit rules, applied in file order: cutters first, then search inserters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EditSettings {
    pub cut: Vec<CutRule>,
    pub search: Vec<SearchRule>,
}

/// Drop triple patterns by endpoint origin.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CutRule {
    #[serde(default)]
    pub position: Endpoint,
    pub pattern: String,
    #[serde(default)]
    pub when: CutWhen,
}

/// Add a text search on subjects whose origin matches.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchRule {
    pub origin: String,
    /// Absolute IRI, `<iri>`, or `prefix:local`.
    pub predicate: String,
    pub value: String,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TEMPLAR_CONFIG`
    /// 2. `./templar.toml`
    /// 3. `~/.config/templar/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("TEMPLAR_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("templar.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("templar").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Build the configured editors, in application order.
    pub fn editors(&self) -> Result<Vec<Box<dyn Editor>>, SettingsError> {
        let mut editors: Vec<Box<dyn Editor>> = Vec::new();
        for rule in &self.edit.cut {
            let pattern = compile_pattern(&rule.pattern)?;
            editors.push(Box::new(TriplePatternCutter::new(rule.position, pattern, rule.when)));
        }
        for rule in &self.edit.search {
            let origin = compile_pattern(&rule.origin)?;
            editors.push(Box::new(SearchInserter::new(
                origin,
                predicate_term(&rule.predicate),
                rule.value.clone(),
            )));
        }
        Ok(editors)
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, SettingsError> {
    Regex::new(pattern).map_err(|source| SettingsError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// `<iri>` and scheme IRIs are absolute; `prefix:local` is compact.
fn predicate_term(text: &str) -> Term {
    if let Some(iri) = text.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Term::iri(iri);
    }
    match text.split_once(':') {
        Some((prefix, local)) if !local.starts_with("//") && !prefix.contains('/') => {
            Term::curie(prefix, local)
        }
        _ => Term::iri(text),
    }
}
