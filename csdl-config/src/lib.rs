//! Configuration for the CSDL editor tooling.
//!
//! The vocabulary of the pylon data source, folding lengths, indentation and the help URL all
//! ship in `defaults/csdl.default.toml`, compiled in with `include_str!`. Hosts stack their own
//! TOML on top through [`Loader`]; a later layer wins key by key and replaces arrays whole, so a
//! user file listing `targets` swaps the entire target list.

use config::builder::DefaultState;
use config::{
    Config, ConfigBuilder, ConfigError, File, FileFormat, FileSourceFile, Source, ValueKind,
};
use csdl_analysis::{FoldOptions, HelpOptions};
use csdl_parser::csdl::{GrammarVocabulary, Lexer, LexerOptions, VocabularySpec};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_TOML: &str = include_str!("../defaults/csdl.default.toml");

/// Top-level configuration consumed by CSDL applications.
#[derive(Debug, Clone, Deserialize)]
pub struct CsdlConfig {
    /// Words of the data source the filters are written for.
    pub vocabulary: VocabularySpec,
    pub folding: FoldOptions,
    /// Indentation knobs of the lexer.
    pub editor: LexerOptions,
    pub help: HelpOptions,
}

impl CsdlConfig {
    pub fn grammar(&self) -> GrammarVocabulary {
        GrammarVocabulary::from_spec(&self.vocabulary)
    }

    /// Lexer over a freshly built vocabulary.
    pub fn lexer(&self) -> Lexer {
        Lexer::new(Arc::new(self.grammar()), self.editor)
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Stacks TOML layers over the embedded defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
        .with_toml(DEFAULT_TOML)
    }

    /// Layer TOML text the host keeps in memory, such as editor settings.
    pub fn with_toml(self, text: &str) -> Self {
        self.layer(File::from_str(text, FileFormat::Toml))
    }

    /// Layer a TOML file that must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(toml_file(path.as_ref(), true))
    }

    /// Like [`Loader::with_file`], but an absent file is skipped.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(toml_file(path.as_ref(), false))
    }

    /// Set one dotted key, e.g. `folding.fold_on_load`, above every layer.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigLoadError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<CsdlConfig, ConfigLoadError> {
        let merged = self.builder.build()?;
        Ok(merged.try_deserialize()?)
    }

    fn layer<S>(mut self, source: S) -> Self
    where
        S: Source + Send + Sync + 'static,
    {
        self.builder = self.builder.add_source(source);
        self
    }
}

fn toml_file(path: &Path, required: bool) -> File<FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml).required(required)
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<CsdlConfig, ConfigLoadError> {
    Loader::new().build()
}
