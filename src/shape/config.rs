//! Configuration loader
//!
//! `defaults/logshape.default.toml` is embedded into the crate so the documented defaults and
//! the runtime behavior cannot drift apart. Callers layer their own files and single-key
//! overrides on top through [Loader] before deserializing into [ShapeConfig].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, FileSourceFile, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/logshape.default.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShapeConfig {
    pub limits: LimitsConfig,
    pub output: OutputConfig,
}

/// Bounds applied to each line before it reaches the engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LimitsConfig {
    pub max_line_bytes: usize,
    pub max_tokens: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    pub format: String,
    pub include_free_row: bool,
    pub blank_key_prefix: String,
}

/// Builds a [ShapeConfig] from the embedded defaults, then each layer in the order added
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

fn toml_layer(path: &Path, required: bool) -> File<FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml).required(required)
}

impl Loader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Adds a TOML file that must exist, e.g. the one named by `--config`
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.builder = self.builder.add_source(toml_layer(path.as_ref(), true));
        self
    }

    /// Adds a TOML file that is skipped when absent
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        self.builder = self.builder.add_source(toml_layer(path.as_ref(), false));
        self
    }

    /// Sets one dotted key, e.g. `limits.max_tokens`, above every file layer
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Applies a `key=value` assignment as written on the command line
    pub fn with_assignment(self, assignment: &str) -> Result<Self, ConfigError> {
        match assignment.split_once('=') {
            Some((key, value)) => self.set_override(key.trim(), value.trim()),
            None => Err(ConfigError::Message(format!(
                "expected key=value, got '{}'",
                assignment
            ))),
        }
    }

    pub fn build(self) -> Result<ShapeConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ShapeConfig {
    /// The embedded defaults. Falls back to the same values written out if the embedded file
    /// ever fails to deserialize.
    fn default() -> Self {
        load_defaults().unwrap_or(ShapeConfig {
            limits: LimitsConfig {
                max_line_bytes: 65536,
                max_tokens: 8192,
                max_depth: 128,
            },
            output: OutputConfig {
                format: "shape-simple".to_string(),
                include_free_row: true,
                blank_key_prefix: "col_".to_string(),
            },
        })
    }
}

/// The embedded defaults with no layers on top
pub fn load_defaults() -> Result<ShapeConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.limits.max_line_bytes, 65536);
        assert_eq!(config.limits.max_tokens, 8192);
        assert_eq!(config.limits.max_depth, 128);
        assert_eq!(config.output.format, "shape-simple");
        assert!(config.output.include_free_row);
        assert_eq!(config.output.blank_key_prefix, "col_");
    }

    #[test]
    fn default_matches_embedded_file() {
        assert_eq!(ShapeConfig::default(), load_defaults().expect("defaults"));
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("limits.max_tokens", 16_i64)
            .expect("override to apply")
            .set_override("output.blank_key_prefix", "field")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.limits.max_tokens, 16);
        assert_eq!(config.output.blank_key_prefix, "field");
    }

    #[test]
    fn applies_command_line_assignments() {
        let config = Loader::new()
            .with_assignment("limits.max_depth = 8")
            .expect("assignment to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.limits.max_depth, 8);

        assert!(Loader::new().with_assignment("limits.max_depth").is_err());
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[output]\ninclude_free_row = false").expect("write");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert!(!config.output.include_free_row);
        assert_eq!(config.output.format, "shape-simple");
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Loader::new()
            .with_file("/nonexistent/logshape.toml")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/logshape.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.limits.max_tokens, 8192);
    }
}
