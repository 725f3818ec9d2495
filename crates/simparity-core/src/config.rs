//! Comparison configuration file format.
//!
//! Loads [`ParityConfig`] from a TOML file (`simparity.toml`) with
//! environment variable overrides via `SIMPARITY_*` prefixed variables.
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateOptions;
use crate::scan::{DEFAULT_DATA_SUBDIR, DEFAULT_EXTENSION, Layout, NameFilter};
use crate::tolerance::{Precision, Tolerances};

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "simparity.toml";

/// Errors that can occur when loading or validating a [`ParityConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid precision mode {0:?} (expected \"double\" or \"float\")")]
    InvalidPrecision(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid environment override {key}={value}: {reason}")]
    EnvOverride { key: String, value: String, reason: String },
}

/// Log output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Compact => write!(f, "compact"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `warn` or `simparity_core=debug`.
    /// Override: `SIMPARITY_LOG_LEVEL`
    pub level: String,
    /// Override: `SIMPARITY_LOG_FORMAT`
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::Pretty }
    }
}

/// Comparison settings shared by the checker and the reporting tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParityConfig {
    /// Selects the default tolerance pair.
    /// Override: `SIMPARITY_PRECISION`
    pub precision: Precision,

    /// Absolute tolerance override.
    /// Override: `SIMPARITY_ABS_TOL`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abs_tol: Option<f64>,

    /// Relative tolerance override.
    /// Override: `SIMPARITY_REL_TOL`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel_tol: Option<f64>,

    /// Step directory names to compare (empty = all).
    /// Override: `SIMPARITY_STEPS` (comma separated)
    pub steps: Vec<String>,

    /// Field basenames to compare (empty = all).
    /// Override: `SIMPARITY_FIELDS` (comma separated)
    pub fields: Vec<String>,

    /// Skip missing directories/files instead of failing the run.
    /// Override: `SIMPARITY_ALLOW_MISSING`
    pub allow_missing: bool,

    /// Suppress per-file progress output.
    /// Override: `SIMPARITY_QUIET`
    pub quiet: bool,

    /// Override: `SIMPARITY_DATA_SUBDIR`
    pub data_subdir: String,

    /// Override: `SIMPARITY_EXTENSION`
    pub extension: String,

    pub logging: LoggingConfig,
}

impl Default for ParityConfig {
    fn default() -> Self {
        Self {
            precision: Precision::Double,
            abs_tol: None,
            rel_tol: None,
            steps: Vec::new(),
            fields: Vec::new(),
            allow_missing: false,
            quiet: false,
            data_subdir: DEFAULT_DATA_SUBDIR.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ParityConfig {
    /// Default configuration as a TOML string.
    pub fn default_toml() -> Result<String, ConfigError> {
        Self::default().to_toml()
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields, then apply environment variable overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&contents)
    }

    /// Load from TOML string (useful for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut cfg: ParityConfig = toml::from_str(toml_str)?;
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load only from environment variables, starting from defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Resolve the configuration source: an explicit path must exist;
    /// otherwise `simparity.toml` in `dir` is used when present, else
    /// defaults plus environment.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() { Self::load(&candidate) } else { Self::from_env() }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tolerances().validate()?;
        if self.data_subdir.trim().is_empty() {
            return Err(ConfigError::Validation("data_subdir must not be empty".into()));
        }
        if self.extension.trim().is_empty() {
            return Err(ConfigError::Validation("extension must not be empty".into()));
        }
        if self.extension.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "extension must not start with '.', got {:?}",
                self.extension
            )));
        }
        Ok(())
    }

    /// Apply `SIMPARITY_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("SIMPARITY_PRECISION") {
            self.precision = val.parse::<Precision>().map_err(|e| ConfigError::EnvOverride {
                key: "SIMPARITY_PRECISION".into(),
                value: val.clone(),
                reason: e.to_string(),
            })?;
        }

        if let Ok(val) = std::env::var("SIMPARITY_ABS_TOL") {
            self.abs_tol = Some(parse_f64_override("SIMPARITY_ABS_TOL", &val)?);
        }

        if let Ok(val) = std::env::var("SIMPARITY_REL_TOL") {
            self.rel_tol = Some(parse_f64_override("SIMPARITY_REL_TOL", &val)?);
        }

        if let Ok(val) = std::env::var("SIMPARITY_STEPS") {
            self.steps = parse_list(&val);
        }

        if let Ok(val) = std::env::var("SIMPARITY_FIELDS") {
            self.fields = parse_list(&val);
        }

        if let Ok(val) = std::env::var("SIMPARITY_ALLOW_MISSING") {
            self.allow_missing = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("SIMPARITY_QUIET") {
            self.quiet = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("SIMPARITY_DATA_SUBDIR") {
            self.data_subdir = val;
        }

        if let Ok(val) = std::env::var("SIMPARITY_EXTENSION") {
            self.extension = val;
        }

        if let Ok(val) = std::env::var("SIMPARITY_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("SIMPARITY_LOG_FORMAT") {
            self.logging.format = val.parse::<LogFormat>().map_err(|reason| {
                ConfigError::EnvOverride {
                    key: "SIMPARITY_LOG_FORMAT".into(),
                    value: val.clone(),
                    reason,
                }
            })?;
        }

        Ok(())
    }

    /// Mode defaults with the configured overrides applied.
    pub fn tolerances(&self) -> Tolerances {
        Tolerances::resolve(self.precision, self.abs_tol, self.rel_tol)
    }

    pub fn layout(&self) -> Layout {
        Layout { data_subdir: self.data_subdir.clone(), extension: self.extension.clone() }
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            tolerances: self.tolerances(),
            steps: NameFilter::new(self.steps.iter().cloned()),
            fields: NameFilter::new(self.fields.iter().cloned()),
            allow_missing: self.allow_missing,
            layout: self.layout(),
        }
    }
}

/// Split a comma-separated list, trimming items and dropping empty ones.
pub fn parse_list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

fn parse_f64_override(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|e| ConfigError::EnvOverride {
        key: key.into(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}
