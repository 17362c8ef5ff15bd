use crate::error::ConfigError;
use crate::optimization::{Objective, OptimizeOptions, SceUa, SceUaConfig, Tolerance};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(#[from] ConfigError),

    #[error("max_seconds must be finite and non-negative, got {0}")]
    InvalidDuration(f64),
}

/// Run settings for one calibration, as read from a TOML file.
///
/// ```toml
/// bounds = [[0.0, 1.0], [10.0, 500.0]]
/// log_level = "debug"
///
/// [sceua]
/// n_complexes = 4
/// seed = 42
/// parallel = true
///
/// [run]
/// max_iterations = 200
/// tolerance = { mode = "relative", value = 1e-4 }
/// max_seconds = 600.0
/// ```
///
/// Any value can be overridden with an environment variable such as
/// `SCEUA_RUN__MAX_ITERATIONS=500` or `SCEUA_LOG_LEVEL=trace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bounds: Vec<(f64, f64)>,
    pub sceua: SceUaConfig,
    pub run: Run,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Run {
    pub max_iterations: usize,
    pub tolerance: Tolerance,
    pub verbose: bool,
    pub max_evaluations: Option<usize>,
    /// Wall-clock budget in seconds
    pub max_seconds: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bounds: Vec::new(),
            sceua: SceUaConfig::default(),
            run: Run::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for Run {
    fn default() -> Self {
        let options = OptimizeOptions::default();
        Self {
            max_iterations: options.max_iterations,
            tolerance: options.tolerance,
            verbose: options.verbose,
            max_evaluations: None,
            max_seconds: None,
        }
    }
}

impl Settings {
    /// Read settings from a TOML file, then apply `SCEUA_*` environment overrides.
    pub fn from_file(path: &str) -> Result<Self, SettingsError> {
        Self::load(File::with_name(path).format(FileFormat::Toml))
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, SettingsError> {
        Self::load(File::from_str(toml, FileFormat::Toml))
    }

    fn load<S>(source: S) -> Result<Self, SettingsError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let parsed = Config::builder()
            .add_source(source)
            .add_source(
                Environment::with_prefix("SCEUA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = parsed.try_deserialize()?;
        settings.run.options()?;
        Ok(settings)
    }

    /// Build an optimizer over the configured bounds.
    pub fn optimizer<O: Objective>(&self, objective: O) -> Result<SceUa<O>, ConfigError> {
        SceUa::with_config(objective, self.bounds.clone(), &self.sceua)
    }
}

impl Run {
    pub fn options(&self) -> Result<OptimizeOptions, SettingsError> {
        self.tolerance.validate()?;

        let max_duration = self
            .max_seconds
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|_| SettingsError::InvalidDuration(secs))
            })
            .transpose()?;

        Ok(OptimizeOptions {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            verbose: self.verbose,
            max_evaluations: self.max_evaluations,
            max_duration,
        })
    }
}
