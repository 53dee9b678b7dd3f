//! Top-level Quell configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ScanConfig, ScoringConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`QUELL_*`)
/// 3. Project config (`quell.toml` in the working directory)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuellConfig {
    pub scan: ScanConfig,
    pub scoring: ScoringConfig,
    /// Where the pair-decision history is persisted between runs.
    pub history_path: PathBuf,
}

impl Default for QuellConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            scoring: ScoringConfig::default(),
            history_path: PathBuf::from("quell-history.json"),
        }
    }
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub confidence_threshold: Option<i32>,
    pub similarity_threshold: Option<f64>,
    pub days_back: Option<u32>,
    pub history_path: Option<PathBuf>,
}

impl QuellConfig {
    /// Load configuration with layered resolution.
    ///
    /// Invalid threshold values are rejected here, at startup, before any
    /// fetch happens.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 3: project config
        let project_config_path = root.join("quell.toml");
        if project_config_path.exists() {
            let text = std::fs::read_to_string(&project_config_path).map_err(|e| {
                ConfigError::ReadError {
                    path: project_config_path.display().to_string(),
                    message: e.to_string(),
                }
            })?;
            config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
                path: project_config_path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config)?;

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &QuellConfig) -> Result<(), ConfigError> {
        let threshold = config.scoring.confidence_threshold;
        if !(1..=115).contains(&threshold) {
            return Err(ConfigError::ValidationFailed {
                field: "scoring.confidence_threshold".to_string(),
                message: "must be between 1 and 115".to_string(),
            });
        }
        let similarity = config.scoring.similarity_threshold;
        if !(0.0..=1.0).contains(&similarity) {
            return Err(ConfigError::ValidationFailed {
                field: "scoring.similarity_threshold".to_string(),
                message: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if config.scan.days_back == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "scan.days_back".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if config.scan.max_results == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "scan.max_results".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn apply_env_overrides(config: &mut QuellConfig) -> Result<(), ConfigError> {
        if let Some(v) = env_parse::<i32>("QUELL_CONFIDENCE_THRESHOLD")? {
            config.scoring.confidence_threshold = v;
        }
        if let Some(v) = env_parse::<f64>("QUELL_SIMILARITY_THRESHOLD")? {
            config.scoring.similarity_threshold = v;
        }
        if let Some(v) = env_parse::<u32>("QUELL_DAYS_BACK")? {
            config.scan.days_back = v;
        }
        if let Ok(v) = std::env::var("QUELL_HISTORY_PATH") {
            if !v.is_empty() {
                config.history_path = PathBuf::from(v);
            }
        }
        Ok(())
    }

    fn apply_cli_overrides(config: &mut QuellConfig, cli: &CliOverrides) {
        if let Some(v) = cli.confidence_threshold {
            config.scoring.confidence_threshold = v;
        }
        if let Some(v) = cli.similarity_threshold {
            config.scoring.similarity_threshold = v;
        }
        if let Some(v) = cli.days_back {
            config.scan.days_back = v;
        }
        if let Some(ref v) = cli.history_path {
            config.history_path = v.clone();
        }
    }
}

/// Read and parse one environment override. A variable that is set but
/// unparseable is rejected rather than silently falling through to a lower
/// layer.
fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => match v.parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ConfigError::ValidationFailed {
                field: name.to_string(),
                message: format!("cannot parse {v:?}"),
            }),
        },
        _ => Ok(None),
    }
}
