//! Simulator Configuration - server, model, catalog and sweep settings
//!
//! Every section implements `Default` from [`super::defaults`], so an empty
//! or missing file yields a working configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::defaults;
use crate::simulator::PriceSweep;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `SimulatorConfig::load(None)` which searches:
/// 1. `$REVSIM_CONFIG` env var
/// 2. `./simulator.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Model backend selection
    #[serde(default)]
    pub model: ModelConfig,

    /// Course type → subcategory catalog
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Price sweep range
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Labels shown on the page and chart
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(p) => write!(f, "{}", p.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

impl SimulatorConfig {
    /// Load configuration.
    ///
    /// An explicit path (CLI flag) or `$REVSIM_CONFIG` must load cleanly;
    /// otherwise `./simulator.toml` is used if present, else defaults.
    /// Unlike a missing file, a broken file is always an error.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), "Loaded config from --config");
            return Ok((config, ConfigSource::File(path.to_path_buf())));
        }

        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            let config = Self::load_from_file(&p)?;
            info!(path = %p.display(), "Loaded config from {}", defaults::CONFIG_ENV_VAR);
            return Ok((config, ConfigSource::File(p)));
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!("Loaded config from ./{}", defaults::LOCAL_CONFIG_FILE);
            return Ok((config, ConfigSource::File(local)));
        }

        info!("No {} found — using built-in defaults", defaults::LOCAL_CONFIG_FILE);
        Ok((Self::default(), ConfigSource::Defaults))
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate a TOML document. Unknown keys are logged as
    /// warnings and otherwise ignored.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all settings, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.server.addr.trim().is_empty() {
            errors.push("server.addr must not be empty".to_string());
        }

        if let Err(e) = self.price_sweep() {
            errors.push(format!("sweep: {}", e.0));
        }

        if self.model.timeout_secs == 0 {
            errors.push("model.timeout_secs must be > 0".to_string());
        }
        match self.model.backend {
            ModelBackendKind::Artifact => {
                if self.model.artifact_path.as_os_str().is_empty() {
                    errors.push("model.artifact_path must be set for the artifact backend".to_string());
                }
            }
            ModelBackendKind::Remote => match self.model.remote_url.as_deref() {
                Some(url) if url.starts_with("http://") || url.starts_with("https://") => {}
                Some(url) => errors.push(format!(
                    "model.remote_url '{url}' must start with http:// or https://"
                )),
                None => errors.push("model.remote_url must be set for the remote backend".to_string()),
            },
        }

        if self.catalog.path.as_os_str().is_empty() {
            errors.push("catalog.path must not be empty".to_string());
        }
        if self.display.currency.trim().is_empty() {
            errors.push("display.currency must not be empty".to_string());
        }

        let (range_errors, range_warnings) = super::validation::validate_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// The configured sweep.
    pub fn price_sweep(&self) -> Result<PriceSweep, crate::simulator::InvalidSweep> {
        PriceSweep::new(self.sweep.min_price, self.sweep.max_price, self.sweep.num_points)
    }

    pub const fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_secs)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            Self::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            Self::Serialize(e) => write!(f, "Config serialization error: {e}"),
            Self::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8080"
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

/// Which model backend serves predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackendKind {
    /// JSON artifact evaluated in-process
    #[default]
    Artifact,
    /// HTTP model-serving endpoint
    Remote,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub backend: ModelBackendKind,

    /// Path to the JSON model artifact
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    /// Prediction endpoint for the remote backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,

    /// Upper bound on one batch inference call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from(defaults::MODEL_ARTIFACT_PATH)
}

const fn default_timeout_secs() -> u64 {
    defaults::MODEL_TIMEOUT_SECS
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackendKind::default(),
            artifact_path: default_artifact_path(),
            remote_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON file mapping course type → subcategories
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from(defaults::CATALOG_PATH)
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default = "default_min_price")]
    pub min_price: f64,
    #[serde(default = "default_max_price")]
    pub max_price: f64,
    #[serde(default = "default_num_points")]
    pub num_points: usize,
}

const fn default_min_price() -> f64 {
    defaults::SWEEP_MIN_PRICE
}

const fn default_max_price() -> f64 {
    defaults::SWEEP_MAX_PRICE
}

const fn default_num_points() -> usize {
    defaults::SWEEP_NUM_POINTS
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min_price: default_min_price(),
            max_price: default_max_price(),
            num_points: default_num_points(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Currency label used in the chart axes and summary
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_page_title")]
    pub page_title: String,
}

fn default_currency() -> String {
    defaults::CURRENCY.to_string()
}

fn default_page_title() -> String {
    defaults::PAGE_TITLE.to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            page_title: default_page_title(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SimulatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_defaults() {
        let config = SimulatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulatorConfig::default());
        let sweep = config.price_sweep().unwrap();
        assert_eq!(sweep.num_points(), 50);
        assert_eq!(sweep.min_price(), 10.0);
        assert_eq!(sweep.max_price(), 200.0);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = SimulatorConfig::from_toml_str(
            r#"
[sweep]
max_price = 300.0
"#,
        )
        .unwrap();
        assert_eq!(config.sweep.max_price, 300.0);
        assert_eq!(config.sweep.min_price, 10.0);
        assert_eq!(config.sweep.num_points, 50);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = SimulatorConfig::default();
        config.sweep.min_price = 500.0;
        config.model.timeout_secs = 0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2, "{errors:?}"),
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn test_remote_backend_requires_url() {
        let err = SimulatorConfig::from_toml_str(
            r#"
[model]
backend = "remote"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("remote_url"));

        let config = SimulatorConfig::from_toml_str(
            r#"
[model]
backend = "remote"
remote_url = "http://localhost:9000/predict"
timeout_secs = 3
"#,
        )
        .unwrap();
        assert_eq!(config.model.backend, ModelBackendKind::Remote);
        assert_eq!(config.model_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_parse_error_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[sweep\nmin_price = ").unwrap();
        let err = SimulatorConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref p, _) if p == file.path()));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = SimulatorConfig::load(Some(Path::new("/nonexistent/simulator.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_round_trip_toml() {
        let config = SimulatorConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(SimulatorConfig::from_toml_str(&text).unwrap(), config);
    }
}
