//! Optional TOML configuration.
//!
//! ```toml
//! tolerance = 1e-8
//!
//! [differentiation]
//! metric_step = 1e-5
//! connection_step = 1e-4
//! ```
//!
//! Every key is optional. The file comes from `--config`, else from
//! `CURV_CONFIG`, else built-in defaults are used.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use curv_core::{FLATNESS_TOLERANCE, FiniteDifference};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "CURV_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub differentiation: FiniteDifference,
    /// Threshold for "non-negligible" components and the flatness verdict.
    pub tolerance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            differentiation: FiniteDifference::default(),
            tolerance: FLATNESS_TOLERANCE,
        }
    }
}

impl Config {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let Some(path) = path else {
            tracing::debug!("no config file, using defaults");
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.differentiation.validate()?;
        ensure!(
            config.tolerance.is_finite() && config.tolerance > 0.0,
            "tolerance must be finite and positive, got {}",
            config.tolerance
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_differentiation_table() {
        let config = Config::parse("[differentiation]\nmetric_step = 1e-6\n").unwrap();
        assert_eq!(config.differentiation.metric_step, 1e-6);
        assert_eq!(
            config.differentiation.connection_step,
            FiniteDifference::default().connection_step
        );
        assert_eq!(config.tolerance, FLATNESS_TOLERANCE);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::parse("tolerance = -1.0").is_err());
        assert!(Config::parse("[differentiation]\nconnection_step = 0.0\n").is_err());
        assert!(Config::parse("tolerence = 1e-3").is_err());
    }
}
