// Copyright 2026 QuAlg Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. qualg.yaml file
//! 3. Environment variables (QUALG_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::scalar::TOLERANCE;
use crate::validation::{validate_max_photons, validate_visibility};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Symbolic engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Linear-optics toolkit settings
    #[serde(default)]
    pub photonics: PhotonicsConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["qualg.yaml", "qualg.yml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply `QUALG_*` overrides from `lookup`; unparsable values are ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("QUALG_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = lookup("QUALG_LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Some(tol) = lookup("QUALG_TOLERANCE").and_then(|v| v.parse().ok()) {
            self.engine.tolerance = tol;
        }
        if let Some(max) = lookup("QUALG_MAX_EXPANDED_TERMS").and_then(|v| v.parse().ok()) {
            self.engine.max_expanded_terms = max;
        }
        if let Some(v) = lookup("QUALG_VISIBILITY").and_then(|v| v.parse().ok()) {
            self.photonics.visibility = v;
        }
        if let Some(n) = lookup("QUALG_MAX_PHOTONS").and_then(|v| v.parse().ok()) {
            self.photonics.max_photons = n;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.engine.tolerance.is_finite() || self.engine.tolerance <= 0.0 {
            return Err(Error::Config("tolerance must be a positive number".into()));
        }
        if self.engine.tolerance >= 1.0 {
            return Err(Error::Config("tolerance must be below 1".into()));
        }
        if self.engine.max_expanded_terms == 0 {
            return Err(Error::Config("max_expanded_terms cannot be 0".into()));
        }
        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(Error::Config(format!(
                "unknown log format '{}' (expected json or pretty)",
                self.logging.format
            )));
        }
        validate_visibility(self.photonics.visibility)?;
        validate_max_photons(self.photonics.max_photons)?;
        if self.engine.tolerance > 1e-6 {
            tracing::warn!(
                tolerance = self.engine.tolerance,
                "Loose tolerance: small non-zero probabilities count as impossible outcomes"
            );
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Symbolic engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Absolute tolerance for probabilities
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Maximum number of expanded terms in a probability expression
    #[serde(default = "default_max_expanded_terms")]
    pub max_expanded_terms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_expanded_terms: default_max_expanded_terms(),
        }
    }
}

fn default_tolerance() -> f64 {
    TOLERANCE
}

fn default_max_expanded_terms() -> u64 {
    100_000
}

/// Linear-optics toolkit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotonicsConfig {
    /// Overlap `⟨phi|psi⟩` of the two interfering photons
    #[serde(default = "default_visibility")]
    pub visibility: f64,

    /// Largest photon number in each beam splitter input
    #[serde(default = "default_max_photons")]
    pub max_photons: u32,
}

impl Default for PhotonicsConfig {
    fn default() -> Self {
        Self {
            visibility: default_visibility(),
            max_photons: default_max_photons(),
        }
    }
}

fn default_visibility() -> f64 {
    0.9
}

fn default_max_photons() -> u32 {
    1
}
