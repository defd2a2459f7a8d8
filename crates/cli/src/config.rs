//! Configuration management for the CLI

use anyhow::{Context, Result};
use ktop_lib::{SamplerConfig, TolerationMatch, UnmatchedPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Toleration marking a pod as spot tolerant
    pub spot_toleration: Option<TolerationMatch>,
    /// What to do with usage of containers missing from the pod spec
    pub unmatched_containers: Option<UnmatchedPolicy>,
    /// Force row shading off (`false`) even on a terminal
    pub color: Option<bool>,
}

impl Config {
    /// Load configuration from the default location, if present
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Sampler settings; `report_unmatched` from the command line wins
    pub fn sampler_config(&self, report_unmatched: bool) -> SamplerConfig {
        let unmatched = if report_unmatched {
            UnmatchedPolicy::Report
        } else {
            self.unmatched_containers.unwrap_or_default()
        };

        SamplerConfig {
            spot_toleration: self.spot_toleration.clone().unwrap_or_default(),
            unmatched,
        }
    }

    /// Get the configuration file path
    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("ktop").join("config.json"))
    }
}
