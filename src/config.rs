//! Run configuration.
//!
//! A run is configured from three layers: built-in defaults, an optional
//! YAML file and command-line flags. Every field of [`RunConfig`] is
//! optional so the layers can be stacked with [`RunConfig::overridden_by`];
//! the accessors fill in defaults for whatever is still unset.
//!
//! ```yaml
//! seed: 4827085738
//! groups: 4
//! multi_version: "v0.34.21:1,latest:1,local:2"
//! base_version: "0.34.24"
//! format: yaml
//! combinations:
//!   topology: [single, quad]
//!   initialHeight: [0, 1000]
//!   initialState:
//!     - {}
//!     - { initial01: a }
//!   validators: [genesis, initchain]
//! ```

use crate::combinations::OptionMatrix;
use crate::generator::{default_testnet_matrix, GenerateRequest, DEFAULT_SEED};
use crate::version::{parse_weighted_versions, VersionSpecError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Base version used to pick the release behind `latest` when none is given.
pub const DEFAULT_BASE_VERSION: &str = "0.34.24";

/// File format of the written manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    #[default]
    Yaml,
    Json,
}

impl ManifestFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ManifestFormat::Yaml => "yaml",
            ManifestFormat::Json => "json",
        }
    }
}

/// Configuration of one generator run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// RNG seed (default: 4827085738)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Number of manifest groups, 0 for no grouping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<usize>,
    /// Weighted node versions, e.g. "v0.34.21:1,latest:1,local:2"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_version: Option<String>,
    /// Base semantic version for resolving `latest`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version: Option<String>,
    /// Manifest file format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ManifestFormat>,
    /// Replacement for the default option matrix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinations: Option<OptionMatrix>,
}

impl RunConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(matrix) = &self.combinations {
            if matrix.is_empty() {
                return Err(ValidationError::InvalidCombinations(
                    "combinations cannot be an empty map".to_string(),
                ));
            }
            for (axis, values) in matrix {
                if axis.trim().is_empty() {
                    return Err(ValidationError::InvalidCombinations(
                        "axis names cannot be empty".to_string(),
                    ));
                }
                if values.is_empty() {
                    return Err(ValidationError::InvalidCombinations(format!(
                        "axis {:?} has no values",
                        axis
                    )));
                }
            }
        }

        if let Some(spec) = self.multi_version.as_deref().filter(|s| !s.trim().is_empty()) {
            parse_weighted_versions(spec)?;
        }

        if let Some(base) = &self.base_version {
            if base.trim().is_empty() {
                return Err(ValidationError::InvalidBaseVersion(
                    "base_version cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Stack `overrides` on top of `self`; every field set in `overrides` wins.
    pub fn overridden_by(self, overrides: RunConfig) -> RunConfig {
        RunConfig {
            seed: overrides.seed.or(self.seed),
            groups: overrides.groups.or(self.groups),
            multi_version: overrides.multi_version.or(self.multi_version),
            base_version: overrides.base_version.or(self.base_version),
            format: overrides.format.or(self.format),
            combinations: overrides.combinations.or(self.combinations),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn groups(&self) -> usize {
        self.groups.unwrap_or(0)
    }

    pub fn base_version(&self) -> &str {
        self.base_version.as_deref().unwrap_or(DEFAULT_BASE_VERSION)
    }

    pub fn format(&self) -> ManifestFormat {
        self.format.unwrap_or_default()
    }

    /// Build the generation request for manifests destined for `repo_dir`.
    pub fn generate_request(&self, repo_dir: impl Into<PathBuf>) -> GenerateRequest {
        GenerateRequest::new(self.seed(), repo_dir)
            .with_multi_version(self.multi_version.clone())
            .with_matrix(self.combinations.clone().unwrap_or_else(default_testnet_matrix))
    }
}

/// Run configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid combinations: {0}")]
    InvalidCombinations(String),
    #[error("Invalid multi_version: {0}")]
    InvalidMultiVersion(#[from] VersionSpecError),
    #[error("Invalid base_version: {0}")]
    InvalidBaseVersion(String),
}
