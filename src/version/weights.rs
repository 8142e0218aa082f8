//! Weighted node version specifications.
//!
//! A specification such as `v0.34.21:1, local:2, latest:1` says which
//! software versions generated nodes run and how often each is picked.

use crate::choice::WeightedChoice;
use crate::version::resolver::VersionResolver;
use crate::version::VersionError;
use log::{info, warn};
use std::num::ParseIntError;
use std::path::Path;

/// Version key meaning "the locally built binary".
pub const LOCAL_VERSION: &str = "";

/// Alias for [`LOCAL_VERSION`] accepted in specifications.
pub const LOCAL_ALIAS: &str = "local";

/// Alias resolved to the most recent compatible release.
pub const LATEST_ALIAS: &str = "latest";

/// Weight of the local build when no specification is given.
const DEFAULT_LOCAL_WEIGHT: u32 = 2;

/// Errors in a weighted version specification string
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VersionSpecError {
    #[error("Unexpected version:weight combination: {entry:?}")]
    MalformedEntry { entry: String },

    #[error("Unexpected weight {weight:?} for version {version:?}")]
    InvalidWeight {
        version: String,
        weight: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Version weights must be >= 1, got {weight} for version {version:?}")]
    WeightTooSmall { version: String, weight: i64 },

    #[error("Version weight {weight} for version {version:?} is too large")]
    WeightTooLarge { version: String, weight: i64 },
}

/// Version table used when no specification is given: local build only.
pub fn default_node_versions() -> WeightedChoice<String> {
    [(LOCAL_VERSION.to_string(), DEFAULT_LOCAL_WEIGHT)].into_iter().collect()
}

/// Parse `version:weight[,version:weight]*` into a weighted table.
///
/// Whitespace around entries and tokens is ignored. Aliases are kept
/// verbatim; [`resolve_node_versions`] rewrites them.
///
/// # Examples
/// ```
/// use testnetgen::version::parse_weighted_versions;
///
/// let versions = parse_weighted_versions("v0.34.21:1, v0.34.22:2").unwrap();
/// assert_eq!(versions.get(&"v0.34.22".to_string()), Some(2));
/// assert!(parse_weighted_versions("v0.34.21").is_err());
/// assert!(parse_weighted_versions("v0.34.21:0").is_err());
/// ```
pub fn parse_weighted_versions(spec: &str) -> Result<WeightedChoice<String>, VersionSpecError> {
    let mut versions = WeightedChoice::new();
    for entry in spec.trim().split(',') {
        let parts: Vec<&str> = entry.trim().split(':').collect();
        let [version, weight] = parts.as_slice() else {
            return Err(VersionSpecError::MalformedEntry {
                entry: entry.to_string(),
            });
        };
        let version = version.trim().to_string();
        let weight = weight.trim();

        let parsed: i64 = weight.parse().map_err(|source| VersionSpecError::InvalidWeight {
            version: version.clone(),
            weight: weight.to_string(),
            source,
        })?;
        if parsed < 1 {
            return Err(VersionSpecError::WeightTooSmall { version, weight: parsed });
        }
        let weight = u32::try_from(parsed)
            .map_err(|_| VersionSpecError::WeightTooLarge {
                version: version.clone(),
                weight: parsed,
            })?;

        versions.insert(version, weight);
    }
    Ok(versions)
}

/// Build the node version table for a run.
///
/// Without a specification (or with a blank one) the local build is used.
/// Otherwise the specification is parsed, `local` becomes the empty version
/// key, and `latest` is looked up through `resolver` from `repo_dir`. When
/// two keys collapse onto the same version their weights are added.
pub fn resolve_node_versions<V: VersionResolver + ?Sized>(
    spec: Option<&str>,
    repo_dir: &Path,
    resolver: &V,
) -> Result<WeightedChoice<String>, VersionError> {
    let Some(spec) = spec.filter(|s| !s.trim().is_empty()) else {
        return Ok(default_node_versions());
    };

    let mut versions = parse_weighted_versions(spec)?;

    if let Some(weight) = versions.remove(&LOCAL_ALIAS.to_string()) {
        merge_weight(&mut versions, LOCAL_VERSION.to_string(), weight);
    }

    if let Some(weight) = versions.remove(&LATEST_ALIAS.to_string()) {
        let latest = resolver.latest_release_version(repo_dir)?;
        if latest.is_empty() {
            warn!("No compatible release found for \"latest\", using the local build instead");
        } else {
            info!("Resolved \"latest\" to {}", latest);
        }
        merge_weight(&mut versions, latest, weight);
    }

    Ok(versions)
}

/// Add `weight` to whatever `version` already has. An alias that collapses
/// onto an explicit entry (`v0.34.22:1,latest:1` with latest = v0.34.22)
/// sums the weights rather than replacing the explicit one.
fn merge_weight(versions: &mut WeightedChoice<String>, version: String, weight: u32) {
    let merged = versions.get(&version).unwrap_or(0).saturating_add(weight);
    versions.insert(version, merged);
}

/// Log the version table the way operators read it, with `local` for the
/// local build.
pub fn log_node_versions(versions: &WeightedChoice<String>) {
    info!("Generating testnets with weighted versions:");
    for (version, weight) in versions.iter() {
        if version.is_empty() {
            info!("- {}: {}", LOCAL_ALIAS, weight);
        } else {
            info!("- {}: {}", version, weight);
        }
    }
}
