//! # Testnet Generator
//!
//! Turns an option matrix and a seed into one manifest per option
//! combination.
//!
//! ## Flow
//!
//! 1. Resolve the node version table from the weighted version
//!    specification (`version` module)
//! 2. Expand the option matrix into combinations (`combinations` module)
//! 3. For each combination, in enumeration order, build a manifest with
//!    [`generate_testnet`], which calls [`generate_node`] per node
//!
//! All randomness comes from a single seeded ChaCha8 stream that is borrowed
//! through every call, so a given seed and option matrix always produce the
//! same manifests. Combinations share that stream and must be generated one
//! after another in order.
//!
//! ## Failure
//!
//! There is no partial output: a bad option value, a malformed version
//! specification or a failed release lookup aborts the whole batch.

pub mod node;
pub mod options;
pub mod tables;
pub mod topology;

pub use node::{generate_light_node, generate_node, reconcile_storage, ARCHIVE_SNAPSHOT_INTERVAL};
pub use options::{default_testnet_matrix, TestnetOptions, Topology, ValidatorsOption};
pub use tables::{AbciDelay, ChoiceTables};
pub use topology::{generate_testnet, quorum, NetworkShape};

use crate::combinations::{combinations, OptionMatrix, OptionValue};
use crate::manifest::Manifest;
use crate::version::{log_node_versions, resolve_node_versions, VersionError, VersionResolver};
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 4_827_085_738;

/// Errors that abort a generation batch
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Unknown topology {0:?}")]
    UnknownTopology(String),

    #[error("Invalid validators option {0:?}")]
    InvalidValidators(String),

    #[error("Missing option {axis:?} in testnet combination")]
    MissingOption { axis: &'static str },

    #[error("Option {axis:?} must be a {expected}, got {} {value}", .value.kind())]
    InvalidOptionType {
        axis: &'static str,
        expected: &'static str,
        value: OptionValue,
    },

    #[error("Choice table {0:?} has nothing to choose from")]
    EmptyChoiceTable(&'static str),

    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Everything needed to generate a batch of testnets.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Seed of the RNG stream shared by all testnets in the batch
    pub seed: u64,
    /// Directory inside the git repository used to resolve `latest`
    pub repo_dir: PathBuf,
    /// Weighted version specification, e.g. `v0.34.21:1,local:2`
    pub multi_version: Option<String>,
    /// Option axes expanded into one testnet per combination
    pub matrix: OptionMatrix,
}

impl GenerateRequest {
    pub fn new(seed: u64, repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            seed,
            repo_dir: repo_dir.into(),
            multi_version: None,
            matrix: default_testnet_matrix(),
        }
    }

    pub fn with_multi_version(mut self, multi_version: Option<String>) -> Self {
        self.multi_version = multi_version;
        self
    }

    pub fn with_matrix(mut self, matrix: OptionMatrix) -> Self {
        self.matrix = matrix;
        self
    }
}

/// Generate every testnet described by `request`.
///
/// The version specification is resolved before any testnet is built, so a
/// malformed specification fails without consuming randomness.
pub fn generate<V: VersionResolver + ?Sized>(
    request: &GenerateRequest,
    resolver: &V,
) -> Result<Vec<Manifest>, GenerateError> {
    let node_versions =
        resolve_node_versions(request.multi_version.as_deref(), &request.repo_dir, resolver)?;
    log_node_versions(&node_versions);

    let tables = ChoiceTables::default().with_node_versions(node_versions);
    let mut rng = ChaCha8Rng::seed_from_u64(request.seed);
    generate_with_rng(&mut rng, &tables, &request.matrix)
}

/// Generate one testnet per combination of `matrix`, drawing from `rng`.
pub fn generate_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    tables: &ChoiceTables,
    matrix: &OptionMatrix,
) -> Result<Vec<Manifest>, GenerateError> {
    tables.validate()?;

    let combos = combinations(matrix);
    info!("Generating {} testnets", combos.len());

    let mut manifests = Vec::with_capacity(combos.len());
    for (index, combination) in combos.iter().enumerate() {
        let options = TestnetOptions::from_combination(combination)?;
        let manifest = generate_testnet(rng, tables, &options);
        debug!(
            "Testnet {}: {} nodes, topology {}, validators {:?}",
            index,
            manifest.nodes.len(),
            options.topology,
            options.validators
        );
        manifests.push(manifest);
    }
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ResolveError;
    use std::path::Path;

    fn no_lookup(_: &Path) -> Result<String, ResolveError> {
        panic!("release lookup not expected")
    }

    #[test]
    fn test_generate_default_batch() {
        let request = GenerateRequest::new(DEFAULT_SEED, ".");
        let manifests = generate(&request, &no_lookup).unwrap();
        assert_eq!(manifests.len(), 24);
        assert!(manifests.iter().all(|m| m.nodes.values().all(|n| n.version.is_empty())));
    }

    #[test]
    fn test_generate_is_reproducible() {
        let request = GenerateRequest::new(17, ".");
        let first = generate(&request, &no_lookup).unwrap();
        let second = generate(&request, &no_lookup).unwrap();
        assert_eq!(first, second);

        let other = generate(&GenerateRequest::new(18, "."), &no_lookup).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_generate_uses_resolved_versions() {
        let request = GenerateRequest::new(3, ".").with_multi_version(Some("latest:1".into()));
        let resolver = |_: &Path| -> Result<String, ResolveError> { Ok("v0.34.22".into()) };
        let manifests = generate(&request, &resolver).unwrap();
        assert!(manifests
            .iter()
            .flat_map(|m| m.nodes.values())
            .all(|n| n.version == "v0.34.22"));
    }

    #[test]
    fn test_bad_version_spec_aborts() {
        let request = GenerateRequest::new(3, ".").with_multi_version(Some("v1:0".into()));
        let err = generate(&request, &no_lookup).unwrap_err();
        assert!(matches!(err, GenerateError::Version(VersionError::Spec(_))));
    }

    #[test]
    fn test_bad_option_aborts_batch() {
        let mut matrix = default_testnet_matrix();
        matrix.insert(
            options::TOPOLOGY_AXIS.to_string(),
            vec!["single".into(), "mesh".into()],
        );
        let request = GenerateRequest::new(3, ".").with_matrix(matrix);
        let err = generate(&request, &no_lookup).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownTopology(ref t) if t == "mesh"));
    }
}
