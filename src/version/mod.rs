//! Node software versions.
//!
//! This module turns the user's weighted version specification into the
//! version table nodes draw from, resolving the `local` and `latest`
//! aliases along the way.

pub mod resolver;
pub mod weights;

pub use resolver::{find_latest_release_tag, GitTagResolver, ResolveError, VersionResolver};
pub use weights::{
    default_node_versions, log_node_versions, parse_weighted_versions, resolve_node_versions,
    VersionSpecError, LATEST_ALIAS, LOCAL_ALIAS, LOCAL_VERSION,
};

/// Failure to build the node version table
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid weighted version specification")]
    Spec(#[from] VersionSpecError),

    #[error("Failed to resolve the latest release version")]
    Resolve(#[from] ResolveError),
}
