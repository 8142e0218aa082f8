//! Release version lookup for the `latest` alias.
//!
//! The lookup itself sits behind [`VersionResolver`] so generation can be
//! driven without a repository. [`GitTagResolver`] is the real
//! implementation: it lists the tags of the enclosing git repository and
//! picks the newest release compatible with a base version.

use git2::Repository;
use log::debug;
use semver::{Version, VersionReq};
use std::path::{Path, PathBuf};

/// Errors raised while resolving the latest release version
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Failed to open git repository from {path}")]
    Repository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to list repository tags")]
    Tags(#[source] git2::Error),

    #[error("Failed to parse base version {version:?}")]
    BaseVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Failed to parse tag {tag:?} as semantic version")]
    Tag {
        tag: String,
        #[source]
        source: semver::Error,
    },
}

/// Finds the most recent released version usable in generated testnets.
pub trait VersionResolver {
    /// Return the latest release tag found from `repo_dir`, or an empty
    /// string when there is none and the local build should be used.
    fn latest_release_version(&self, repo_dir: &Path) -> Result<String, ResolveError>;
}

impl<F> VersionResolver for F
where
    F: Fn(&Path) -> Result<String, ResolveError>,
{
    fn latest_release_version(&self, repo_dir: &Path) -> Result<String, ResolveError> {
        self(repo_dir)
    }
}

/// Resolves releases from the tags of a git repository.
#[derive(Debug, Clone)]
pub struct GitTagResolver {
    base_version: String,
}

impl GitTagResolver {
    /// `base_version` is the version of the software under test; only
    /// releases in its caret `major.minor` range are considered.
    pub fn new(base_version: impl Into<String>) -> Self {
        Self {
            base_version: base_version.into(),
        }
    }
}

impl VersionResolver for GitTagResolver {
    fn latest_release_version(&self, repo_dir: &Path) -> Result<String, ResolveError> {
        let repo = Repository::discover(repo_dir).map_err(|source| ResolveError::Repository {
            path: repo_dir.to_path_buf(),
            source,
        })?;
        let names = repo.tag_names(None).map_err(ResolveError::Tags)?;
        let tags: Vec<&str> = names.iter().flatten().collect();
        debug!("Found {} tags in repository at {:?}", tags.len(), repo.path());

        find_latest_release_tag(&self.base_version, &tags)
    }
}

/// Pick the newest release among `tags` compatible with `base_version`.
///
/// Rules:
/// - tags without a leading `v` are ignored
/// - prereleases are skipped
/// - a release must satisfy `^major.minor` of the base version
/// - any prerelease suffix on the base version is dropped before parsing
/// - missing minor or patch components count as `0` (`v0.34` is `0.34.0`)
///
/// The result carries a leading `v`, or is empty when nothing matched.
pub fn find_latest_release_tag<S: AsRef<str>>(
    base_version: &str,
    tags: &[S],
) -> Result<String, ResolveError> {
    let base = base_version.split('-').next().unwrap_or(base_version);
    let base = base.strip_prefix('v').unwrap_or(base);
    let base = parse_lenient(base).map_err(|source| ResolveError::BaseVersion {
        version: base_version.to_string(),
        source,
    })?;
    let requirement = VersionReq::parse(&format!("^{}.{}", base.major, base.minor)).map_err(
        |source| ResolveError::BaseVersion {
            version: base_version.to_string(),
            source,
        },
    )?;

    let mut latest: Option<Version> = None;
    for tag in tags {
        let tag = tag.as_ref();
        let Some(stripped) = tag.strip_prefix('v') else {
            continue;
        };
        let version = parse_lenient(stripped).map_err(|source| ResolveError::Tag {
            tag: tag.to_string(),
            source,
        })?;
        if !version.pre.is_empty() || !requirement.matches(&version) {
            continue;
        }
        if latest.as_ref().map_or(true, |current| version > *current) {
            latest = Some(version);
        }
    }

    Ok(latest.map(|v| format!("v{}", v)).unwrap_or_default())
}

/// Parse a version, padding a missing minor or patch component with `.0`.
fn parse_lenient(version: &str) -> Result<Version, semver::Error> {
    let core_end = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(core_end);
    let padding = match core.matches('.').count() {
        0 => ".0.0",
        1 => ".0",
        _ => "",
    };
    Version::parse(&format!("{}{}{}", core, padding, suffix))
}
