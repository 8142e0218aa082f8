//! Writing generated manifests to disk.
//!
//! Without grouping each manifest becomes `gen-NNNN.<ext>`. With `g` groups
//! the batch is cut into consecutive runs of `ceil(len / g)` manifests and
//! each file is named `gen-groupGG-NNNN.<ext>`, where `NNNN` is still the
//! manifest's index in the whole batch.

use crate::config::ManifestFormat;
use crate::manifest::Manifest;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Serialize one manifest in `format`.
pub fn render_manifest(manifest: &Manifest, format: ManifestFormat) -> Result<String> {
    let rendered = match format {
        ManifestFormat::Yaml => serde_yaml::to_string(manifest)?,
        ManifestFormat::Json => serde_json::to_string_pretty(manifest)?,
    };
    Ok(rendered)
}

/// File name for the manifest at `index`; `group` is `None` when not grouping.
pub fn manifest_file_name(index: usize, group: Option<usize>, format: ManifestFormat) -> String {
    match group {
        Some(group) => format!("gen-group{:02}-{:04}.{}", group, index, format.extension()),
        None => format!("gen-{:04}.{}", index, format.extension()),
    }
}

/// Group of the manifest at `index` in a batch of `len` split into `groups`.
fn group_of(index: usize, len: usize, groups: usize) -> Option<usize> {
    if groups == 0 {
        return None;
    }
    let group_size = len.div_ceil(groups).max(1);
    Some(index / group_size)
}

/// Write every manifest into `dir`, creating it if needed.
///
/// Returns the written paths in batch order.
pub fn write_manifests(
    dir: &Path,
    manifests: &[Manifest],
    groups: usize,
    format: ManifestFormat,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", dir.display()))?;

    let mut written = Vec::with_capacity(manifests.len());
    for (index, manifest) in manifests.iter().enumerate() {
        let group = group_of(index, manifests.len(), groups);
        let path = dir.join(manifest_file_name(index, group, format));

        let content = render_manifest(manifest, format)
            .wrap_err_with(|| format!("Failed to serialize manifest {}", index))?;
        fs::write(&path, content)
            .wrap_err_with(|| format!("Failed to write manifest '{}'", path.display()))?;

        debug!("Wrote {:?}", path);
        written.push(path);
    }

    info!("Wrote {} manifests to {:?}", written.len(), dir);
    Ok(written)
}
