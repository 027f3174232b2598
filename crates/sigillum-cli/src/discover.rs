//! Locate project policy files on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::{debug, trace, warn};

/// Collect every regular file under `dir`, recursively, in sorted order.
///
/// Symlinks are followed; each directory is visited once. Entries that are
/// neither files nor directories, and links that cannot be resolved, are
/// skipped with a warning.
///
/// `exclude` (normally the organization policy) is skipped if it lives
/// inside `dir`.
pub(crate) fn project_files(dir: &Path, exclude: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(eyre!("{} is not a directory", dir.display()));
    }
    let excluded = exclude.canonicalize().unwrap_or_else(|_| exclude.to_path_buf());

    let mut files = Vec::new();
    collect(dir, &excluded, &mut HashSet::new(), &mut files)?;
    files.sort();
    debug!(count = files.len(), "discovered project policy files");
    Ok(files)
}

fn collect(
    dir: &Path,
    excluded: &Path,
    visited: &mut HashSet<PathBuf>,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    let canonical = dir
        .canonicalize()
        .wrap_err_with(|| format!("failed to resolve {}", dir.display()))?;
    if !visited.insert(canonical) {
        warn!(path = %dir.display(), "skipping already visited directory");
        return Ok(());
    }

    let entries =
        std::fs::read_dir(dir).wrap_err_with(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry.wrap_err_with(|| format!("failed to read {}", dir.display()))?;
        let path = entry.path();
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if metadata.is_dir() {
            collect(&path, excluded, visited, files)?;
        } else if metadata.is_file() {
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
            if canonical == excluded {
                trace!(path = %path.display(), "skipping organization policy");
                continue;
            }
            files.push(path);
        } else {
            warn!(path = %path.display(), "skipping entry that is not a regular file");
        }
    }
    Ok(())
}
