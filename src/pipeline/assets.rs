//! Static asset synchronization.
//!
//! Assets are copied byte-for-byte. A copy is skipped only when the
//! destination exists and was modified strictly after its source; the
//! destination is still recorded as an artifact either way.
//!
//! ```text
//! src/css/style.css        → dist/css/style.css
//! src/img/icons/logo.png   → dist/img/icons/logo.png
//! ```

use super::{ArtifactSet, BuildError, collect_files, map_path};
use crate::{config::CopyFile, log};
use rayon::prelude::*;
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

/// Check if destination is up-to-date compared to source.
///
/// Up-to-date means the destination exists and its mtime is strictly newer
/// than the source's. Equal timestamps count as stale.
pub fn is_up_to_date(src: &Path, dst: &Path) -> bool {
    let Ok(src_time) = src.metadata().and_then(|m| m.modified()) else {
        return false;
    };
    let Ok(dst_time) = dst.metadata().and_then(|m| m.modified()) else {
        return false;
    };

    dst_time > src_time
}

/// Copy `src` to `dst` unless `dst` is up-to-date. Returns whether a copy happened.
fn copy_if_stale(src: &Path, dst: &Path) -> Result<bool, BuildError> {
    if is_up_to_date(src, dst) {
        return Ok(false);
    }
    fs::copy(src, dst).map_err(|err| BuildError::io(dst, err))?;
    log!("copy"; "{}", src.display());
    Ok(true)
}

/// Create every missing directory in `dirs`, logging each one created.
///
/// Returns the created directories, outermost first.
fn ensure_dirs<'a>(
    dirs: impl IntoIterator<Item = &'a Path>,
) -> Result<Vec<PathBuf>, BuildError> {
    let mut created = Vec::new();
    for dir in dirs {
        let mut missing: Vec<_> = dir
            .ancestors()
            .take_while(|d| !d.as_os_str().is_empty() && !d.is_dir())
            .collect();
        if missing.is_empty() {
            continue;
        }

        fs::create_dir_all(dir).map_err(|err| BuildError::io(dir, err))?;
        missing.reverse();
        for path in missing {
            log!("mkdir"; "{}", path.display());
            created.push(path.to_path_buf());
        }
    }
    Ok(created)
}

/// Mirror each of `source_dirs` under `dest_root/<basename>/`.
///
/// The full plan (artifact set and directories) is built before any file is
/// copied, so a destination collision aborts the phase with nothing copied.
/// That includes collisions with `known`, the artifacts of earlier phases.
/// The copies themselves run in parallel.
pub fn sync_static(
    source_dirs: &[PathBuf],
    dest_root: &Path,
    known: &ArtifactSet,
) -> Result<ArtifactSet, BuildError> {
    let mut artifacts = ArtifactSet::new();
    let mut plan = Vec::new();

    for dir in source_dirs {
        let name = dir
            .file_name()
            .ok_or_else(|| BuildError::SourceNotFound(dir.clone()))?;
        let export_dir = dest_root.join(name);

        for src in collect_files(dir)? {
            let dst = map_path(dir, &src, &export_dir)?;
            artifacts.insert(dst.clone(), src.clone())?;
            plan.push((src, dst));
        }
    }
    known.check_disjoint(&artifacts)?;

    let parents: BTreeSet<&Path> = plan.iter().filter_map(|(_, dst)| dst.parent()).collect();
    ensure_dirs(parents)?;

    plan.par_iter()
        .try_for_each(|(src, dst)| copy_if_stale(src, dst).map(|_| ()))?;

    Ok(artifacts)
}

/// Copy individually configured files to `dest_root/<dest>`.
///
/// Like [`sync_static`], nothing is copied until every destination is known
/// to be free.
pub fn copy_files(
    files: &[CopyFile],
    dest_root: &Path,
    known: &ArtifactSet,
) -> Result<ArtifactSet, BuildError> {
    let mut artifacts = ArtifactSet::new();
    let mut plan = Vec::new();

    for file in files {
        if !file.source.is_file() {
            return Err(BuildError::SourceNotFound(file.source.clone()));
        }
        let dst = dest_root.join(&file.dest);
        artifacts.insert(dst.clone(), file.source.clone())?;
        plan.push((file.source.as_path(), dst));
    }
    known.check_disjoint(&artifacts)?;

    for (src, dst) in &plan {
        ensure_dirs(dst.parent())?;
        copy_if_stale(src, dst)?;
    }

    Ok(artifacts)
}
