//! Output artifacts and source-to-destination path mapping.
//!
//! An artifact is a destination file confirmed or produced by the current
//! build. The union of artifacts from every producer is the known set: the
//! reconciler keeps exactly these files and deletes the rest.

use super::BuildError;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Re-root `source_file` from `source_root` under `dest_root`.
///
/// ```ignore
/// map_path("src/css", "src/css/fonts/a.woff2", "dist/css") // → dist/css/fonts/a.woff2
/// ```
pub fn map_path(source_root: &Path, source_file: &Path, dest_root: &Path) -> Result<PathBuf, BuildError> {
    let relative = source_file
        .strip_prefix(source_root)
        .map_err(|_| BuildError::OutsideRoot {
            path: source_file.to_path_buf(),
            root: source_root.to_path_buf(),
        })?;
    Ok(dest_root.join(relative))
}

/// Set of destination paths, each remembering the source that produced it.
///
/// Insertion rejects a destination that is already present: two sources
/// writing the same file is a configuration error, never an overwrite.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    entries: BTreeMap<PathBuf, PathBuf>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `dest` as produced from `source`.
    pub fn insert(&mut self, dest: PathBuf, source: PathBuf) -> Result<(), BuildError> {
        if let Some(first) = self.entries.get(&dest) {
            return Err(BuildError::DuplicateArtifact {
                path: dest,
                first: first.clone(),
                second: source,
            });
        }
        self.entries.insert(dest, source);
        Ok(())
    }

    /// Move every artifact of `other` into `self`, failing on the first collision.
    pub fn merge(&mut self, other: Self) -> Result<(), BuildError> {
        for (dest, source) in other.entries {
            self.insert(dest, source)?;
        }
        Ok(())
    }

    /// Fail if any destination of `other` is already in `self`.
    pub fn check_disjoint(&self, other: &Self) -> Result<(), BuildError> {
        for (dest, second) in &other.entries {
            if let Some(first) = self.entries.get(dest) {
                return Err(BuildError::DuplicateArtifact {
                    path: dest.clone(),
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn contains(&self, dest: &Path) -> bool {
        self.entries.contains_key(dest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
