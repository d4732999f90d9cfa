//! Build phases.
//!
//! ```text
//! context ──► render ──► assets ──► reconcile
//!    │           │          │           ▲
//!    │           └──────────┴── known set
//!    └── commit_date + [context.vars]
//! ```
//!
//! Each producer returns an [`ArtifactSet`]; the orchestrator merges them and
//! hands the result to [`reconcile::reconcile`].

pub mod artifact;
pub mod assets;
pub mod context;
mod error;
pub mod reconcile;
pub mod render;

pub use artifact::{ArtifactSet, map_path};
pub use error::BuildError;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect every file beneath `dir`, sorted by path.
///
/// Symlinks are followed so linked files are treated like the file they
/// point to. A missing (or non-directory) `dir` is a `SourceNotFound` error.
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    if !dir.is_dir() {
        return Err(BuildError::SourceNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            BuildError::io(path, err.into())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
