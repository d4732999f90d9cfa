//! Version-control metadata for the render context.
//!
//! The build only needs one fact from git: when the content last changed.
//! [`MetadataProvider`] keeps that query behind a single method so the
//! pipeline can be exercised without a repository.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("{0}")]
    Query(String),

    #[error("repository has no commits")]
    Empty,
}

/// Source of the last-commit timestamp.
pub trait MetadataProvider {
    /// Unix epoch seconds of the most recent commit.
    fn last_commit_time(&self) -> Result<i64, MetadataError>;
}

impl<F> MetadataProvider for F
where
    F: Fn() -> Result<i64, MetadataError>,
{
    fn last_commit_time(&self) -> Result<i64, MetadataError> {
        self()
    }
}

/// Reads the committer time of `HEAD` from the repository containing `root`.
#[derive(Debug, Clone)]
pub struct GitMetadata {
    root: PathBuf,
}

impl GitMetadata {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl MetadataProvider for GitMetadata {
    fn last_commit_time(&self) -> Result<i64, MetadataError> {
        let repo = gix::discover(&self.root).map_err(|err| {
            MetadataError::Query(format!(
                "no git repository at `{}`: {err}",
                self.root.display()
            ))
        })?;

        let mut head = repo.head().map_err(query_error)?;
        if head.is_unborn() {
            return Err(MetadataError::Empty);
        }

        let commit = head.peel_to_commit_in_place().map_err(query_error)?;
        let time = commit.time().map_err(query_error)?;
        Ok(time.seconds)
    }
}

fn query_error(err: impl std::fmt::Display) -> MetadataError {
    MetadataError::Query(err.to_string())
}
