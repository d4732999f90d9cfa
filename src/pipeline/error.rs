//! Build error taxonomy.
//!
//! Every variant is fatal: the build stops at the first one and leaves the
//! output directory in whatever state the writes so far produced.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("destination `{0}` exists and is not a directory")]
    DestinationIsFile(PathBuf),

    #[error("`{path}` is produced by both `{first}` and `{second}`")]
    DuplicateArtifact {
        path: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("`{path}` is not inside `{root}`")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("source `{0}` not found")]
    SourceNotFound(PathBuf),

    #[error("template `{name}` not found in search paths")]
    TemplateNotFound {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("undefined variable while rendering `{name}`")]
    UndefinedVariable {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to render `{name}`")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to query last commit date: {0}")]
    MetadataQuery(String),

    #[error("IO error on `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Errors caused by the build configuration rather than by source content.
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DestinationIsFile(_) | Self::DuplicateArtifact { .. } | Self::OutsideRoot { .. }
        )
    }

    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify a template engine failure.
    pub fn from_template(name: &str, source: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        let name = name.to_owned();
        match source.kind() {
            ErrorKind::TemplateNotFound => Self::TemplateNotFound { name, source },
            ErrorKind::UndefinedError => Self::UndefinedVariable { name, source },
            _ => Self::Render { name, source },
        }
    }
}
