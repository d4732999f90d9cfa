//! Site configuration management for `pagemill.toml`.
//!
//! # Sections
//!
//! | Section           | Purpose                                        |
//! |-------------------|------------------------------------------------|
//! | `[build]`         | Source roots, output root, cleanup switches    |
//! | `[context]`       | Date presentation for `commit_date`            |
//! | `[context.vars]`  | User-defined values exposed to every template  |
//!
//! The file is optional: without it the built-in defaults describe the
//! conventional layout. After loading, every path is resolved against the
//! project root, so the build never depends on the process working directory.
//!
//! # Example
//!
//! ```toml
//! [build]
//! pages = ["src/templates/pages"]
//! templates = ["src/templates/components"]
//! statics = ["src/css", "src/img"]
//! output = "dist"
//!
//! [context]
//! timezone = "utc"
//! ```

mod build;
mod context;
pub mod defaults;
mod error;

pub use build::{BuildConfig, CopyFile};
pub use context::{ContextConfig, Timezone};
pub use error::ConfigError;

use crate::cli::Cli;
use anyhow::{Result, bail};
use chrono::format::{Item, StrftimeItems};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    env, fs,
    path::{Component, Path, PathBuf},
};

/// Name reserved for the commit timestamp in the render context.
pub const COMMIT_DATE_KEY: &str = "commit_date";

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing pagemill.toml
///
/// Built once at startup and passed by reference to every build phase.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute project root (set after loading)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Render context settings
    #[serde(default)]
    pub context: ContextConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load, resolve and validate configuration for a CLI invocation.
    ///
    /// A missing config file is not an error; defaults are used instead.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = Self::normalize_path(cli.root.as_deref().unwrap_or(Path::new("./")));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };

        if let Some(output) = &cli.output {
            config.build.output = output.clone();
        }
        config.build.clean |= cli.clean;
        config.resolve_paths(&root);
        config.validate()?;

        Ok(config)
    }

    /// Resolve all paths relative to `root` and normalize them to absolute paths
    pub fn resolve_paths(&mut self, root: &Path) {
        let root = Self::normalize_path(root);
        let resolve = |paths: &mut Vec<PathBuf>| {
            for path in paths.iter_mut() {
                *path = Self::normalize_path(&root.join(&*path));
            }
        };

        resolve(&mut self.build.pages);
        resolve(&mut self.build.templates);
        resolve(&mut self.build.statics);
        for file in &mut self.build.files {
            file.source = Self::normalize_path(&root.join(&file.source));
        }
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.root = root;
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration before anything touches the output directory.
    ///
    /// Collisions that are visible from the configuration alone are rejected
    /// here; collisions between discovered files are caught during the build.
    pub fn validate(&self) -> Result<()> {
        if self.build.pages.is_empty() {
            bail!(ConfigError::Validation(
                "[build.pages] must have at least one element".into()
            ));
        }

        self.validate_output()?;

        let mut basenames = HashSet::new();
        for dir in &self.build.statics {
            let Some(name) = dir.file_name() else {
                bail!(ConfigError::Validation(format!(
                    "[build.statics] entry `{}` has no directory name",
                    dir.display()
                )));
            };
            if !basenames.insert(name.to_owned()) {
                bail!(ConfigError::Validation(format!(
                    "[build.statics] entries share the directory name `{}`",
                    name.to_string_lossy()
                )));
            }
        }

        let mut dests = HashSet::new();
        for file in &self.build.files {
            if !is_plain_relative(&file.dest) {
                bail!(ConfigError::Validation(format!(
                    "[build.files] dest `{}` must be a relative path inside the output directory",
                    file.dest.display()
                )));
            }
            if !dests.insert(&file.dest) {
                bail!(ConfigError::Validation(format!(
                    "[build.files] dest `{}` is used more than once",
                    file.dest.display()
                )));
            }
        }

        if self.context.date_format.is_empty()
            || StrftimeItems::new(&self.context.date_format).any(|item| matches!(item, Item::Error))
        {
            bail!(ConfigError::Validation(format!(
                "[context.date_format] `{}` is not a valid strftime format",
                self.context.date_format
            )));
        }

        if self.context.vars.contains_key(COMMIT_DATE_KEY) {
            bail!(ConfigError::Validation(format!(
                "[context.vars] cannot define the reserved name `{COMMIT_DATE_KEY}`"
            )));
        }

        Ok(())
    }

    /// Reconciliation deletes whatever the build did not produce, so the
    /// output directory must not hold the project root or any input.
    fn validate_output(&self) -> Result<()> {
        let output = &self.build.output;
        let overlaps = |path: &Path| path.starts_with(output);

        if overlaps(&self.root) {
            bail!(ConfigError::Validation(format!(
                "[build.output] `{}` must not contain the project root",
                output.display()
            )));
        }

        let dirs = self
            .build
            .pages
            .iter()
            .chain(&self.build.templates)
            .chain(&self.build.statics);
        for dir in dirs {
            if overlaps(dir) || output.starts_with(dir) {
                bail!(ConfigError::Validation(format!(
                    "[build.output] `{}` overlaps source directory `{}`",
                    output.display(),
                    dir.display()
                )));
            }
        }

        for file in &self.build.files {
            if overlaps(&file.source) {
                bail!(ConfigError::Validation(format!(
                    "[build.output] `{}` contains source file `{}`",
                    output.display(),
                    file.source.display()
                )));
            }
        }

        Ok(())
    }
}

/// A non-empty path made only of normal segments.
fn is_plain_relative(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

// ============================================================================
// Tests
// ============================================================================
