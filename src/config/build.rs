//! `[build]` section configuration.
//!
//! Source roots, the output root and the cleanup switches.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in pagemill.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// pages = ["src/templates/pages"]           # Rendered page templates
/// templates = ["src/templates/components"]  # Extra template search paths
/// statics = ["src/css", "src/img"]          # Copied under output/<basename>/
/// output = "dist"
/// files = [{ source = "src/data/css/compiled.css", dest = "css/compiled.css" }]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Page template directories. Every file beneath them is rendered.
    #[serde(default = "defaults::build::pages")]
    #[educe(Default = defaults::build::pages())]
    pub pages: Vec<PathBuf>,

    /// Shared layout/component directories, searched after `pages`.
    #[serde(default = "defaults::build::templates")]
    #[educe(Default = defaults::build::templates())]
    pub templates: Vec<PathBuf>,

    /// Static asset directories, each mirrored under its own basename.
    #[serde(default = "defaults::build::statics")]
    #[educe(Default = defaults::build::statics())]
    pub statics: Vec<PathBuf>,

    /// Individual files copied to an explicit destination.
    #[serde(default)]
    pub files: Vec<CopyFile>,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Clear output directory before building.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Remove directories left empty after stale files are deleted.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub prune_empty_dirs: bool,
}

/// `[[build.files]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyFile {
    /// Source file (relative to project root)
    pub source: PathBuf,
    /// Destination (relative to output directory)
    pub dest: PathBuf,
}

impl BuildConfig {
    /// Template search path: page directories first, then shared templates.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.pages.iter().chain(&self.templates).cloned().collect()
    }
}
