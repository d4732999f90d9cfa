//! Site building orchestration.
//!
//! ```text
//! build_site()
//!     │
//!     ├── ensure_output_dir()     (clean, reject a file at the output path)
//!     ├── build_context()         commit_date + [context.vars]
//!     ├── render_pages()          ──┐
//!     ├── sync_static()           ──┼── known set
//!     ├── copy_files()            ──┘
//!     └── reconcile()             delete everything outside the known set
//! ```
//!
//! Phases run strictly in order and the first error aborts the build.
//! Reconciliation only runs once every producer has succeeded, so a failed
//! build never deletes anything.

use crate::{
    config::SiteConfig,
    log,
    pipeline::{
        BuildError,
        assets::{copy_files, sync_static},
        context::build_context,
        reconcile::reconcile,
        render::render_pages,
    },
    utils::{
        git::MetadataProvider,
        timer::{format_elapsed, timed},
    },
};
use colored::Colorize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Summary of one successful build.
#[derive(Debug)]
pub struct BuildReport {
    /// Pages rendered from templates
    pub rendered: usize,
    /// Static assets and single files in the output, copied or already fresh
    pub assets: usize,
    /// Stale output files removed by reconciliation
    pub deleted: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Build the entire site into `config.build.output`.
pub fn build_site(
    config: &SiteConfig,
    provider: &dyn MetadataProvider,
) -> Result<BuildReport, BuildError> {
    let (result, elapsed) = timed(|| run_phases(config, provider));
    let (rendered, assets, deleted) = result?;

    Ok(BuildReport {
        rendered,
        assets,
        deleted,
        elapsed,
    })
}

impl BuildReport {
    /// Log the one-line build summary.
    pub fn log(&self) {
        log!(
            "build";
            "{} rendered, {} assets, {} deleted, done in {}",
            self.rendered,
            self.assets,
            self.deleted.len(),
            format_elapsed(self.elapsed).red()
        );
    }
}

fn run_phases(
    config: &SiteConfig,
    provider: &dyn MetadataProvider,
) -> Result<(usize, usize, Vec<PathBuf>), BuildError> {
    let build = &config.build;
    let output = &build.output;

    ensure_output_dir(output, build.clean)?;

    let context = build_context(config, provider)?;
    let mut known = render_pages(&build.pages, &build.search_paths(), &context, output)?;
    let rendered = known.len();
    if known.is_empty() {
        log!("warn"; "no pages rendered, check [build.pages]");
    }

    let statics = sync_static(&build.statics, output, &known)?;
    known.merge(statics)?;
    let files = copy_files(&build.files, output, &known)?;
    known.merge(files)?;

    let deleted = reconcile(output, &known, build.prune_empty_dirs)?;
    Ok((rendered, known.len() - rendered, deleted))
}

/// Make sure `output` is a usable directory.
///
/// With `clean`, everything already in it is removed first.
fn ensure_output_dir(output: &Path, clean: bool) -> Result<(), BuildError> {
    if output.exists() && !output.is_dir() {
        return Err(BuildError::DestinationIsFile(output.to_path_buf()));
    }

    if clean && output.exists() {
        fs::remove_dir_all(output).map_err(|err| BuildError::io(output, err))?;
        log!("clean"; "{}", output.display());
    }

    fs::create_dir_all(output).map_err(|err| BuildError::io(output, err))
}
