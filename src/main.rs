//! Pagemill - a template-driven static site builder.

mod build;
mod cli;
mod config;
mod logger;
mod pipeline;
mod utils;

use anyhow::{Context, Result};
use build::build_site;
use clap::Parser;
use cli::Cli;
use config::SiteConfig;
use utils::git::GitMetadata;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SiteConfig::load(&cli).context("failed to load configuration")?;

    let provider = GitMetadata::new(&config.root);
    let report = build_site(&config, &provider)
        .inspect_err(|err| {
            if err.is_configuration_error() {
                log!("error"; "output layout conflict, check [build] in `{}`", cli.config.display());
            }
        })
        .with_context(|| format!("failed to build `{}`", config.build.output.display()))?;
    report.log();

    Ok(())
}
