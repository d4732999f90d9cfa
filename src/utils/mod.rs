//! Helpers shared by the build pipeline.

pub mod git;
pub mod timer;
