//! `[context]` section configuration.
//!
//! Controls how build-time values are presented to templates.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// Timezone used when turning the commit epoch into a calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timezone {
    /// The machine's local timezone (default).
    #[default]
    Local,
    /// Coordinated Universal Time, for reproducible output across machines.
    Utc,
}

/// `[context]` section in pagemill.toml
///
/// # Example
/// ```toml
/// [context]
/// timezone = "utc"
/// date_format = "%Y-%m-%d"
///
/// [context.vars]
/// site_name = "Example"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ContextConfig {
    #[serde(default = "defaults::context::timezone")]
    #[educe(Default = defaults::context::timezone())]
    pub timezone: Timezone,

    /// `chrono` strftime format for `commit_date`.
    #[serde(default = "defaults::context::date_format")]
    #[educe(Default = defaults::context::date_format())]
    pub date_format: String,

    /// User-defined entries exposed to every template.
    #[serde(default)]
    pub vars: toml::Table,
}
