//! Shared render context.
//!
//! Built once per build and handed read-only to every template. Entries keep
//! their insertion order: `commit_date` first, then `[context.vars]`.

use super::BuildError;
use crate::{
    config::{COMMIT_DATE_KEY, ContextConfig, SiteConfig, Timezone},
    log,
    utils::git::MetadataProvider,
};
use chrono::{DateTime, Local};
use minijinja::{
    Value,
    value::{Enumerator, Object},
};
use std::{collections::BTreeMap, fmt::Write, sync::Arc};

/// Insertion-ordered mapping from variable name to value.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    entries: Vec<(String, Value)>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Template-engine view of the context.
    pub fn to_value(&self) -> Value {
        Value::from_object(self.clone())
    }
}

impl Object for RenderContext {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.get(key.as_str()?).cloned()
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.keys().map(Value::from).collect())
    }
}

/// Assemble the render context for one build.
///
/// The commit timestamp is a hard requirement: without it the build cannot
/// say when its content last changed, so a failed query aborts the build.
pub fn build_context(
    config: &SiteConfig,
    provider: &dyn MetadataProvider,
) -> Result<RenderContext, BuildError> {
    let commit_date = provider
        .last_commit_time()
        .map_err(|err| BuildError::MetadataQuery(err.to_string()))
        .and_then(|epoch| format_commit_date(epoch, &config.context))
        .inspect_err(|err| log!("error"; "failed to check last commit date: {err}"))?;

    let mut context = RenderContext::new();
    context.insert(COMMIT_DATE_KEY, commit_date);
    for (key, value) in &config.context.vars {
        context.insert(key.as_str(), toml_to_value(value));
    }
    Ok(context)
}

/// Convert a `[context.vars]` entry, turning TOML dates into their text form.
fn toml_to_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::Datetime(datetime) => Value::from(datetime.to_string()),
        toml::Value::Array(items) => {
            Value::from(items.iter().map(toml_to_value).collect::<Vec<_>>())
        }
        toml::Value::Table(table) => Value::from(
            table
                .iter()
                .map(|(key, value)| (key.clone(), toml_to_value(value)))
                .collect::<BTreeMap<_, _>>(),
        ),
        other => Value::from_serialize(other),
    }
}

/// Convert a Unix epoch to a calendar date string.
pub fn format_commit_date(epoch: i64, config: &ContextConfig) -> Result<String, BuildError> {
    let utc = DateTime::from_timestamp(epoch, 0)
        .ok_or_else(|| BuildError::MetadataQuery(format!("timestamp {epoch} is out of range")))?;
    let naive = match config.timezone {
        Timezone::Local => utc.with_timezone(&Local).naive_local(),
        Timezone::Utc => utc.naive_utc(),
    };

    let mut formatted = String::new();
    write!(formatted, "{}", naive.format(&config.date_format)).map_err(|_| {
        BuildError::MetadataQuery(format!("invalid date format `{}`", config.date_format))
    })?;
    Ok(formatted)
}
