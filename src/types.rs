use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ConfigError;

pub const DEFAULT_LOGS: &str = "No logs captured";
pub const DEFAULT_EVENTS: &str = "No events captured";

/// A single pod incident as reported by the cluster watcher.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub name: String,
    pub container: String,
    pub namespace: String,
    pub reason: String,
    pub logs: String,
    pub events: String,
}

impl Event {
    /// Logs as captured, or the placeholder when there is nothing but whitespace.
    pub fn logs_or_default(&self) -> &str {
        if self.logs.trim().is_empty() {
            DEFAULT_LOGS
        } else {
            &self.logs
        }
    }

    pub fn events_or_default(&self) -> &str {
        if self.events.trim().is_empty() {
            DEFAULT_EVENTS
        } else {
            &self.events
        }
    }
}

/// Flat option map for one provider, e.g. `webhook`, `channel`, `title`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    values: HashMap<String, String>,
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.as_str())
    }

    /// Present and non-empty, otherwise `ConfigError::Missing`.
    pub fn required(&self, key: &'static str) -> Result<&str, ConfigError> {
        match self.get(key) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(ConfigError::Missing(key)),
        }
    }

    pub fn optional(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ProviderConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for ProviderConfig {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}
