use anyhow::{Context, Result};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::path::Path;

use crate::types::{Event, ProviderConfig};

/// Options each provider reads, in `<PROVIDER>_<OPTION>` form once upper-cased.
pub const PROVIDER_OPTIONS: &[(&str, &[&str])] = &[
    ("slack", &["webhook", "channel", "title"]),
    ("teams", &["webhook", "title"]),
    ("wechat", &["webhook", "title"]),
    ("email", &["from", "to", "password", "host", "port", "title"]),
];

/// Where `<PROVIDER>_<OPTION>` values are looked up.
pub trait EnvSource {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

// Fixed variable sets, mostly for tests.
impl<K: Borrow<str> + Ord> EnvSource for BTreeMap<K, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

pub fn load_provider_configs() -> BTreeMap<String, ProviderConfig> {
    load_provider_configs_with_env(&ProcessEnv)
}

/// Collects provider options from the environment. A provider is listed as soon
/// as any of its variables is set; checking the values is left to its constructor.
pub fn load_provider_configs_with_env<E: EnvSource + ?Sized>(env: &E) -> BTreeMap<String, ProviderConfig> {
    let mut configs = BTreeMap::new();
    for (provider, options) in PROVIDER_OPTIONS {
        let config: ProviderConfig = options
            .iter()
            .filter_map(|opt| {
                let var = format!("{}_{}", provider, opt).to_uppercase();
                env.lookup(&var).map(|v| (opt.to_string(), v.trim().to_string()))
            })
            .collect();
        if !config.is_empty() {
            configs.insert(provider.to_string(), config);
        }
    }
    configs
}

/// Reads an event as JSON, the way the cluster watcher hands it over.
pub fn load_event_file(path: &Path) -> Result<Event> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event file {}", path.display()))?;
    let event = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid event JSON in {}", path.display()))?;
    Ok(event)
}
