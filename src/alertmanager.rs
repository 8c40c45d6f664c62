use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::NotifyError;
use crate::providers::{Email, Notifier, Slack, Teams, Wechat};
use crate::types::{Event, ProviderConfig};

/// Outcome of one provider call.
#[derive(Debug)]
pub struct Delivery {
    pub provider: &'static str,
    pub result: Result<(), NotifyError>,
    pub duration_ms: u64,
}

/// Outcomes of one fan-out, in notifier order.
#[derive(Debug, Default)]
pub struct DispatchSummary {
    pub deliveries: Vec<Delivery>,
}

impl DispatchSummary {
    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| d.result.is_err())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Fans alerts out to every enabled provider, one after another.
pub struct AlertManager {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl AlertManager {
    pub fn with_notifiers(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    /// Builds each configured provider; unknown or invalid entries are logged and skipped.
    pub fn from_configs(configs: &BTreeMap<String, ProviderConfig>) -> Self {
        let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
        for (key, config) in configs {
            let built: Option<Box<dyn Notifier>> = match key.to_lowercase().as_str() {
                "slack" => Slack::new(config).map(|p| Box::new(p) as Box<dyn Notifier>),
                "teams" => Teams::new(config).map(|p| Box::new(p) as Box<dyn Notifier>),
                "wechat" => Wechat::new(config).map(|p| Box::new(p) as Box<dyn Notifier>),
                "email" => Email::new(config).map(|p| Box::new(p) as Box<dyn Notifier>),
                other => {
                    warn!("unknown alert provider '{}', skipping", other);
                    None
                }
            };
            notifiers.extend(built);
        }
        info!("{} alert provider(s) enabled", notifiers.len());
        Self { notifiers }
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    pub async fn notify_event(&self, event: &Event) -> DispatchSummary {
        debug!("dispatching event for {}/{}", event.namespace, event.name);
        let mut summary = DispatchSummary::default();
        for notifier in &self.notifiers {
            let start = Instant::now();
            let result = notifier.send_event(event).await;
            summary.deliveries.push(record(notifier.name(), result, start));
        }
        summary
    }

    pub async fn notify_message(&self, text: &str) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        for notifier in &self.notifiers {
            let start = Instant::now();
            let result = notifier.send_message(text).await;
            summary.deliveries.push(record(notifier.name(), result, start));
        }
        summary
    }
}

fn record(provider: &'static str, result: Result<(), NotifyError>, start: Instant) -> Delivery {
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(()) => info!("{} notified in {}ms", provider, duration_ms),
        Err(e) => warn!("failed to notify {}: {}", provider, e),
    }
    Delivery {
        provider,
        result,
        duration_ms,
    }
}
