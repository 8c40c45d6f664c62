use anyhow::{bail, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use kube_alert_notifier::{load_event_file, load_provider_configs, AlertManager};

const DEFAULT_MESSAGE: &str = "kube-alert-notifier is up and can reach this channel";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let configs = load_provider_configs();
    info!("configured providers = {:?}", configs.keys().collect::<Vec<_>>());

    let manager = AlertManager::from_configs(&configs);
    if manager.is_empty() {
        bail!("No alert provider enabled; set e.g. SLACK_WEBHOOK or EMAIL_* env vars");
    }

    let summary = match std::env::var_os("ALERT_EVENT_FILE") {
        Some(path) => {
            let event = load_event_file(&PathBuf::from(path))?;
            info!("Sending event for {}/{}", event.namespace, event.name);
            manager.notify_event(&event).await
        }
        None => {
            let message = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
            info!("Sending message to {:?}", manager.provider_names());
            manager.notify_message(&message).await
        }
    };

    let failed: Vec<_> = summary.failures().map(|d| d.provider).collect();
    if !failed.is_empty() {
        warn!("{} of {} provider(s) failed", failed.len(), summary.deliveries.len());
        bail!("Delivery failed for: {}", failed.join(", "));
    }
    info!("All providers notified");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
