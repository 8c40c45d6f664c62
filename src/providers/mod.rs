// Alert provider adapters
pub mod email;
pub mod slack;
pub mod teams;
pub mod wechat;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{ConfigError, NotifyError};
use crate::types::Event;

pub use email::Email;
pub use slack::Slack;
pub use teams::Teams;
pub use wechat::Wechat;

/// One destination channel for cluster alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable provider identifier.
    fn name(&self) -> &'static str;

    /// Render `event` in the provider's format and deliver it.
    async fn send_event(&self, event: &Event) -> Result<(), NotifyError>;

    /// Deliver `text` in place of a rendered event, inside the same envelope.
    async fn send_message(&self, text: &str) -> Result<(), NotifyError>;
}

/// Best-effort construction: a misconfigured provider is logged and left out.
pub(crate) fn enabled<T>(provider: &str, built: Result<T, ConfigError>) -> Option<T> {
    match built {
        Ok(p) => {
            info!("initializing {} provider", provider);
            Some(p)
        }
        Err(e) => {
            warn!("{} provider disabled: {}", provider, e);
            None
        }
    }
}
