// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod render;
pub mod transport;
pub mod providers;
pub mod alertmanager;

// Re-export commonly used items
pub use types::*;
pub use error::{ConfigError, NotifyError};
pub use config::{load_provider_configs, load_provider_configs_with_env, load_event_file, EnvSource, ProcessEnv};
pub use render::{event_markdown, escape_html, chunk_text};
pub use transport::{HttpTransport, Mailer, SmtpMailer, WebhookResponse, WebhookTransport};
pub use providers::{Email, Notifier, Slack, Teams, Wechat};
pub use alertmanager::{AlertManager, Delivery, DispatchSummary};
