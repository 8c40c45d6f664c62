use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use super::{enabled, Notifier};
use crate::error::{ConfigError, NotifyError};
use crate::render::event_markdown;
use crate::transport::{HttpTransport, WebhookTransport};
use crate::types::{Event, ProviderConfig};

const NAME: &str = "Wechat";

#[derive(Debug, Serialize)]
struct WechatPayload<'a> {
    msgtype: &'static str,
    markdown: WechatMarkdown<'a>,
}

#[derive(Debug, Serialize)]
struct WechatMarkdown<'a> {
    content: &'a str,
}

/// Work Wechat group robot.
pub struct Wechat {
    webhook: String,
    title: String,
    transport: Arc<dyn WebhookTransport>,
}

impl Wechat {
    pub fn try_new(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let webhook = config.required("webhook")?.to_string();
        Ok(Self {
            webhook,
            title: config.optional("title"),
            transport: Arc::new(HttpTransport::new()),
        })
    }

    pub fn new(config: &ProviderConfig) -> Option<Self> {
        enabled(NAME, Self::try_new(config))
    }

    pub fn with_transport(mut self, transport: Arc<dyn WebhookTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// The markdown content always opens with a `# <title>` line, even when no title is set.
    pub fn build_request_body(&self, ev: &Event, custom: &str) -> Result<String, NotifyError> {
        let text = if custom.is_empty() {
            event_markdown(ev)
        } else {
            custom.to_string()
        };
        let content = format!("# {}\n{}", self.title, text);
        let payload = WechatPayload {
            msgtype: "markdown",
            markdown: WechatMarkdown { content: &content },
        };
        Ok(serde_json::to_string(&payload)?)
    }

    async fn post(&self, body: String) -> Result<(), NotifyError> {
        let res = self.transport.post_json(&self.webhook, body).await?;
        // The robot API answers 200 for anything it accepted.
        if res.status != 200 {
            error!("Wechat webhook failed: {} - {}", res.status, res.body);
            return Err(NotifyError::Rejected {
                provider: NAME,
                status: res.status,
                body: res.body,
            });
        }
        info!("Wechat notification delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for Wechat {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn send_event(&self, event: &Event) -> Result<(), NotifyError> {
        self.post(self.build_request_body(event, "")?).await
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        self.post(self.build_request_body(&Event::default(), text)?).await
    }
}
