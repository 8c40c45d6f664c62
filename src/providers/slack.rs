use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use super::{enabled, Notifier};
use crate::error::{ConfigError, NotifyError};
use crate::render::{chunk_text, title_or_default, truncate_chars};
use crate::transport::{HttpTransport, WebhookTransport};
use crate::types::{Event, ProviderConfig};

const NAME: &str = "Slack";

/// Slack caps a section's text at 3000 characters; leave room for the fences.
const MAX_SECTION_CHARS: usize = 2000;

/// Limit on `plain_text` in a header block.
const MAX_HEADER_CHARS: usize = 150;

/// Incoming-webhook message body.
#[derive(Debug, Serialize)]
pub struct SlackPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub text: String,
    pub blocks: Vec<serde_json::Value>,
}

pub struct Slack {
    webhook: String,
    channel: String,
    title: String,
    transport: Arc<dyn WebhookTransport>,
}

impl Slack {
    pub fn try_new(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let webhook = config.required("webhook")?.to_string();
        Ok(Self {
            webhook,
            channel: config.optional("channel"),
            title: config.optional("title"),
            transport: Arc::new(HttpTransport::new()),
        })
    }

    /// `None` when the options are unusable; the reason is logged.
    pub fn new(config: &ProviderConfig) -> Option<Self> {
        enabled(NAME, Self::try_new(config))
    }

    pub fn with_transport(mut self, transport: Arc<dyn WebhookTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn build_event_payload(&self, ev: &Event) -> SlackPayload {
        let title = title_or_default(&self.title);
        let mut blocks: Vec<serde_json::Value> = Vec::new();
        blocks.push(header_block(title));
        blocks.push(serde_json::json!({
            "type": "section",
            "fields": [
                {"type": "mrkdwn", "text": format!("*Pod:*\n{}", ev.name)},
                {"type": "mrkdwn", "text": format!("*Container:*\n{}", ev.container)},
                {"type": "mrkdwn", "text": format!("*Namespace:*\n{}", ev.namespace)},
                {"type": "mrkdwn", "text": format!("*Reason:*\n{}", ev.reason)},
            ]
        }));
        push_fenced(&mut blocks, "Events", ev.events_or_default());
        push_fenced(&mut blocks, "Logs", ev.logs_or_default());

        SlackPayload {
            channel: self.channel_override(),
            text: format!("{}: {}/{} ({})", title, ev.namespace, ev.name, ev.reason),
            blocks,
        }
    }

    pub fn build_message_payload(&self, text: &str) -> SlackPayload {
        let mut blocks = vec![header_block(title_or_default(&self.title))];
        for chunk in chunk_text(text, MAX_SECTION_CHARS) {
            blocks.push(serde_json::json!({
                "type": "section",
                "text": {"type": "mrkdwn", "text": chunk}
            }));
        }
        SlackPayload {
            channel: self.channel_override(),
            text: text.to_string(),
            blocks,
        }
    }

    fn channel_override(&self) -> Option<String> {
        (!self.channel.is_empty()).then(|| self.channel.clone())
    }

    async fn post(&self, payload: &SlackPayload) -> Result<(), NotifyError> {
        let body = serde_json::to_string(payload)?;
        let res = self.transport.post_json(&self.webhook, body).await?;
        if !res.is_success() {
            error!("Slack webhook failed: {} - {}", res.status, res.body);
            return Err(NotifyError::Rejected {
                provider: NAME,
                status: res.status,
                body: res.body,
            });
        }
        info!("Slack notification delivered ({} blocks)", payload.blocks.len());
        Ok(())
    }
}

#[async_trait]
impl Notifier for Slack {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn send_event(&self, event: &Event) -> Result<(), NotifyError> {
        self.post(&self.build_event_payload(event)).await
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        self.post(&self.build_message_payload(text)).await
    }
}

fn header_block(title: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "header",
        "text": {"type": "plain_text", "text": truncate_chars(title, MAX_HEADER_CHARS)}
    })
}

// Long sections are split so each block stays under Slack's limit.
fn push_fenced(blocks: &mut Vec<serde_json::Value>, label: &str, body: &str) {
    for (i, chunk) in chunk_text(body, MAX_SECTION_CHARS).into_iter().enumerate() {
        let heading = if i == 0 {
            format!("*{}:*\n", label)
        } else {
            String::new()
        };
        blocks.push(serde_json::json!({
            "type": "section",
            "text": {"type": "mrkdwn", "text": format!("{}```\n{}\n```", heading, chunk)}
        }));
    }
}
