use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use super::{enabled, Notifier};
use crate::error::{ConfigError, NotifyError};
use crate::render::{event_markdown_with_breaks, title_or_default};
use crate::transport::{HttpTransport, WebhookTransport};
use crate::types::{Event, ProviderConfig};

const NAME: &str = "Microsoft Teams";
const THEME_COLOR: &str = "d63333";

/// Legacy Office 365 connector card, accepted by Teams incoming webhooks.
#[derive(Debug, Serialize)]
pub struct MessageCard {
    #[serde(rename = "@type")]
    pub card_type: &'static str,
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "themeColor")]
    pub theme_color: &'static str,
    pub summary: String,
    pub title: String,
    pub text: String,
}

impl MessageCard {
    fn new(title: &str, text: String) -> Self {
        Self {
            card_type: "MessageCard",
            context: "https://schema.org/extensions",
            theme_color: THEME_COLOR,
            summary: title.to_string(),
            title: title.to_string(),
            text,
        }
    }
}

pub struct Teams {
    webhook: String,
    title: String,
    transport: Arc<dyn WebhookTransport>,
}

impl Teams {
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

    pub fn build_card(&self, ev: &Event, custom: &str) -> MessageCard {
        let text = if custom.is_empty() {
            // Teams markdown only breaks paragraphs on blank lines.
            event_markdown_with_breaks(ev, "\n\n")
        } else {
            custom.to_string()
        };
        MessageCard::new(title_or_default(&self.title), text)
    }

    async fn post(&self, card: &MessageCard) -> Result<(), NotifyError> {
        let body = serde_json::to_string(card)?;
        let res = self.transport.post_json(&self.webhook, body).await?;
        if !res.is_success() {
            error!("Teams webhook failed: {} - {}", res.status, res.body);
            return Err(NotifyError::Rejected {
                provider: NAME,
                status: res.status,
                body: res.body,
            });
        }
        info!("Teams notification delivered");
        Ok(())
    }
}

#[async_trait]
impl Notifier for Teams {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn send_event(&self, event: &Event) -> Result<(), NotifyError> {
        self.post(&self.build_card(event, "")).await
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        self.post(&self.build_card(&Event::default(), text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::RecordingTransport;

    fn teams(webhook: &str) -> Teams {
        Teams::new(&ProviderConfig::new().with("webhook", webhook)).unwrap()
    }

    #[test]
    fn test_empty_config() {
        assert!(Teams::new(&ProviderConfig::new()).is_none());
    }

    #[test]
    fn test_teams_name() {
        assert_eq!(teams("testtest").name(), "Microsoft Teams");
    }

    #[test]
    fn test_card_layout() {
        let t = teams("testtest");
        let ev = Event {
            name: "test-pod".to_string(),
            logs: "line1\nline2".to_string(),
            ..Default::default()
        };
        let card = serde_json::to_value(t.build_card(&ev, "")).unwrap();
        assert_eq!(card["@type"], "MessageCard");
        assert_eq!(card["@context"], "https://schema.org/extensions");
        assert_eq!(card["title"], "Crash detected in pod");
        let text = card["text"].as_str().unwrap();
        assert!(text.starts_with("**Pod:** test-pod\n\n"));
        assert!(text.contains("```\nline1\nline2\n```"));
        assert!(text.contains("No events captured"));
    }

    #[test]
    fn test_logs_and_events_kept_verbatim() {
        let ev = Event {
            logs: "test\ntestlogs".to_string(),
            events: "a\nb".to_string(),
            ..Default::default()
        };
        let card = teams("testtest").build_card(&ev, "");
        assert!(card.text.contains("test\ntestlogs"));
        assert!(card.text.contains("```\na\nb\n```"));
        assert!(!card.text.contains("test\n\ntestlogs"));
    }

    #[test]
    fn test_configured_title() {
        let t = Teams::new(
            &ProviderConfig::new()
                .with("webhook", "testtest")
                .with("title", "prod"),
        )
        .unwrap();
        let card = serde_json::to_value(t.build_card(&Event::default(), "")).unwrap();
        assert_eq!(card["title"], "prod");
        assert_eq!(card["summary"], "prod");
    }

    #[tokio::test]
    async fn test_send_message_keeps_title() {
        let transport = Arc::new(RecordingTransport::with_status(200));
        let t = Teams::new(
            &ProviderConfig::new()
                .with("webhook", "testtest")
                .with("title", "prod"),
        )
        .unwrap()
        .with_transport(transport.clone());

        assert!(t.send_message("deploy finished").await.is_ok());
        let body = transport.last_body();
        assert_eq!(body["title"], "prod");
        assert_eq!(body["summary"], "prod");
        assert_eq!(body["text"], "deploy finished");
    }

    #[tokio::test]
    async fn test_send_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"@type":"MessageCard","text":"test"}"#.to_string(),
            ))
            .with_body(r#"{"isOk": true}"#)
            .create_async()
            .await;

        assert!(teams(&server.url()).send_message("test").await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_message_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("POST", "/").with_status(502).create_async().await;

        let err = teams(&server.url()).send_message("test").await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_send_event() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_body(r#"{"isOk": true}"#)
            .create_async()
            .await;

        let ev = Event {
            name: "test-pod".to_string(),
            container: "test-container".to_string(),
            namespace: "default".to_string(),
            reason: "OOMKILLED".to_string(),
            logs: "test\ntestlogs".to_string(),
            events: "event1-event2-event3\nevent5\nevent6-event8-event11-event12".to_string(),
        };
        assert!(teams(&server.url()).send_event(&ev).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_http_request() {
        assert!(teams("h ttp://localhost").send_message("test").await.is_err());
        assert!(teams("http://localhost:132323").send_message("test").await.is_err());
    }
}
