use async_trait::async_trait;
use lettre::{
    transport::smtp::authentication::Credentials, AsyncSmtpTransport, AsyncTransport, Message,
    Tokio1Executor,
};
use tracing::debug;

use crate::error::{ConfigError, NotifyError};

/// Status and body of a webhook response. Interpreting the status is up to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub body: String,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Posts a JSON document to a webhook URL.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post_json(&self, url: &str, body: String) -> Result<WebhookResponse, NotifyError>;
}

/// Production webhook transport backed by a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<WebhookResponse, NotifyError> {
        debug!("posting {} bytes to webhook", body.len());
        let res = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = res.status().as_u16();
        let body = match res.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("failed to read webhook response body: {}", e);
                String::new()
            }
        };
        Ok(WebhookResponse { status, body })
    }
}

/// Hands a finished message to a mail server.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, message: Message) -> Result<(), NotifyError>;
}

/// SMTP mailer authenticating with the sender address and password.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Port 465 speaks implicit TLS; every other port upgrades with STARTTLS.
    /// Nothing is dialled until the first delivery.
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Result<Self, ConfigError> {
        let builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| ConfigError::Smtp {
            host: host.to_string(),
            reason: e.to_string(),
        })?;

        let transport = builder
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(&self, message: Message) -> Result<(), NotifyError> {
        self.transport.send(message).await?;
        Ok(())
    }
}
