use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::Message;
use std::sync::Arc;
use tracing::{error, info};

use super::{enabled, Notifier};
use crate::error::{ConfigError, NotifyError};
use crate::render::{escape_html, DEFAULT_TITLE};
use crate::transport::{Mailer, SmtpMailer};
use crate::types::{Event, ProviderConfig};

const NAME: &str = "Email";
const DEFAULT_MESSAGE_SUBJECT: &str = "Kubernetes alert";

/// Sends alerts as HTML mail through an authenticated SMTP relay.
pub struct Email {
    from: Mailbox,
    to: Vec<Mailbox>,
    title: String,
    transport: Arc<dyn Mailer>,
}

impl Email {
    pub fn try_new(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let from_raw = config.required("from")?;
        let to_raw = config.required("to")?;
        let password = config.required("password")?;
        let host = config.required("host")?;
        let port = parse_port(config.required("port")?)?;

        let from = parse_mailbox("from", from_raw)?;
        let to = to_raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|addr| parse_mailbox("to", addr))
            .collect::<Result<Vec<_>, _>>()?;
        if to.is_empty() {
            return Err(ConfigError::Missing("to"));
        }

        let mailer = SmtpMailer::new(host, port, from_raw, password)?;
        Ok(Self {
            from,
            to,
            title: config.optional("title"),
            transport: Arc::new(mailer),
        })
    }

    pub fn new(config: &ProviderConfig) -> Option<Self> {
        enabled(NAME, Self::try_new(config))
    }

    pub fn with_transport(mut self, transport: Arc<dyn Mailer>) -> Self {
        self.transport = transport;
        self
    }

    pub fn event_subject(&self, ev: &Event) -> String {
        if self.title.is_empty() {
            format!("{}: {}/{}", DEFAULT_TITLE, ev.namespace, ev.name)
        } else {
            self.title.clone()
        }
    }

    pub fn message_subject(&self) -> &str {
        if self.title.is_empty() {
            DEFAULT_MESSAGE_SUBJECT
        } else {
            &self.title
        }
    }

    fn build(&self, subject: &str, html: String) -> Result<Message, NotifyError> {
        let mut builder = Message::builder().from(self.from.clone());
        for rcpt in &self.to {
            builder = builder.to(rcpt.clone());
        }
        Ok(builder
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)?)
    }

    async fn deliver(&self, message: Message) -> Result<(), NotifyError> {
        if let Err(e) = self.transport.deliver(message).await {
            error!("Email delivery failed: {}", e);
            return Err(e);
        }
        info!("Email notification delivered to {} recipient(s)", self.to.len());
        Ok(())
    }
}

#[async_trait]
impl Notifier for Email {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn send_event(&self, event: &Event) -> Result<(), NotifyError> {
        let message = self.build(&self.event_subject(event), render_event_html(&self.title, event))?;
        self.deliver(message).await
    }

    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let message = self.build(self.message_subject(), render_message_html(&self.title, text))?;
        self.deliver(message).await
    }
}

/// Accepts 1..=65535 only.
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| ConfigError::InvalidPort(raw.to_string()))
}

fn parse_mailbox(key: &'static str, raw: &str) -> Result<Mailbox, ConfigError> {
    raw.parse().map_err(|e: lettre::address::AddressError| ConfigError::InvalidAddress {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// A non-empty `title` becomes an `<h2>` heading above the details.
pub fn render_event_html(title: &str, ev: &Event) -> String {
    format!(
        "<html><body>\n{}\
         <p><b>Pod:</b> {}<br>\n\
         <b>Container:</b> {}<br>\n\
         <b>Namespace:</b> {}<br>\n\
         <b>Reason:</b> {}</p>\n\
         <p><b>Events:</b></p>\n<pre>{}</pre>\n\
         <p><b>Logs:</b></p>\n<pre>{}</pre>\n\
         </body></html>",
        heading_html(title),
        escape_html(&ev.name),
        escape_html(&ev.container),
        escape_html(&ev.namespace),
        escape_html(&ev.reason),
        escape_html(ev.events_or_default()),
        escape_html(ev.logs_or_default()),
    )
}

pub fn render_message_html(title: &str, text: &str) -> String {
    format!(
        "<html><body>\n{}<pre>{}</pre>\n</body></html>",
        heading_html(title),
        escape_html(text)
    )
}

fn heading_html(title: &str) -> String {
    if title.is_empty() {
        String::new()
    } else {
        format!("<h2>{}</h2>\n", escape_html(title))
    }
}
