use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use super::template::{EmailNotice, TemplatedMessage};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider answered {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, to: &str, notice: &EmailNotice) -> Result<(), TransportError>;
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send_message(
        &self,
        phone: &str,
        country_code: &str,
        message: &TemplatedMessage,
    ) -> Result<(), TransportError>;
}

/// Email provider reached over a JSON HTTP API.
pub struct HttpEmailSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpEmailSender {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: Option<String>, from: String) -> Self {
        Self { client, endpoint, api_key, from }
    }
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Templated-message provider (WhatsApp/SMS style) reached over HTTP.
pub struct HttpMessageSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpMessageSender {
    pub fn new(client: reqwest::Client, endpoint: String, api_key: Option<String>) -> Self {
        Self { client, endpoint, api_key }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessagePayload<'a> {
    phone: &'a str,
    country_code: &'a str,
    template: &'a str,
    params: &'a [String],
}

async fn post_json<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    endpoint: &str,
    api_key: Option<&str>,
    body: &T,
) -> Result<(), TransportError> {
    let mut request = client.post(endpoint).json(body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Rejected { status: status.as_u16(), body })
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send_email(&self, to: &str, notice: &EmailNotice) -> Result<(), TransportError> {
        let payload = EmailPayload {
            from: &self.from,
            to,
            subject: &notice.subject,
            html: &notice.html,
        };
        post_json(&self.client, &self.endpoint, self.api_key.as_deref(), &payload).await
    }
}

#[async_trait]
impl MessageSender for HttpMessageSender {
    async fn send_message(
        &self,
        phone: &str,
        country_code: &str,
        message: &TemplatedMessage,
    ) -> Result<(), TransportError> {
        let payload = MessagePayload {
            phone,
            country_code,
            template: message.template,
            params: &message.params,
        };
        post_json(&self.client, &self.endpoint, self.api_key.as_deref(), &payload).await
    }
}

/// Stand-in used when no provider URL is configured; it only logs.
pub struct LogOnlyTransport;

#[async_trait]
impl EmailSender for LogOnlyTransport {
    async fn send_email(&self, to: &str, notice: &EmailNotice) -> Result<(), TransportError> {
        tracing::info!(to, subject = %notice.subject, "Email transport not configured, skipping");
        Ok(())
    }
}

#[async_trait]
impl MessageSender for LogOnlyTransport {
    async fn send_message(
        &self,
        phone: &str,
        _country_code: &str,
        message: &TemplatedMessage,
    ) -> Result<(), TransportError> {
        tracing::info!(phone, template = message.template, "Message transport not configured, skipping");
        Ok(())
    }
}
