use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

// A hung provider must not hang the caller; every request is bounded.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivery via the SendGrid v3 `mail/send` HTTP API.
pub struct SendGridTransport {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl SendGridTransport {
    pub fn builder(api_key: &str) -> SendGridTransportBuilder {
        SendGridTransportBuilder::new(api_key)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

// The API key must never appear in logs or debug output.
impl std::fmt::Debug for SendGridTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridTransport")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[async_trait]
impl Mailer for SendGridTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        let payload = build_payload(&email)?;

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                api_key_present = !self.api_key.is_empty(),
                "SendGrid rejected message"
            );
            return Err(MailerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to = %email.to, "Message accepted by SendGrid");
        Ok(())
    }
}

pub struct SendGridTransportBuilder {
    api_key: String,
    api_url: Option<String>,
    timeout: Option<Duration>,
}

impl SendGridTransportBuilder {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_url: None,
            timeout: None,
        }
    }

    /// Override the API endpoint (used to point tests at a local server).
    pub fn api_url(mut self, url: &str) -> Self {
        self.api_url = Some(url.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<SendGridTransport, MailerError> {
        if self.api_key.is_empty() {
            return Err(MailerError::Config(
                "SendGrid API key is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(SendGridTransport {
            client,
            api_key: self.api_key,
            api_url: self.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }
}

fn build_payload(email: &Email) -> Result<Value, MailerError> {
    email.validate()?;

    let (from_address, from_name) = split_from_address(&email.from);
    let mut from = json!({ "email": from_address });
    if let Some(name) = from_name {
        from["name"] = json!(name);
    }

    let mut content = Vec::new();
    // SendGrid requires text/plain before text/html when both are present
    if let Some(text) = &email.text_body {
        content.push(json!({ "type": "text/plain", "value": text }));
    }
    if let Some(html) = &email.html_body {
        content.push(json!({ "type": "text/html", "value": html }));
    }

    let mut payload = json!({
        "personalizations": [
            { "to": [{ "email": email.to }] }
        ],
        "from": from,
        "subject": email.subject,
        "content": content,
    });

    if let Some(reply_to) = &email.reply_to {
        payload["reply_to"] = json!({ "email": reply_to });
    }

    Ok(payload)
}

/// Split a `Name <address>` from value into its parts.
fn split_from_address(from: &str) -> (&str, Option<&str>) {
    if let (Some(start), true) = (from.find('<'), from.ends_with('>')) {
        let name = from[..start].trim();
        let address = from[start + 1..from.len() - 1].trim();
        if !address.is_empty() {
            return (address, (!name.is_empty()).then_some(name));
        }
    }
    (from, None)
}
