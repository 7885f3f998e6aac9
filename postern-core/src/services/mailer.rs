use crate::Error;
use async_trait::async_trait;
use postern_mailer::prelude::*;

/// Delivery seam between the issuer and the outgoing mail transport.
///
/// The issuer only ever asks for one thing: send this access link to
/// this address. Implementations decide how (SendGrid, file output for
/// development, a capturing mock in tests).
#[async_trait]
pub trait MailerService: Send + Sync {
    async fn send_access_link(
        &self,
        to: &str,
        access_link: &str,
        expires_in: chrono::Duration,
    ) -> Result<(), Error>;
}

/// [`MailerService`] backed by a [`postern_mailer`] transport.
pub struct AccessLinkMailerService {
    transport: Box<dyn Mailer>,
    config: MailerConfig,
}

impl AccessLinkMailerService {
    pub fn new(config: MailerConfig) -> Result<Self, Error> {
        let transport = config
            .build_transport()
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(Self { transport, config })
    }

    pub fn from_env() -> Result<Self, Error> {
        let config = MailerConfig::from_env().map_err(|e| Error::Internal(e.to_string()))?;
        Self::new(config)
    }

    /// Use an explicit transport instead of the one `config` would build.
    pub fn with_transport(config: MailerConfig, transport: Box<dyn Mailer>) -> Self {
        Self { transport, config }
    }
}

#[async_trait]
impl MailerService for AccessLinkMailerService {
    async fn send_access_link(
        &self,
        to: &str,
        access_link: &str,
        expires_in: chrono::Duration,
    ) -> Result<(), Error> {
        let email = AccessLinkEmail::build(
            &self.config.get_from_address(),
            to,
            access_link,
            &self.config.app_name,
            expires_in.num_minutes(),
        )
        .map_err(|e| Error::Internal(e.to_string()))?;

        self.transport
            .send_email(email)
            .await
            .map_err(|e| Error::DeliveryFailed(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct CapturingTransport {
        sent: Arc<Mutex<Vec<Email>>>,
    }

    impl CapturingTransport {
        fn new() -> (Self, Arc<Mutex<Vec<Email>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            (Self { sent: sent.clone() }, sent)
        }
    }

    #[async_trait]
    impl Mailer for CapturingTransport {
        async fn send_email(&self, email: Email) -> Result<(), MailerError> {
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Mailer for FailingTransport {
        async fn send_email(&self, _email: Email) -> Result<(), MailerError> {
            Err(MailerError::Api {
                status: 503,
                body: "service unavailable".to_string(),
            })
        }
    }

    fn test_config() -> MailerConfig {
        MailerConfig {
            from_name: Some("Test App".to_string()),
            app_name: "Test App".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sent_email_carries_link_and_ttl() {
        let (transport, sent) = CapturingTransport::new();
        let service = AccessLinkMailerService::with_transport(test_config(), Box::new(transport));

        service
            .send_access_link(
                "alice@example.com",
                "https://app.example.com?token=mlk_abc",
                chrono::Duration::minutes(30),
            )
            .await
            .unwrap();

        let emails = sent.lock().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].to, "alice@example.com");
        let html = emails[0].html_body.as_deref().unwrap();
        assert!(html.contains("https://app.example.com?token=mlk_abc"));
        assert!(html.contains("expires in 30 minutes"));
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_delivery_failed() {
        let service =
            AccessLinkMailerService::with_transport(test_config(), Box::new(FailingTransport));

        let err = service
            .send_access_link(
                "alice@example.com",
                "https://app.example.com?token=mlk_abc",
                chrono::Duration::minutes(15),
            )
            .await
            .unwrap_err();

        assert!(err.is_delivery_failure());
    }
}
