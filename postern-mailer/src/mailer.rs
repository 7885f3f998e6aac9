use crate::{Email, MailerError};
use async_trait::async_trait;

/// Transport-level delivery of a built [`Email`].
///
/// Implementations are interchangeable: the SendGrid HTTP API for
/// production, a directory of files for development, or a capturing mock
/// in tests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, email: Email) -> Result<(), MailerError>;
}
