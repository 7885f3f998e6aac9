pub mod config;
pub mod email;
pub mod email_types;
pub mod error;
pub mod mailer;
pub mod transports;

pub use config::{MailerConfig, TransportConfig};
pub use email::{Email, EmailBuilder};
pub use email_types::AccessLinkEmail;
pub use error::MailerError;
pub use mailer::Mailer;
pub use transports::{FileTransport, SendGridTransport};

pub mod prelude {
    pub use crate::{
        AccessLinkEmail, Email, EmailBuilder, FileTransport, Mailer, MailerConfig, MailerError,
        SendGridTransport, TransportConfig,
    };
}
