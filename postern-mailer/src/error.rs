use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Email transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email provider rejected the message: status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Email builder error: {0}")]
    Builder(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MailerError {
    /// Upstream HTTP status of the failure, when one was observed.
    ///
    /// Timeouts and connection errors have no status; provider rejections do.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            MailerError::Api { status, .. } => Some(*status),
            MailerError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MailerError>;
