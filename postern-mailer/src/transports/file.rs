use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Development transport that writes each message to disk as JSON
/// instead of delivering it.
#[derive(Debug, Clone)]
pub struct FileTransport {
    output_dir: PathBuf,
}

impl FileTransport {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self, MailerError> {
        let output_dir = output_dir.as_ref().to_path_buf();

        if !output_dir.exists() {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl Mailer for FileTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        email.validate()?;

        let path = self.output_dir.join(format!("{}.json", Uuid::new_v4()));
        let contents = serde_json::to_vec_pretty(&email)?;
        tokio::fs::write(&path, contents).await?;

        tracing::debug!(to = %email.to, path = %path.display(), "Wrote message to disk");
        Ok(())
    }
}
