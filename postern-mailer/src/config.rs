use crate::{FileTransport, Mailer, MailerError, SendGridTransport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    pub transport: TransportConfig,
    pub from_address: String,
    pub from_name: Option<String>,
    pub app_name: String,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportConfig {
    SendGrid {
        api_key: String,
        api_url: Option<String>,
        timeout_secs: Option<u64>,
    },
    File {
        output_dir: PathBuf,
    },
}

// Keeps the provider credential out of debug output.
impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportConfig::SendGrid {
                api_url,
                timeout_secs,
                ..
            } => f
                .debug_struct("SendGrid")
                .field("api_key", &"[REDACTED]")
                .field("api_url", api_url)
                .field("timeout_secs", timeout_secs)
                .finish(),
            TransportConfig::File { output_dir } => f
                .debug_struct("File")
                .field("output_dir", output_dir)
                .finish(),
        }
    }
}

impl MailerConfig {
    pub fn from_env() -> Result<Self, MailerError> {
        let transport = if let Ok(api_key) = std::env::var("SENDGRID_API_KEY") {
            TransportConfig::SendGrid {
                api_key,
                api_url: std::env::var("SENDGRID_API_URL").ok(),
                timeout_secs: std::env::var("MAILER_SEND_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok()),
            }
        } else if let Ok(output_dir) = std::env::var("MAILER_FILE_OUTPUT_DIR") {
            TransportConfig::File {
                output_dir: PathBuf::from(output_dir),
            }
        } else {
            // Default to file transport for development
            TransportConfig::File {
                output_dir: PathBuf::from("./emails"),
            }
        };

        Ok(Self {
            transport,
            from_address: std::env::var("MAILER_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@example.com".to_string()),
            from_name: std::env::var("MAILER_FROM_NAME").ok(),
            app_name: std::env::var("MAILER_APP_NAME").unwrap_or_else(|_| "Your App".to_string()),
        })
    }

    pub fn build_transport(&self) -> Result<Box<dyn Mailer>, MailerError> {
        match &self.transport {
            TransportConfig::SendGrid {
                api_key,
                api_url,
                timeout_secs,
            } => {
                let mut builder = SendGridTransport::builder(api_key);

                if let Some(url) = api_url {
                    builder = builder.api_url(url);
                }

                if let Some(secs) = timeout_secs {
                    builder = builder.timeout(Duration::from_secs(*secs));
                }

                Ok(Box::new(builder.build()?))
            }
            TransportConfig::File { output_dir } => Ok(Box::new(FileTransport::new(output_dir)?)),
        }
    }

    pub fn get_from_address(&self) -> String {
        if let Some(name) = &self.from_name {
            format!("{} <{}>", name, self.from_address)
        } else {
            self.from_address.clone()
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::File {
                output_dir: PathBuf::from("./emails"),
            },
            from_address: "noreply@example.com".to_string(),
            from_name: None,
            app_name: "Your App".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MailerConfig::default();
        assert_eq!(config.from_address, "noreply@example.com");
        assert_eq!(config.app_name, "Your App");

        match config.transport {
            TransportConfig::File { output_dir } => {
                assert_eq!(output_dir, PathBuf::from("./emails"));
            }
            _ => panic!("Expected file transport"),
        }
    }

    #[test]
    fn test_get_from_address() {
        let mut config = MailerConfig::default();
        assert_eq!(config.get_from_address(), "noreply@example.com");

        config.from_name = Some("Test App".to_string());
        assert_eq!(config.get_from_address(), "Test App <noreply@example.com>");
    }

    #[test]
    fn test_build_file_transport() {
        let config = MailerConfig::default();
        let transport = config.build_transport();
        assert!(transport.is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = MailerConfig {
            transport: TransportConfig::SendGrid {
                api_key: "SG.secret".to_string(),
                api_url: None,
                timeout_secs: None,
            },
            ..MailerConfig::default()
        };

        let debug = format!("{config:?}");
        assert!(!debug.contains("SG.secret"));
    }
}
