use crate::Error;
use chrono::Duration;

/// Issuance and validation policy.
///
/// The allowed domain and the base link URL are required; there is no
/// default that allows every domain. TTL and reissue interval carry the
/// production defaults and are overridable for tests and short-lived
/// deployments.
#[derive(Debug, Clone)]
pub struct MagicLinkConfig {
    /// The single email domain tokens may be issued for, without the
    /// leading `@`.
    pub allowed_domain: String,
    /// Base URL the access link points at; the token is appended as a
    /// `token` query parameter.
    pub base_url: String,
    /// Token lifetime.
    pub token_ttl: Duration,
    /// Minimum delay between issues for the same address.
    pub reissue_interval: Duration,
}

impl MagicLinkConfig {
    pub fn new(allowed_domain: &str, base_url: &str) -> Self {
        Self {
            allowed_domain: allowed_domain
                .trim()
                .trim_start_matches('@')
                .to_lowercase(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            token_ttl: Duration::minutes(15),
            reissue_interval: Duration::seconds(60),
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_reissue_interval(mut self, interval: Duration) -> Self {
        self.reissue_interval = interval;
        self
    }

    /// Load the config from `POSTERN_*` environment variables.
    ///
    /// `POSTERN_ALLOWED_DOMAIN` and `POSTERN_BASE_URL` are required;
    /// `POSTERN_TOKEN_TTL_MINUTES` and `POSTERN_REISSUE_INTERVAL_SECS`
    /// fall back to 15 minutes and 60 seconds.
    pub fn from_env() -> Result<Self, Error> {
        let allowed_domain = std::env::var("POSTERN_ALLOWED_DOMAIN").map_err(|_| {
            Error::Internal("configuration error: POSTERN_ALLOWED_DOMAIN is required".to_string())
        })?;
        let base_url = std::env::var("POSTERN_BASE_URL").map_err(|_| {
            Error::Internal("configuration error: POSTERN_BASE_URL is required".to_string())
        })?;

        let mut config = Self::new(&allowed_domain, &base_url);

        if let Some(minutes) = std::env::var("POSTERN_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.token_ttl = Duration::minutes(minutes);
        }

        if let Some(secs) = std::env::var("POSTERN_REISSUE_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.reissue_interval = Duration::seconds(secs);
        }

        Ok(config)
    }

    /// The link embedded in the access email for `token`.
    pub fn access_link(&self, token: &str) -> String {
        format!("{}?token={}", self.base_url, token)
    }
}
